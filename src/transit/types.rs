use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// Provider-specific numeric site identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SiteId(pub u32);

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of `GET /v1/sites?expand=true`. Only the fields we match on.
#[derive(Debug, Clone, Deserialize)]
pub struct Site {
    pub id: u32,

    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportMode {
    Metro,
    Bus,
    Train,
    Tram,
    Ship,
    Ferry,
    Taxi,
    #[serde(other)]
    Unknown,
}

/// `GET /v1/sites/{id}/departures`.
#[derive(Debug, Deserialize)]
pub struct DeparturesResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub departures: Vec<DepartureDto>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub stop_deviations: Vec<DeviationDto>,
}

#[derive(Debug, Deserialize)]
pub struct DepartureDto {
    #[serde(default)]
    pub line: Option<LineDto>,

    #[serde(default)]
    pub destination: Option<String>,

    #[serde(default)]
    pub direction: Option<String>,

    #[serde(default)]
    pub scheduled: Option<String>,

    #[serde(default)]
    pub expected: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LineDto {
    #[serde(default, deserialize_with = "string_or_number")]
    pub designation: Option<String>,

    #[serde(default)]
    pub transport_mode: Option<TransportMode>,
}

#[derive(Debug, Deserialize)]
pub struct DeviationDto {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub importance_level: Option<i64>,
}

/// A list that upstream may send as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Designation {
        Text(String),
        Number(i64),
    }

    Ok(
        Option::<Designation>::deserialize(deserializer)?.map(|d| match d {
            Designation::Text(s) => s,
            Designation::Number(n) => n.to_string(),
        }),
    )
}

/// One scheduled transit run, validated at the feed boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub line: String,
    pub destination: String,
    pub scheduled: DateTime<Utc>,
    /// Real-time estimate; authoritative over `scheduled` when present.
    pub expected: Option<DateTime<Utc>>,
}

impl Departure {
    pub fn effective(&self) -> DateTime<Utc> {
        self.expected.unwrap_or(self.scheduled)
    }

    /// Whole minutes behind schedule, never negative.
    pub fn delay_minutes(&self) -> i64 {
        let Some(expected) = self.expected else {
            return 0;
        };
        let minutes = (expected - self.scheduled).num_seconds() as f64 / 60.0;
        if minutes > 0.0 {
            minutes.round() as i64
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopDeviation {
    pub message: String,
    pub importance: Option<i64>,
}

/// Filtered departures for one site plus whatever deviations upstream reported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DepartureBoard {
    pub departures: Vec<Departure>,
    pub deviations: Vec<StopDeviation>,
}

/// Accepts RFC 3339, or a naive timestamp taken as local time in `tz`.
pub fn parse_timestamp<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 27, h, m, 0).unwrap()
    }

    fn departure(scheduled: DateTime<Utc>, expected: Option<DateTime<Utc>>) -> Departure {
        Departure {
            line: "11".into(),
            destination: "Kungsträdgården".into(),
            scheduled,
            expected,
        }
    }

    #[test]
    fn effective_prefers_expected() {
        let d = departure(at(8, 0), Some(at(8, 4)));
        assert_eq!(d.effective(), at(8, 4));

        let d = departure(at(8, 0), None);
        assert_eq!(d.effective(), at(8, 0));
    }

    #[test]
    fn delay_is_never_negative() {
        let t = at(8, 0);
        assert_eq!(departure(t, Some(t + Duration::minutes(7))).delay_minutes(), 7);
        assert_eq!(departure(t, Some(t - Duration::minutes(3))).delay_minutes(), 0);
        assert_eq!(departure(t, None).delay_minutes(), 0);
        assert_eq!(departure(t, Some(t + Duration::seconds(90))).delay_minutes(), 2);
    }

    #[test]
    fn naive_timestamps_use_the_zone() {
        let tz = chrono_tz::Europe::Stockholm;
        let parsed = parse_timestamp("2026-01-27T08:15:00", &tz).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 27, 7, 15, 0).unwrap());

        let parsed = parse_timestamp("2026-01-27T08:15:00Z", &tz).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 27, 8, 15, 0).unwrap());

        assert!(parse_timestamp("soon", &tz).is_none());
    }

    #[test]
    fn designation_accepts_numbers() {
        let line: LineDto =
            serde_json::from_str(r#"{"designation": 11, "transport_mode": "METRO"}"#).unwrap();
        assert_eq!(line.designation.as_deref(), Some("11"));
        assert_eq!(line.transport_mode, Some(TransportMode::Metro));

        let line: LineDto =
            serde_json::from_str(r#"{"designation": "17", "transport_mode": "HOVERCRAFT"}"#)
                .unwrap();
        assert_eq!(line.designation.as_deref(), Some("17"));
        assert_eq!(line.transport_mode, Some(TransportMode::Unknown));
    }
}
