//! SL transport API client.

use chrono_tz::Tz;

use crate::error::FeedError;
use crate::http;
use crate::source::TransitSource;

use super::types::{
    parse_timestamp, Departure, DepartureBoard, DepartureDto, DeparturesResponse, Site, SiteId,
    StopDeviation, TransportMode,
};

/// Upstream host, used directly outside development mode.
pub const DEFAULT_BASE_URL: &str = "https://transport.integration.sl.se";

/// Only underground departures are shown.
pub const ALLOWED_MODES: &[TransportMode] = &[TransportMode::Metro];

const SITES_FEED: &str = "SL sites";
const DEPARTURES_FEED: &str = "SL departures";

/// Which departures of a site we care about.
#[derive(Debug, Clone)]
pub struct DepartureFilter {
    pub modes: Vec<TransportMode>,
    /// Case-insensitive substring of the destination or direction.
    pub towards: String,
}

impl DepartureFilter {
    pub fn new(towards: impl Into<String>) -> Self {
        Self {
            modes: ALLOWED_MODES.to_vec(),
            towards: towards.into(),
        }
    }

    pub fn matches(&self, dto: &DepartureDto) -> bool {
        let mode_ok = dto
            .line
            .as_ref()
            .and_then(|l| l.transport_mode)
            .is_some_and(|m| self.modes.contains(&m));
        if !mode_ok {
            return false;
        }

        let needle = self.towards.to_lowercase();
        [&dto.destination, &dto.direction]
            .into_iter()
            .flatten()
            .any(|label| label.to_lowercase().contains(&needle))
    }
}

impl DeparturesResponse {
    /// Filter and validate the raw payload. Upstream order is kept.
    pub fn into_board(self, filter: &DepartureFilter, tz: &Tz) -> DepartureBoard {
        let departures = self
            .departures
            .into_iter()
            .filter(|d| filter.matches(d))
            .filter_map(|d| d.into_departure(tz))
            .collect();

        let deviations = self
            .stop_deviations
            .into_iter()
            .map(|d| StopDeviation {
                message: d.message.unwrap_or_default(),
                importance: d.importance_level,
            })
            .collect();

        DepartureBoard {
            departures,
            deviations,
        }
    }
}

impl DepartureDto {
    fn into_departure(self, tz: &Tz) -> Option<Departure> {
        let Some(scheduled) = self.scheduled.as_deref().and_then(|s| parse_timestamp(s, tz))
        else {
            tracing::debug!(destination = ?self.destination, "dropping departure without a usable scheduled time");
            return None;
        };
        let expected = self.expected.as_deref().and_then(|s| parse_timestamp(s, tz));

        Some(Departure {
            line: self
                .line
                .and_then(|l| l.designation)
                .unwrap_or_else(|| "–".to_string()),
            destination: self
                .destination
                .or(self.direction)
                .unwrap_or_else(|| "–".to_string()),
            scheduled,
            expected,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TransitConfig {
    pub base_url: String,
    pub timezone: Tz,
    pub filter: DepartureFilter,
}

impl TransitConfig {
    pub fn new(towards: impl Into<String>, timezone: Tz) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timezone,
            filter: DepartureFilter::new(towards),
        }
    }

    /// Route requests somewhere else (a local relay, a test server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct TransitClient {
    http: reqwest::Client,
    config: TransitConfig,
}

impl TransitClient {
    pub fn new(config: TransitConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: http::client()?,
            config,
        })
    }
}

impl TransitSource for TransitClient {
    async fn sites(&self) -> Result<Vec<Site>, FeedError> {
        let url = format!("{}/v1/sites", self.config.base_url);
        let request = self.http.get(url).query(&[("expand", "true")]);
        http::get_json(request, SITES_FEED).await
    }

    async fn departures(&self, site: SiteId) -> Result<DepartureBoard, FeedError> {
        let url = format!("{}/v1/sites/{site}/departures", self.config.base_url);
        let response: DeparturesResponse =
            http::get_json(self.http.get(url), DEPARTURES_FEED).await?;
        Ok(response.into_board(&self.config.filter, &self.config.timezone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const PAYLOAD: &str = r#"{
        "departures": [
            {
                "destination": "Kungsträdgården",
                "direction": "Kungsträdgården",
                "scheduled": "2026-01-27T08:10:00",
                "expected": "2026-01-27T08:12:00",
                "line": {"id": 11, "designation": "11", "transport_mode": "METRO"}
            },
            {
                "destination": "Akalla",
                "scheduled": "2026-01-27T08:11:00",
                "line": {"designation": "11", "transport_mode": "METRO"}
            },
            {
                "destination": "Kungsträdgården",
                "scheduled": "2026-01-27T08:13:00",
                "line": {"designation": "504", "transport_mode": "BUS"}
            },
            {
                "direction": "mot KUNGSTRÄDGÅRDEN",
                "scheduled": "2026-01-27T08:20:00",
                "line": {"designation": 10, "transport_mode": "METRO"}
            },
            {
                "destination": "Kungsträdgården",
                "line": {"designation": "11", "transport_mode": "METRO"}
            }
        ],
        "stop_deviations": [
            {"message": "Hissen är ur funktion", "importance_level": 5},
            {"importance_level": 1}
        ]
    }"#;

    fn board() -> DepartureBoard {
        let response: DeparturesResponse = http::decode_json(PAYLOAD, DEPARTURES_FEED).unwrap();
        response.into_board(
            &DepartureFilter::new("Kungsträdgården"),
            &chrono_tz::Europe::Stockholm,
        )
    }

    #[test]
    fn keeps_only_metro_towards_destination() {
        let board = board();
        let lines: Vec<_> = board.departures.iter().map(|d| d.line.as_str()).collect();
        assert_eq!(lines, ["11", "10"]);
    }

    #[test]
    fn falls_back_to_direction_label() {
        let board = board();
        assert_eq!(board.departures[1].destination, "mot KUNGSTRÄDGÅRDEN");
    }

    #[test]
    fn converts_local_times() {
        let board = board();
        let first = &board.departures[0];
        assert_eq!(
            first.scheduled,
            Utc.with_ymd_and_hms(2026, 1, 27, 7, 10, 0).unwrap()
        );
        assert_eq!(
            first.expected,
            Some(Utc.with_ymd_and_hms(2026, 1, 27, 7, 12, 0).unwrap())
        );
        assert_eq!(board.departures[1].expected, None);
    }

    #[test]
    fn deviations_are_kept_unfiltered() {
        let board = board();
        assert_eq!(board.deviations.len(), 2);
        assert_eq!(board.deviations[0].message, "Hissen är ur funktion");
        assert_eq!(board.deviations[1].importance, Some(1));
    }

    #[test]
    fn missing_lists_decode_as_empty() {
        let response: DeparturesResponse = http::decode_json("{}", DEPARTURES_FEED).unwrap();
        let board = response.into_board(
            &DepartureFilter::new("Kungsträdgården"),
            &chrono_tz::Europe::Stockholm,
        );
        assert_eq!(board, DepartureBoard::default());
    }

    #[test]
    fn null_lists_decode_as_empty() {
        let body = r#"{"departures": [
            {"destination": "Kungsträdgården", "scheduled": "2026-01-27T08:10:00",
             "line": {"designation": "11", "transport_mode": "METRO"}}
        ], "stop_deviations": null}"#;
        let response: DeparturesResponse = http::decode_json(body, DEPARTURES_FEED).unwrap();
        let board = response.into_board(
            &DepartureFilter::new("Kungsträdgården"),
            &chrono_tz::Europe::Stockholm,
        );
        assert_eq!(board.departures.len(), 1);
        assert!(board.deviations.is_empty());

        let response: DeparturesResponse =
            http::decode_json(r#"{"departures": null}"#, DEPARTURES_FEED).unwrap();
        assert!(response.departures.is_empty());
        assert!(response.stop_deviations.is_empty());
    }

    #[test]
    fn config_with_base_url() {
        let config = TransitConfig::new("Kungsträdgården", chrono_tz::Europe::Stockholm)
            .with_base_url("http://localhost:5173/api/sl");
        assert_eq!(config.base_url, "http://localhost:5173/api/sl");
        assert_eq!(config.filter.modes, ALLOWED_MODES);
    }
}
