//! Pick the day worth showing.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::datefmt;

use super::CalendarEvent;

/// How far ahead we look for a day with events.
pub const HORIZON_DAYS: u64 = 31;

pub const TODAY_LABEL: &str = "Idag";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CalendarDay {
    pub date_label: Option<String>,
    /// Ordered by start.
    pub events: Vec<CalendarEvent>,
    pub is_today: bool,
}

fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Today's events if there are any, else the first later day with events
/// inside the horizon, else an empty selection.
pub fn select_day<Tz: TimeZone>(events: &[CalendarEvent], now: &DateTime<Tz>) -> CalendarDay {
    let tz = now.timezone();
    let today = now.date_naive();
    let window = local_midnight(today, &tz).zip(
        today
            .checked_add_days(Days::new(HORIZON_DAYS))
            .and_then(|d| local_midnight(d, &tz)),
    );
    let Some((today_start, horizon_end)) = window else {
        return CalendarDay::default();
    };

    let upcoming: Vec<&CalendarEvent> = events
        .iter()
        .filter(|e| e.end > today_start && e.start < horizon_end)
        .collect();

    for offset in 0..HORIZON_DAYS {
        let Some(day) = today.checked_add_days(Days::new(offset)) else {
            break;
        };
        let mut on_day: Vec<CalendarEvent> = upcoming
            .iter()
            .filter(|e| e.start.with_timezone(&tz).date_naive() == day)
            .map(|e| (*e).clone())
            .collect();
        if on_day.is_empty() {
            continue;
        }

        on_day.sort_by_key(|e| e.start);
        let is_today = offset == 0;
        return CalendarDay {
            date_label: Some(if is_today {
                TODAY_LABEL.to_string()
            } else {
                datefmt::short_day(day)
            }),
            events: on_day,
            is_today,
        };
    }

    CalendarDay::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn tz() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn now() -> DateTime<FixedOffset> {
        tz().with_ymd_and_hms(2026, 1, 27, 9, 30, 0).unwrap()
    }

    fn event(summary: &str, start: DateTime<FixedOffset>, hours: i64) -> CalendarEvent {
        let start = start.with_timezone(&Utc);
        CalendarEvent {
            summary: summary.to_string(),
            start,
            end: start + Duration::hours(hours),
            all_day: false,
        }
    }

    fn local(d: u32, h: u32) -> DateTime<FixedOffset> {
        tz().with_ymd_and_hms(2026, 1, d, h, 0, 0).unwrap()
    }

    #[test]
    fn today_wins() {
        let events = [
            event("Imorgon", local(28, 10), 1),
            event("Sent", local(27, 20), 1),
            event("Tidigt", local(27, 7), 1),
        ];
        let day = select_day(&events, &now());
        assert!(day.is_today);
        assert_eq!(day.date_label.as_deref(), Some(TODAY_LABEL));
        let names: Vec<_> = day.events.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(names, ["Tidigt", "Sent"]);
    }

    #[test]
    fn scans_forward_to_first_busy_day() {
        let events = [event("Senare", local(30, 12), 1), event("Om tre dagar", local(30, 8), 1)];
        let day = select_day(&events, &now());
        assert!(!day.is_today);
        assert_eq!(day.date_label.as_deref(), Some("Fre 30 Jan"));
        assert_eq!(day.events.len(), 2);
        assert_eq!(day.events[0].summary, "Om tre dagar");
    }

    #[test]
    fn nothing_in_horizon_is_empty() {
        let events = [
            event("Förra veckan", local(20, 12), 2),
            event("Långt bort", local(27, 12) + Duration::days(40), 1),
        ];
        assert_eq!(
            select_day(&events, &now()),
            CalendarDay {
                date_label: None,
                events: vec![],
                is_today: false,
            }
        );
        assert_eq!(select_day(&[], &now()), CalendarDay::default());
    }

    #[test]
    fn event_ending_at_midnight_is_over() {
        let events = [event("Igår", local(26, 22), 2)];
        assert_eq!(select_day(&events, &now()), CalendarDay::default());
    }

    #[test]
    fn horizon_is_exclusive() {
        let last = event("Sista", local(27, 12) + Duration::days(30), 1);
        assert_eq!(select_day(std::slice::from_ref(&last), &now()).events.len(), 1);

        let beyond = event("Utanför", local(27, 0) + Duration::days(31), 1);
        assert!(select_day(&[beyond], &now()).events.is_empty());
    }
}
