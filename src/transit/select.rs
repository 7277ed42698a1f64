//! Which departure to catch.
//!
//! Recomputed from the current departure list on every countdown tick, so
//! nothing here is stored between polls.

use chrono::{DateTime, Utc};

use super::types::Departure;

/// Minutes it takes to walk to the platform.
pub const WALK_MINUTES: i64 = 10;

/// How many upcoming departures are shown.
pub const VISIBLE_DEPARTURES: usize = 3;

/// Whole minutes from `now` until `instant`, or `None` once it has passed.
pub fn minutes_until(instant: DateTime<Utc>, now: DateTime<Utc>) -> Option<i64> {
    let millis = (instant - now).num_milliseconds();
    if millis <= 0 {
        None
    } else {
        Some(millis / 60_000)
    }
}

/// Colour family of a metro line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineColor {
    Blue,
    Red,
    Green,
}

impl LineColor {
    pub fn for_designation(designation: &str) -> Option<Self> {
        let digits: String = designation
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        match digits.parse::<u32>().ok()? {
            10 | 11 => Some(LineColor::Blue),
            13 | 14 => Some(LineColor::Red),
            17..=19 => Some(LineColor::Green),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveBy {
    CannotMakeIt,
    LeaveIn(i64),
}

impl LeaveBy {
    pub fn for_minutes(minutes_until: i64) -> Self {
        if minutes_until <= WALK_MINUTES {
            LeaveBy::CannotMakeIt
        } else {
            LeaveBy::LeaveIn(minutes_until - WALK_MINUTES)
        }
    }

    pub fn label(&self) -> String {
        match self {
            LeaveBy::CannotMakeIt => "Hinner ej gå".to_string(),
            LeaveBy::LeaveIn(1) => "Gå om 1 min".to_string(),
            LeaveBy::LeaveIn(n) => format!("Gå om {n} min"),
        }
    }
}

/// A departure that has not left yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upcoming<'a> {
    pub departure: &'a Departure,
    pub minutes_until: i64,
}

impl Upcoming<'_> {
    pub fn delay_minutes(&self) -> i64 {
        self.departure.delay_minutes()
    }

    pub fn line_color(&self) -> Option<LineColor> {
        LineColor::for_designation(&self.departure.line)
    }

    pub fn leave_by(&self) -> LeaveBy {
        LeaveBy::for_minutes(self.minutes_until)
    }

    pub fn countdown_label(&self) -> String {
        match self.minutes_until {
            0 => "Nu".to_string(),
            1 => "1 min".to_string(),
            n => format!("{n} min"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DepartureSelection<'a> {
    pub visible: Vec<Upcoming<'a>>,
    next: Option<usize>,
}

impl<'a> DepartureSelection<'a> {
    pub fn compute(departures: &'a [Departure], now: DateTime<Utc>) -> Self {
        let visible: Vec<_> = departures
            .iter()
            .filter_map(|departure| {
                minutes_until(departure.effective(), now).map(|minutes_until| Upcoming {
                    departure,
                    minutes_until,
                })
            })
            .take(VISIBLE_DEPARTURES)
            .collect();

        let next = visible
            .iter()
            .position(|u| u.minutes_until > WALK_MINUTES)
            .or(if visible.is_empty() { None } else { Some(0) });

        Self { visible, next }
    }

    /// The one to catch: first reachable on foot, else the first one shown.
    pub fn next(&self) -> Option<&Upcoming<'a>> {
        self.next.and_then(|i| self.visible.get(i))
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 27, 8, 0, 0).unwrap()
    }

    fn leaving_in(minutes: i64) -> Departure {
        Departure {
            line: "11".into(),
            destination: "Kungsträdgården".into(),
            scheduled: now() + Duration::minutes(minutes) + Duration::seconds(30),
            expected: None,
        }
    }

    fn minutes(selection: &DepartureSelection) -> Vec<i64> {
        selection.visible.iter().map(|u| u.minutes_until).collect()
    }

    #[test]
    fn picks_first_reachable_departure() {
        let departures = [leaving_in(3), leaving_in(12), leaving_in(25)];
        let selection = DepartureSelection::compute(&departures, now());
        let next = selection.next().unwrap();
        assert_eq!(next.minutes_until, 12);
        assert_eq!(next.leave_by(), LeaveBy::LeaveIn(2));
        assert_eq!(next.leave_by().label(), "Gå om 2 min");
    }

    #[test]
    fn falls_back_to_first_when_none_reachable() {
        let departures = [leaving_in(2), leaving_in(5), leaving_in(8)];
        let selection = DepartureSelection::compute(&departures, now());
        let next = selection.next().unwrap();
        assert_eq!(next.minutes_until, 2);
        assert_eq!(next.leave_by(), LeaveBy::CannotMakeIt);
        assert_eq!(next.leave_by().label(), "Hinner ej gå");
    }

    #[test]
    fn empty_list_has_no_next() {
        let selection = DepartureSelection::compute(&[], now());
        assert!(selection.is_empty());
        assert!(selection.next().is_none());
    }

    #[test]
    fn drops_departed_and_caps_in_feed_order() {
        let departures = [
            leaving_in(-2),
            leaving_in(20),
            leaving_in(4),
            leaving_in(30),
            leaving_in(40),
        ];
        let selection = DepartureSelection::compute(&departures, now());
        assert_eq!(minutes(&selection), [20, 4, 30]);
    }

    #[test]
    fn expected_time_drives_the_countdown() {
        let mut late = leaving_in(5);
        late.expected = Some(late.scheduled + Duration::minutes(7));
        let selection = DepartureSelection::compute(std::slice::from_ref(&late), now());
        let next = selection.next().unwrap();
        assert_eq!(next.minutes_until, 12);
        assert_eq!(next.delay_minutes(), 7);

        let mut gone = leaving_in(5);
        gone.expected = Some(now() - Duration::minutes(1));
        assert!(DepartureSelection::compute(&[gone], now()).is_empty());
    }

    #[test]
    fn departure_exactly_now_is_gone() {
        assert_eq!(minutes_until(now(), now()), None);
        assert_eq!(minutes_until(now() + Duration::seconds(59), now()), Some(0));
    }

    #[test]
    fn countdown_labels() {
        let d = leaving_in(0);
        let label = |minutes_until| {
            Upcoming {
                departure: &d,
                minutes_until,
            }
            .countdown_label()
        };
        assert_eq!(label(0), "Nu");
        assert_eq!(label(1), "1 min");
        assert_eq!(label(14), "14 min");
        assert_eq!(LeaveBy::LeaveIn(1).label(), "Gå om 1 min");
    }

    #[test]
    fn line_colours() {
        assert_eq!(LineColor::for_designation("10"), Some(LineColor::Blue));
        assert_eq!(LineColor::for_designation("11"), Some(LineColor::Blue));
        assert_eq!(LineColor::for_designation("13"), Some(LineColor::Red));
        assert_eq!(LineColor::for_designation("14"), Some(LineColor::Red));
        assert_eq!(LineColor::for_designation("17"), Some(LineColor::Green));
        assert_eq!(LineColor::for_designation("19X"), Some(LineColor::Green));
        assert_eq!(LineColor::for_designation("12"), None);
        assert_eq!(LineColor::for_designation("–"), None);
    }

    proptest! {
        #[test]
        fn refiltering_is_a_no_op(offsets in prop::collection::vec(-60i64..120, 0..12)) {
            let departures: Vec<_> = offsets.iter().map(|m| leaving_in(*m)).collect();
            let first = DepartureSelection::compute(&departures, now());
            let kept: Vec<Departure> = first.visible.iter().map(|u| u.departure.clone()).collect();
            let second = DepartureSelection::compute(&kept, now());
            prop_assert_eq!(minutes(&first), minutes(&second));
            prop_assert!(first.visible.len() <= VISIBLE_DEPARTURES);
            prop_assert!(first.visible.iter().all(|u| u.departure.effective() > now()));
        }

        #[test]
        fn next_is_reachable_or_first(offsets in prop::collection::vec(0i64..60, 1..8)) {
            let departures: Vec<_> = offsets.iter().map(|m| leaving_in(*m)).collect();
            let selection = DepartureSelection::compute(&departures, now());
            let next = selection.next().unwrap();
            match selection.visible.iter().find(|u| u.minutes_until > WALK_MINUTES) {
                Some(reachable) => prop_assert_eq!(next, reachable),
                None => prop_assert_eq!(next, &selection.visible[0]),
            }
        }
    }
}
