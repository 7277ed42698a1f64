//! Canned weather for development.
//!
//! The scenarios cycle on explicit user action rather than on a timer, so
//! every theme can be looked at without waiting for the sky to change.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::FeedError;
use crate::source::WeatherSource;

use super::WeatherSnapshot;

const fn preset(
    code: i32,
    is_day: bool,
    temp: f64,
    humidity: f64,
    label: &'static str,
) -> WeatherSnapshot {
    WeatherSnapshot {
        temp: Some(temp),
        humidity: Some(humidity),
        code,
        is_day,
        label,
    }
}

pub const DEV_SCENARIOS: &[WeatherSnapshot] = &[
    preset(0, true, 22.0, 45.0, "Klart"),
    preset(0, false, 14.0, 60.0, "Klart"),
    preset(1, true, 19.0, 52.0, "Nästan klart"),
    preset(2, true, 18.0, 58.0, "Delvis molnigt"),
    preset(2, false, 10.0, 72.0, "Delvis molnigt"),
    preset(3, true, 12.0, 78.0, "Mulet"),
    preset(3, false, 8.0, 85.0, "Mulet"),
    preset(45, true, 5.0, 95.0, "Dimma"),
    preset(61, true, 11.0, 88.0, "Lätt regn"),
    preset(63, false, 7.0, 92.0, "Regn"),
    preset(71, true, -2.0, 80.0, "Snö"),
    preset(80, true, 13.0, 82.0, "Regnbyar"),
    preset(95, false, 16.0, 75.0, "Åskväder"),
];

/// Deterministic cycle over [`DEV_SCENARIOS`].
#[derive(Debug, Default)]
pub struct CannedWeather {
    index: AtomicUsize,
}

impl CannedWeather {
    pub fn scenario(&self) -> &'static WeatherSnapshot {
        &DEV_SCENARIOS[self.index.load(Ordering::Relaxed) % DEV_SCENARIOS.len()]
    }

    /// Move to the next scenario, wrapping around.
    pub fn advance(&self) -> &'static WeatherSnapshot {
        let next = (self.index.load(Ordering::Relaxed) + 1) % DEV_SCENARIOS.len();
        self.index.store(next, Ordering::Relaxed);
        &DEV_SCENARIOS[next]
    }
}

impl WeatherSource for CannedWeather {
    async fn current(&self) -> Result<WeatherSnapshot, FeedError> {
        Ok(self.scenario().clone())
    }
}

/// Serves canned scenarios until switched to the live source.
///
/// Switching is one-way: once live, the dashboard stays live.
#[derive(Debug)]
pub struct SwitchableWeather<L> {
    live: L,
    canned: CannedWeather,
    use_live: AtomicBool,
}

impl<L> SwitchableWeather<L> {
    pub fn live(source: L) -> Self {
        Self {
            live: source,
            canned: CannedWeather::default(),
            use_live: AtomicBool::new(true),
        }
    }

    pub fn canned(source: L) -> Self {
        Self {
            live: source,
            canned: CannedWeather::default(),
            use_live: AtomicBool::new(false),
        }
    }

    pub fn is_live(&self) -> bool {
        self.use_live.load(Ordering::Relaxed)
    }

    pub fn go_live(&self) {
        self.use_live.store(true, Ordering::Relaxed);
    }

    /// The canned scenario on show, if not live.
    pub fn scenario(&self) -> Option<&'static WeatherSnapshot> {
        (!self.is_live()).then(|| self.canned.scenario())
    }

    /// Advance the canned cycle. No-op once live.
    pub fn cycle(&self) -> Option<&'static WeatherSnapshot> {
        (!self.is_live()).then(|| self.canned.advance())
    }
}

impl<L: WeatherSource> WeatherSource for SwitchableWeather<L> {
    async fn current(&self) -> Result<WeatherSnapshot, FeedError> {
        if self.is_live() {
            self.live.current().await
        } else {
            Ok(self.canned.scenario().clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    impl WeatherSource for Offline {
        async fn current(&self) -> Result<WeatherSnapshot, FeedError> {
            Err(FeedError::Status {
                feed: "Weather",
                status: 502,
            })
        }
    }

    #[test]
    fn cycle_wraps_around() {
        let canned = CannedWeather::default();
        assert_eq!(canned.scenario(), &DEV_SCENARIOS[0]);
        for _ in 1..DEV_SCENARIOS.len() {
            canned.advance();
        }
        assert_eq!(canned.scenario(), DEV_SCENARIOS.last().unwrap());
        assert_eq!(canned.advance(), &DEV_SCENARIOS[0]);
    }

    #[test]
    fn scenario_labels_match_the_table() {
        for s in DEV_SCENARIOS {
            assert_eq!(s.label, crate::weather::label_for(s.code));
        }
    }

    #[tokio::test]
    async fn switchable_serves_canned_until_live() {
        let weather = SwitchableWeather::canned(Offline);
        assert_eq!(weather.current().await.unwrap(), DEV_SCENARIOS[0]);

        assert_eq!(weather.cycle(), Some(&DEV_SCENARIOS[1]));
        assert_eq!(weather.current().await.unwrap(), DEV_SCENARIOS[1]);

        weather.go_live();
        assert!(weather.scenario().is_none());
        assert!(weather.cycle().is_none());
        assert!(weather.current().await.is_err());
    }
}
