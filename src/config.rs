//! Validated runtime configuration built from the command line.

use std::path::PathBuf;
use std::str::FromStr;

use chrono_tz::Tz;

use crate::cli::{Args, Mode};
use crate::transit::{self, TransitConfig};
use crate::weather::WeatherConfig;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown time zone {0:?}")]
    UnknownTimeZone(String),

    #[error("--{0} must not be blank")]
    Blank(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub station: String,
    pub towards: String,
    pub timezone: Tz,
    pub transit: TransitConfig,
    pub weather: WeatherConfig,
    /// `None` hides the calendar panel.
    pub calendar_url: Option<String>,
    pub log_file: PathBuf,
}

fn required(value: &str, flag: &'static str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ConfigError::Blank(flag))
    } else {
        Ok(value.to_string())
    }
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let station = required(&args.station, "station")?;
        let towards = required(&args.towards, "towards")?;
        let timezone = Tz::from_str(args.timezone.trim())
            .map_err(|_| ConfigError::UnknownTimeZone(args.timezone.clone()))?;
        let relay = args.relay_url.trim().trim_end_matches('/');

        let calendar_url = args
            .calendar_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| match args.mode {
                Mode::Development => format!("{relay}/api/calendar.ics"),
                Mode::Production => url.to_string(),
            });

        let transit_base = match args.mode {
            Mode::Development => format!("{relay}/api/sl"),
            Mode::Production => transit::DEFAULT_BASE_URL.to_string(),
        };
        let transit = TransitConfig::new(towards.clone(), timezone).with_base_url(transit_base);

        Ok(Self {
            mode: args.mode,
            station,
            towards,
            timezone,
            transit,
            weather: WeatherConfig::new(args.latitude, args.longitude, timezone.name()),
            calendar_url,
            log_file: PathBuf::from(args.log_file),
        })
    }

    pub fn is_development(&self) -> bool {
        self.mode == Mode::Development
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["tavla"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn production_defaults() {
        let config = Config::from_args(args(&["--mode", "production"])).unwrap();
        assert_eq!(config.station, "Duvbo");
        assert_eq!(config.towards, "Kungsträdgården");
        assert_eq!(config.timezone, chrono_tz::Europe::Stockholm);
        assert_eq!(config.transit.base_url, transit::DEFAULT_BASE_URL);
        assert_eq!(config.weather.base_url, crate::weather::DEFAULT_BASE_URL);
        assert_eq!(config.weather.timezone, "Europe/Stockholm");
        assert!(!config.is_development());
    }

    #[test]
    fn development_goes_through_relay() {
        let config = Config::from_args(args(&[
            "--mode",
            "development",
            "--relay-url",
            " http://localhost:8080/ ",
            "--calendar-url",
            "https://calendar.example.com/basic.ics",
        ]))
        .unwrap();
        assert!(config.is_development());
        assert_eq!(config.transit.base_url, "http://localhost:8080/api/sl");
        assert_eq!(
            config.calendar_url.as_deref(),
            Some("http://localhost:8080/api/calendar.ics")
        );
        assert_eq!(config.weather.base_url, crate::weather::DEFAULT_BASE_URL);
    }

    #[test]
    fn blank_calendar_url_disables_calendar() {
        let config = Config::from_args(args(&["--mode", "production", "--calendar-url", "  "])).unwrap();
        assert_eq!(config.calendar_url, None);
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            Config::from_args(args(&["--timezone", "Mars/Olympus"])).unwrap_err(),
            ConfigError::UnknownTimeZone("Mars/Olympus".into())
        );
        assert_eq!(
            Config::from_args(args(&["--station", "   "])).unwrap_err(),
            ConfigError::Blank("station")
        );
        assert_eq!(
            Config::from_args(args(&["--towards", ""])).unwrap_err(),
            ConfigError::Blank("towards")
        );
    }
}
