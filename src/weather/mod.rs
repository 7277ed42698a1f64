//! Current weather (Open-Meteo) and the theme derived from it.

mod client;
mod scenarios;
mod theme;

pub use client::{OpenMeteoClient, WeatherConfig, DEFAULT_BASE_URL};
pub use scenarios::{CannedWeather, SwitchableWeather, DEV_SCENARIOS};
pub use theme::{Icon, WeatherTheme};

/// One current-conditions reading. Replaced wholesale on every poll.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// °C
    pub temp: Option<f64>,
    /// %
    pub humidity: Option<f64>,
    /// WMO weather code.
    pub code: i32,
    pub is_day: bool,
    pub label: &'static str,
}

impl WeatherSnapshot {
    pub fn theme(&self) -> WeatherTheme {
        WeatherTheme::for_code(self.code, self.is_day)
    }
}

/// Short display label for a WMO code.
pub fn label_for(code: i32) -> &'static str {
    match code {
        0 => "Klart",
        1 => "Nästan klart",
        2 => "Delvis molnigt",
        3 => "Mulet",
        45 | 48 => "Dimma",
        51 | 53 | 55 => "Duggregn",
        61 => "Lätt regn",
        63 => "Regn",
        65 => "Kraftigt regn",
        71 | 73 | 75 | 77 => "Snö",
        80..=82 => "Regnbyar",
        85 | 86 => "Snöbyar",
        95 | 96 | 99 => "Åskväder",
        _ => "Okänd",
    }
}
