//! Background theme for the weather header.
//!
//! Codes are grouped into buckets: clear (0), mainly clear (1), partly
//! cloudy (2), cloudy (3), fog (45, 48), drizzle/rain (51-67), snow (71-77),
//! showers (80-82), snow showers (85-86), thunderstorm (95-99). Fog, snow and
//! thunder look the same by day and night. Anything else uses the daytime
//! cloudy look.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Clear,
    MainlyClear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Rain,
    Snow,
    Thunderstorm,
}

impl Icon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Icon::Clear => "clear",
            Icon::MainlyClear => "mainly-clear",
            Icon::PartlyCloudy => "partly-cloudy",
            Icon::Cloudy => "cloudy",
            Icon::Fog => "fog",
            Icon::Rain => "rain",
            Icon::Snow => "snow",
            Icon::Thunderstorm => "thunderstorm",
        }
    }

    pub fn glyph(&self, is_day: bool) -> &'static str {
        match (self, is_day) {
            (Icon::Clear, true) => "☀",
            (Icon::Clear, false) => "☾",
            (Icon::MainlyClear, true) => "🌤",
            (Icon::MainlyClear, false) => "☾",
            (Icon::PartlyCloudy, _) => "⛅",
            (Icon::Cloudy, _) => "☁",
            (Icon::Fog, _) => "🌫",
            (Icon::Rain, _) => "🌧",
            (Icon::Snow, _) => "❄",
            (Icon::Thunderstorm, _) => "⛈",
        }
    }
}

/// Colours are `#rrggbb`; `gradient` runs top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherTheme {
    pub icon: Icon,
    pub top_color: &'static str,
    pub gradient: [&'static str; 3],
    /// Background is light enough to need dark text.
    pub light: bool,
}

const fn theme(icon: Icon, gradient: [&'static str; 3], light: bool) -> WeatherTheme {
    WeatherTheme {
        icon,
        top_color: gradient[0],
        gradient,
        light,
    }
}

const CLOUDY_DAY: WeatherTheme = theme(Icon::Cloudy, ["#607d8b", "#78909c", "#90a4ae"], false);

impl WeatherTheme {
    pub fn for_code(code: i32, is_day: bool) -> Self {
        let night = !is_day;
        match code {
            0 if night => theme(Icon::Clear, ["#0c1445", "#1a237e", "#283593"], false),
            0 => theme(Icon::Clear, ["#5b8def", "#87ceeb", "#e8f4fc"], false),
            1 if night => theme(Icon::MainlyClear, ["#1a237e", "#283593", "#3949ab"], false),
            1 => theme(Icon::MainlyClear, ["#6b9de8", "#90b4e8", "#c5d9f0"], false),
            2 if night => theme(Icon::PartlyCloudy, ["#263056", "#364a7a", "#4a5f8f"], false),
            2 => theme(Icon::PartlyCloudy, ["#7ba3d4", "#9fc0e8", "#d4e4f4"], false),
            3 if night => theme(Icon::Cloudy, ["#37474f", "#455a64", "#546e7a"], false),
            3 => CLOUDY_DAY,
            45 | 48 => theme(Icon::Fog, ["#78909c", "#90a4ae", "#b0bec5"], false),
            51..=67 if night => theme(Icon::Rain, ["#263238", "#37474f", "#455a64"], false),
            51..=67 => theme(Icon::Rain, ["#455a64", "#546e7a", "#78909c"], false),
            71..=77 => theme(Icon::Snow, ["#b0bec5", "#cfd8dc", "#eceff1"], true),
            80..=82 if night => theme(Icon::Rain, ["#263238", "#37474f", "#455a64"], false),
            80..=82 => theme(Icon::Rain, ["#546e7a", "#607d8b", "#78909c"], false),
            85 | 86 => theme(Icon::Snow, ["#90a4ae", "#b0bec5", "#eceff1"], true),
            95..=99 => theme(Icon::Thunderstorm, ["#1a237e", "#263238", "#37474f"], false),
            _ => CLOUDY_DAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clear_differs_by_time_of_day() {
        let day = WeatherTheme::for_code(0, true);
        let night = WeatherTheme::for_code(0, false);
        assert_eq!(day.icon, Icon::Clear);
        assert_eq!(night.icon, Icon::Clear);
        assert_eq!(day.icon.as_str(), "clear");
        assert_ne!(day.gradient, night.gradient);
    }

    #[test]
    fn unknown_code_falls_back_to_cloudy() {
        assert_eq!(WeatherTheme::for_code(200, true), WeatherTheme::for_code(3, true));
        assert_eq!(WeatherTheme::for_code(200, false), WeatherTheme::for_code(3, true));
        assert_eq!(WeatherTheme::for_code(4, true).icon, Icon::Cloudy);
    }

    #[test]
    fn snow_is_light() {
        assert!(WeatherTheme::for_code(73, true).light);
        assert!(WeatherTheme::for_code(86, false).light);
        assert!(!WeatherTheme::for_code(63, true).light);
    }

    #[test]
    fn top_color_is_first_stop() {
        let theme = WeatherTheme::for_code(2, false);
        assert_eq!(theme.top_color, "#263056");
        assert_eq!(theme.top_color, theme.gradient[0]);
    }

    proptest! {
        #[test]
        fn fog_snow_and_thunder_ignore_time_of_day(
            code in prop_oneof![Just(45), Just(48), 71..=77i32, 85..=86i32, 95..=99i32]
        ) {
            prop_assert_eq!(WeatherTheme::for_code(code, true), WeatherTheme::for_code(code, false));
        }

        #[test]
        fn mapping_is_total(code in any::<i32>(), is_day in any::<bool>()) {
            let theme = WeatherTheme::for_code(code, is_day);
            prop_assert_eq!(theme, WeatherTheme::for_code(code, is_day));
            prop_assert!(theme.gradient.iter().all(|c| c.len() == 7 && c.starts_with('#')));
        }
    }
}
