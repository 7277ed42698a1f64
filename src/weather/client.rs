use serde::Deserialize;

use crate::error::FeedError;
use crate::http;
use crate::source::WeatherSource;

use super::{label_for, WeatherSnapshot};

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

const FEED: &str = "Weather";

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,weather_code,is_day";

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub base_url: String,
    pub latitude: f64,
    pub longitude: f64,
    /// IANA zone name passed through to the API.
    pub timezone: String,
}

impl WeatherConfig {
    pub fn new(latitude: f64, longitude: f64, timezone: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            latitude,
            longitude,
            timezone: timezone.into(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
struct ForecastResponse {
    #[serde(default)]
    current: Option<Current>,
}

#[derive(Deserialize, Debug, Default)]
struct Current {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    weather_code: Option<i32>,
    is_day: Option<i32>,
}

impl From<Current> for WeatherSnapshot {
    fn from(current: Current) -> Self {
        let code = current.weather_code.unwrap_or(0);
        Self {
            temp: current.temperature_2m,
            humidity: current.relative_humidity_2m,
            code,
            is_day: current.is_day.map_or(true, |d| d != 0),
            label: label_for(code),
        }
    }
}

/// Open-Meteo forecast API, current conditions only. No key needed.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: reqwest::Client,
    config: WeatherConfig,
}

impl OpenMeteoClient {
    pub fn new(config: WeatherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: http::client()?,
            config,
        })
    }
}

impl WeatherSource for OpenMeteoClient {
    async fn current(&self) -> Result<WeatherSnapshot, FeedError> {
        let url = format!("{}/v1/forecast", self.config.base_url);
        let request = self.http.get(url).query(&[
            ("latitude", self.config.latitude.to_string()),
            ("longitude", self.config.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("timezone", self.config.timezone.clone()),
        ]);
        let response: ForecastResponse = http::get_json(request, FEED).await?;
        Ok(response.current.unwrap_or_default().into())
    }
}
