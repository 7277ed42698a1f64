use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::header::CACHE_CONTROL;

use crate::error::FeedError;
use crate::http;
use crate::source::CalendarSource;

use super::{ics, select_day, CalendarDay};

const FEED: &str = "Kalender";

pub const NOT_A_CALENDAR: &str = "Kalendern returnerade inte en giltig ICS-fil";

const BOM: char = '\u{feff}';

/// Parse a fetched document and select the day to show.
pub fn decode_document<Z: TimeZone>(text: &str, now: &DateTime<Z>) -> Result<CalendarDay, FeedError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    if !ics::looks_like_calendar(text) {
        return Err(FeedError::Parse(NOT_A_CALENDAR.to_string()));
    }

    let tz = now.timezone();
    let events: Vec<_> = ics::parse(text)
        .iter()
        .filter_map(|e| e.resolve(&tz))
        .collect();
    tracing::debug!(events = events.len(), "parsed calendar");
    Ok(select_day(&events, now))
}

#[derive(Debug, Clone)]
pub struct CalendarClient {
    http: reqwest::Client,
    url: String,
    timezone: Tz,
}

impl CalendarClient {
    pub fn new(url: impl Into<String>, timezone: Tz) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: http::client()?,
            url: url.into(),
            timezone,
        })
    }

    async fn fetch(&self) -> Result<String, FeedError> {
        let request = self.http.get(&self.url).header(CACHE_CONTROL, "no-store");
        let response = match http::send_checked(request, FEED).await {
            Err(FeedError::Http { source, .. }) if source.is_connect() || source.is_timeout() => {
                return Err(FeedError::Unreachable(source))
            }
            other => other?,
        };
        response.text().await.map_err(|e| FeedError::http(FEED, e))
    }
}

impl CalendarSource for CalendarClient {
    async fn upcoming_day(&self) -> Result<CalendarDay, FeedError> {
        let text = self.fetch().await?;
        let now = Utc::now().with_timezone(&self.timezone);
        decode_document(&text, &now)
    }
}
