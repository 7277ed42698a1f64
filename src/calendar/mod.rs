//! Optional calendar panel fed by a public iCalendar URL.

mod client;
pub mod ics;
mod select;

use chrono::{DateTime, Utc};

pub use client::{decode_document, CalendarClient, NOT_A_CALENDAR};
pub use select::{select_day, CalendarDay, HORIZON_DAYS, TODAY_LABEL};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
}
