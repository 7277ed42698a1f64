//! Swedish date and clock labels.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc, Weekday};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mars", "Apr", "Maj", "Juni", "Juli", "Aug", "Sep", "Okt", "Nov", "Dec",
];

fn weekday(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mån",
        Weekday::Tue => "Tis",
        Weekday::Wed => "Ons",
        Weekday::Thu => "Tors",
        Weekday::Fri => "Fre",
        Weekday::Sat => "Lör",
        Weekday::Sun => "Sön",
    }
}

/// "Mån 27 Jan"
pub fn short_day(date: NaiveDate) -> String {
    format!(
        "{} {} {}",
        weekday(date.weekday()),
        date.day(),
        MONTHS[date.month0() as usize]
    )
}

/// "08:05" in the given zone.
pub fn clock<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.with_timezone(tz).format("%H:%M").to_string()
}
