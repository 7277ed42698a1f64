//! Minimal iCalendar reader.
//!
//! Grammar, in order: unfold continuation lines, split the logical lines into
//! `VEVENT` blocks, then pull `SUMMARY`, `DTSTART` and `DTEND` out of each
//! block. Anything else in the document is ignored.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use super::CalendarEvent;

const UNTITLED: &str = "Namnlös";

/// A start/end marker as written in the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcsTime {
    /// `YYYYMMDD`, a calendar date with no time of day.
    Date(NaiveDate),
    /// `YYYYMMDDTHHMMSS[Z]`, read as UTC whether suffixed or not.
    DateTime(NaiveDateTime),
}

impl IcsTime {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let date = NaiveDate::parse_from_str(value.get(..8)?, "%Y%m%d").ok()?;

        let rest = &value[8..];
        let time = rest
            .strip_prefix(['T', 't'])
            .and_then(|t| t.get(..6))
            .and_then(|t| NaiveTime::parse_from_str(t, "%H%M%S").ok());

        Some(match time {
            Some(time) => IcsTime::DateTime(date.and_time(time)),
            None => IcsTime::Date(date),
        })
    }

    fn date(&self) -> NaiveDate {
        match self {
            IcsTime::Date(d) => *d,
            IcsTime::DateTime(dt) => dt.date(),
        }
    }

    /// All-day events live on local dates; everything else is UTC.
    fn instant<Tz: TimeZone>(&self, all_day: bool, tz: &Tz) -> Option<DateTime<Utc>> {
        if all_day {
            let midnight = self.date().and_time(NaiveTime::MIN);
            return tz
                .from_local_datetime(&midnight)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc));
        }
        Some(match self {
            IcsTime::Date(d) => d.and_time(NaiveTime::MIN).and_utc(),
            IcsTime::DateTime(dt) => dt.and_utc(),
        })
    }
}

/// One `VEVENT` block before time zone resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcsEvent {
    pub summary: String,
    pub start: IcsTime,
    pub end: Option<IcsTime>,
}

impl IcsEvent {
    /// Pin the event to instants. A missing end collapses onto the start.
    pub fn resolve<Tz: TimeZone>(&self, tz: &Tz) -> Option<CalendarEvent> {
        let all_day = matches!(self.start, IcsTime::Date(_));
        let start = self.start.instant(all_day, tz)?;
        let end = match &self.end {
            Some(end) => end.instant(all_day, tz)?,
            None => start,
        };
        Some(CalendarEvent {
            summary: self.summary.clone(),
            start,
            end,
            all_day,
        })
    }
}

/// Undo line folding: a line starting with a space or tab continues the
/// previous one, minus that first character.
pub fn unfold(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        match (line.strip_prefix([' ', '\t']), lines.last_mut()) {
            (Some(continuation), Some(previous)) => previous.push_str(continuation),
            _ => lines.push(line.to_string()),
        }
    }
    lines
}

pub fn looks_like_calendar(text: &str) -> bool {
    let upper = text.to_ascii_uppercase();
    upper.contains("BEGIN:VCALENDAR") || upper.contains("BEGIN:VEVENT")
}

struct Property<'a> {
    name: &'a str,
    value: &'a str,
}

/// `NAME;PARAM=x;PARAM="quoted:colon":value`
fn split_property(line: &str) -> Option<Property<'_>> {
    let mut quoted = false;
    let colon = line.char_indices().find_map(|(i, c)| match c {
        '"' => {
            quoted = !quoted;
            None
        }
        ':' if !quoted => Some(i),
        _ => None,
    })?;

    let head = &line[..colon];
    let name = head.split(';').next().unwrap_or(head);
    Some(Property {
        name,
        value: &line[colon + 1..],
    })
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[derive(Default)]
struct Block<'a> {
    summary: Option<&'a str>,
    start: Option<&'a str>,
    end: Option<&'a str>,
    /// Depth of components nested inside the event (alarms and the like).
    nested: usize,
}

impl<'a> Block<'a> {
    fn take(&mut self, line: &'a str) {
        let Some(prop) = split_property(line) else {
            return;
        };
        let slot = if prop.name.eq_ignore_ascii_case("SUMMARY") {
            &mut self.summary
        } else if prop.name.eq_ignore_ascii_case("DTSTART") {
            &mut self.start
        } else if prop.name.eq_ignore_ascii_case("DTEND") {
            &mut self.end
        } else {
            return;
        };
        slot.get_or_insert(prop.value);
    }

    fn finish(self) -> Option<IcsEvent> {
        let Some(start) = self.start.and_then(IcsTime::parse) else {
            tracing::debug!(summary = ?self.summary, "skipping event without a usable DTSTART");
            return None;
        };
        let summary = self.summary.map(|s| unescape(s.trim())).unwrap_or_default();
        Some(IcsEvent {
            summary: if summary.is_empty() {
                UNTITLED.to_string()
            } else {
                summary
            },
            start,
            end: self.end.and_then(IcsTime::parse),
        })
    }
}

/// Every well-formed event in the document, in document order.
pub fn parse(text: &str) -> Vec<IcsEvent> {
    let lines = unfold(text);
    let mut events = Vec::new();
    let mut block: Option<Block> = None;

    for line in &lines {
        let line = line.trim_end();
        let starts = |prefix: &str| {
            line.get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        };
        let (begin, end) = (starts("BEGIN:"), starts("END:"));

        match block.as_mut() {
            None => {
                if line.eq_ignore_ascii_case("BEGIN:VEVENT") {
                    block = Some(Block::default());
                }
            }
            Some(current) if current.nested > 0 => {
                if begin {
                    current.nested += 1;
                } else if end {
                    current.nested -= 1;
                }
            }
            Some(_) if line.eq_ignore_ascii_case("END:VEVENT") => {
                if let Some(event) = block.take().and_then(Block::finish) {
                    events.push(event);
                }
            }
            Some(current) if begin => current.nested = 1,
            Some(current) => current.take(line),
        }
    }

    // A final block the feed never closed still counts.
    if let Some(event) = block.and_then(Block::finish) {
        events.push(event);
    }
    events
}
