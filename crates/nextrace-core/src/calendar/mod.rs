//! iCalendar export of normalized races.
//!
//! Each [`NormalizedRace`] projects into exactly one `VEVENT`. Weekend-spanning
//! categories export as an all-day range closing the day after the week's
//! Sunday; every other category exports as a timed range ending Sunday
//! 23:59:59 Argentina time. The synthesizer is total: any race produces a
//! document.

#[cfg(test)]
mod golden_tests;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::race::NormalizedRace;
use crate::time::{ARGENTINA_TZ_NAME, end_of_local_week, local_date, upcoming_sunday};

/// MIME type of every exported document.
pub const CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// Suggested filename of the whole-set export.
pub const ALL_RACES_FILENAME: &str = "all_races.ics";

/// Calendar name of the whole-set export.
pub const ALL_RACES_CALENDAR_NAME: &str = "Calendario de Carreras Completo";

/// Content lines longer than this many octets are folded.
const MAX_LINE_OCTETS: usize = 75;

const CRLF: &str = "\r\n";

/// Fixed header values written into every document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarOptions {
    /// The `PRODID` value.
    pub product_id: String,
    /// The declared display timezone (`X-WR-TIMEZONE`).
    pub timezone: String,
    /// Domain appended to every event `UID`.
    pub uid_domain: String,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            product_id: "-//NextRace//NONSGML v1.0//EN".to_string(),
            timezone: ARGENTINA_TZ_NAME.to_string(),
            uid_domain: "nextrace.app".to_string(),
        }
    }
}

/// How an event occupies the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSpan {
    /// An absolute instant pair.
    Timed {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// A date range; `end` is exclusive.
    AllDay { start: NaiveDate, end: NaiveDate },
}

impl EventSpan {
    /// Computes the span of a race from its start and weekend flag.
    pub fn for_race(race: &NormalizedRace) -> Self {
        if race.weekend_spanning {
            let start = local_date(race.date);
            let end = upcoming_sunday(start) + Duration::days(1);
            Self::AllDay { start, end }
        } else {
            Self::Timed {
                start: race.date,
                end: end_of_local_week(race.date),
            }
        }
    }

    /// Returns true for all-day ranges.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay { .. })
    }
}

/// The export projection of one race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub uid: String,
    pub stamp: DateTime<Utc>,
    pub summary: String,
    pub description: String,
    pub location: String,
    pub span: EventSpan,
}

impl CalendarEvent {
    /// Projects a race into an event stamped at `generated_at`.
    pub fn from_race(
        race: &NormalizedRace,
        options: &CalendarOptions,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let year = local_date(race.date).format("%Y");
        Self {
            uid: format!("{}-{}@{}", race.category_id, year, options.uid_domain),
            stamp: generated_at,
            summary: format!("{}: {}", race.short_name, race.circuit_name),
            description: format!(
                "Carrera de {} en el autódromo {}, ubicado en {}.",
                race.category_name, race.circuit_name, race.location
            ),
            location: format!("{}, {}", race.circuit_name, race.location),
            span: EventSpan::for_race(race),
        }
    }

    fn write_to(&self, out: &mut Vec<String>) {
        out.push("BEGIN:VEVENT".to_string());
        out.push(format!("UID:{}", self.uid));
        out.push(format!("DTSTAMP:{}", format_utc(self.stamp)));
        out.push(format!("SUMMARY:{}", escape_text(&self.summary)));
        out.push(format!("DESCRIPTION:{}", escape_text(&self.description)));
        out.push(format!("LOCATION:{}", escape_text(&self.location)));
        match self.span {
            EventSpan::Timed { start, end } => {
                out.push(format!("DTSTART:{}", format_utc(start)));
                out.push(format!("DTEND:{}", format_utc(end)));
            }
            EventSpan::AllDay { start, end } => {
                out.push(format!("DTSTART;VALUE=DATE:{}", format_date(start)));
                out.push(format!("DTEND;VALUE=DATE:{}", format_date(end)));
            }
        }
        out.push("END:VEVENT".to_string());
    }
}

/// A serialized calendar ready to be served or written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDocument {
    /// The CRLF-separated iCalendar text.
    pub body: String,
    /// Suggested download filename.
    pub filename: String,
    /// MIME type for the response.
    pub content_type: &'static str,
}

/// Builds the single-event document of one race.
pub fn race_document(
    race: &NormalizedRace,
    options: &CalendarOptions,
    generated_at: DateTime<Utc>,
) -> CalendarDocument {
    let name = format!("{} Calendario", race.short_name);
    let events = [CalendarEvent::from_race(race, options, generated_at)];
    CalendarDocument {
        body: render(&name, &events, options),
        filename: format!("{}.ics", race.category_id),
        content_type: CONTENT_TYPE,
    }
}

/// Builds one document holding an event per race, in the given order.
pub fn races_document<'a>(
    races: impl IntoIterator<Item = &'a NormalizedRace>,
    options: &CalendarOptions,
    generated_at: DateTime<Utc>,
) -> CalendarDocument {
    let events: Vec<_> = races
        .into_iter()
        .map(|race| CalendarEvent::from_race(race, options, generated_at))
        .collect();
    CalendarDocument {
        body: render(ALL_RACES_CALENDAR_NAME, &events, options),
        filename: ALL_RACES_FILENAME.to_string(),
        content_type: CONTENT_TYPE,
    }
}

fn render(calendar_name: &str, events: &[CalendarEvent], options: &CalendarOptions) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", options.product_id),
        format!("X-WR-CALNAME:{}", escape_text(calendar_name)),
        format!("X-WR-TIMEZONE:{}", options.timezone),
    ];
    for event in events {
        event.write_to(&mut lines);
    }
    lines.push("END:VCALENDAR".to_string());

    let mut body = String::new();
    for line in &lines {
        body.push_str(&fold_line(line));
        body.push_str(CRLF);
    }
    body
}

/// Formats an instant in basic UTC form (`20250810T163000Z`).
pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Formats a date in basic form (`20250808`).
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Escapes a TEXT value.
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

/// Folds a content line so no physical line exceeds 75 octets.
///
/// Continuation lines start with a single space, which counts toward their
/// length. Multi-byte characters are never split.
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut folded = String::with_capacity(line.len() + 3 * (line.len() / MAX_LINE_OCTETS));
    let mut width = 0;
    for ch in line.chars() {
        let len = ch.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            folded.push_str(CRLF);
            folded.push(' ');
            width = 1;
        }
        folded.push(ch);
        width += len;
    }
    folded
}
