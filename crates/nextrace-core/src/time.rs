//! Argentina wall-clock helpers.
//!
//! Every source page publishes naive local times for Argentina. This module
//! owns the conversions between those naive values and absolute UTC instants,
//! the Spanish month/weekday vocabulary found in listings, and the
//! week-closing arithmetic used by calendar export.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;

/// The timezone every naive time extracted from a source is interpreted in.
pub const ARGENTINA: Tz = chrono_tz::America::Argentina::Buenos_Aires;

/// IANA name of [`ARGENTINA`], used as the declared calendar timezone.
pub const ARGENTINA_TZ_NAME: &str = "America/Argentina/Buenos_Aires";

/// Three-letter Spanish month abbreviations, January first.
pub const SPANISH_MONTHS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

/// Converts a naive Argentina wall-clock time to a UTC instant.
///
/// Returns `None` only for local times that do not exist in the zone.
pub fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    ARGENTINA
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Returns the UTC instant of local midnight on `date`.
pub fn start_of_local_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    local_to_utc(date.and_time(NaiveTime::MIN))
}

/// Returns the Argentina calendar day an instant falls on.
pub fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&ARGENTINA).date_naive()
}

/// Returns the Sunday closing the week of `date`; a Sunday maps to itself.
pub fn upcoming_sunday(date: NaiveDate) -> NaiveDate {
    let days_left = 6 - i64::from(date.weekday().num_days_from_monday());
    date + Duration::days(days_left)
}

/// Returns 23:59:59 Argentina time on the Sunday closing the week of `instant`.
pub fn end_of_local_week(instant: DateTime<Utc>) -> DateTime<Utc> {
    let sunday = upcoming_sunday(local_date(instant));
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    // Argentina has no DST, so the local close always exists.
    local_to_utc(sunday.and_time(last_second)).unwrap_or(instant)
}

/// Maps a month token to its 1-based index.
///
/// Accepts numeric tokens (`"8"`, `"08"`) and Spanish names matched on their
/// first three letters, case-insensitively (`"AGO"`, `"agosto"`, `"Set."`).
pub fn month_from_token(token: &str) -> Option<u32> {
    let token = token.trim().trim_end_matches('.');
    if token.is_empty() {
        return None;
    }

    if token.chars().all(|c| c.is_ascii_digit()) {
        return token.parse::<u32>().ok().filter(|m| (1..=12).contains(m));
    }

    let prefix: String = token.chars().take(3).collect::<String>().to_lowercase();
    if prefix == "set" {
        return Some(9);
    }
    SPANISH_MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|idx| idx as u32 + 1)
}

/// Infers the year of a listing entry that only shows day and month.
///
/// The current year is used unless the month is strictly before the current
/// month, in which case the entry belongs to next year's calendar.
pub fn infer_year(month: u32, today: NaiveDate) -> i32 {
    if month < today.month() {
        today.year() + 1
    } else {
        today.year()
    }
}

/// Maps a Spanish weekday label (`"Viernes"`, `"SÁBADO 9"`) to a [`Weekday`].
pub fn weekday_from_label(label: &str) -> Option<Weekday> {
    let label = label.to_lowercase();
    let table = [
        ("lunes", Weekday::Mon),
        ("martes", Weekday::Tue),
        ("miercoles", Weekday::Wed),
        ("miércoles", Weekday::Wed),
        ("jueves", Weekday::Thu),
        ("viernes", Weekday::Fri),
        ("sabado", Weekday::Sat),
        ("sábado", Weekday::Sat),
        ("domingo", Weekday::Sun),
    ];
    table
        .iter()
        .find(|(name, _)| label.contains(name))
        .map(|(_, day)| *day)
}

/// Returns the latest date on or before `anchor` that falls on `weekday`.
pub fn weekday_on_or_before(anchor: NaiveDate, weekday: Weekday) -> NaiveDate {
    let back = (7 + i64::from(anchor.weekday().num_days_from_monday())
        - i64::from(weekday.num_days_from_monday()))
        % 7;
    anchor - Duration::days(back)
}

/// Parses an `HH:MM` (or `HH.MM`, `HHhs`) wall-clock fragment.
pub fn parse_clock(text: &str) -> Option<NaiveTime> {
    let digits: Vec<u32> = text
        .trim()
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .take(2)
        .filter_map(|part| part.parse().ok())
        .collect();

    match digits.as_slice() {
        [hour, minute] => NaiveTime::from_hms_opt(*hour, *minute, 0),
        [hour] => NaiveTime::from_hms_opt(*hour, 0, 0),
        _ => None,
    }
}
