//! Date/time normalization.
//!
//! Turns the partial, locale-specific fragments adapters extract into
//! absolute UTC instants:
//!
//! 1. An authoritative countdown wins when present and valid
//! 2. Otherwise day + month token, year inferred by rolling forward when the
//!    month is already behind the current one, unless the source gave one
//! 3. Naive wall-clock values are Argentina local time
//!
//! Session schedules from detail pages are resolved here as well, since they
//! follow the same wall-clock rules.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use nextrace_core::time::{
    infer_year, local_date, local_to_utc, month_from_token, parse_clock, start_of_local_day,
    weekday_from_label, weekday_on_or_before,
};
use nextrace_core::{CategoryDescriptor, CountdownTarget, ScheduleEntry, SessionStatus};
use tracing::{debug, warn};

use crate::error::{SourceError, SourceResult};
use crate::raw::{CountdownParts, DetailPage, RawExtraction};

/// Anchor text marking a session whose results are published.
const RESULTS_MARKER: &str = "resultados";

/// Resolves a raw extraction to an absolute instant.
pub fn resolve(raw: &RawExtraction, now: DateTime<Utc>) -> SourceResult<DateTime<Utc>> {
    if let Some(parts) = raw.countdown {
        match resolve_countdown(parts) {
            Some(instant) => return Ok(instant),
            None => debug!(?parts, "Countdown components invalid, using listing date"),
        }
    }
    resolve_listing(raw, now)
}

/// Resolves countdown components as Argentina wall-clock time.
pub fn resolve_countdown(parts: CountdownParts) -> Option<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(parts.year, parts.month, parts.day)?;
    let time = NaiveTime::from_hms_opt(parts.hour, parts.minute, 0)?;
    local_to_utc(date.and_time(time))
}

fn resolve_listing(raw: &RawExtraction, now: DateTime<Utc>) -> SourceResult<DateTime<Utc>> {
    let day: u32 = raw
        .day
        .trim()
        .parse()
        .map_err(|_| SourceError::date_resolution(format!("Invalid day '{}'", raw.day)))?;
    let month = month_from_token(&raw.month_token).ok_or_else(|| {
        SourceError::date_resolution(format!("Unknown month token '{}'", raw.month_token))
    })?;

    let year = raw.year.unwrap_or_else(|| infer_year(month, local_date(now)));
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        SourceError::date_resolution(format!("No such date {}-{:02}-{:02}", year, month, day))
    })?;
    let time = raw
        .time
        .as_deref()
        .and_then(parse_clock)
        .unwrap_or(NaiveTime::MIN);

    local_to_utc(date.and_time(time)).ok_or_else(|| {
        SourceError::date_resolution(format!("{} {} does not exist locally", date, time))
    })
}

/// Returns true if an entry resolved to `instant` is still ahead of `now`.
///
/// Entries carrying only a date stay upcoming until their local day is over.
pub fn is_upcoming(raw: &RawExtraction, instant: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let has_clock =
        raw.countdown.is_some() || raw.time.as_deref().and_then(parse_clock).is_some();
    if has_clock {
        instant > now
    } else {
        local_date(instant) >= local_date(now)
    }
}

/// Picks the soonest upcoming entry of a listing.
///
/// Entries that fail to resolve are skipped; entries in the past are
/// excluded before selection.
pub fn select_upcoming(
    entries: Vec<RawExtraction>,
    now: DateTime<Utc>,
) -> Option<(RawExtraction, DateTime<Utc>)> {
    entries
        .into_iter()
        .filter_map(|raw| match resolve(&raw, now) {
            Ok(instant) => Some((raw, instant)),
            Err(e) => {
                warn!(error = %e, circuit = %raw.circuit, "Skipping listing entry");
                None
            }
        })
        .filter(|(raw, instant)| is_upcoming(raw, *instant, now))
        .min_by_key(|(_, instant)| *instant)
}

/// Resolves the session rows of a detail page into schedule entries.
///
/// Session days are found by walking back from the header date (the Sunday
/// of the event) to the named weekday.
pub fn resolve_sessions(page: &DetailPage) -> Vec<ScheduleEntry> {
    let anchor = page.event_date.or_else(|| {
        page.countdown
            .and_then(|parts| NaiveDate::from_ymd_opt(parts.year, parts.month, parts.day))
    });

    page.sessions
        .iter()
        .map(|session| {
            let mut entry =
                ScheduleEntry::new(&session.day_label, &session.time, &session.activity);

            let starts_at = anchor.and_then(|anchor| {
                let weekday = weekday_from_label(&session.day_label)?;
                let clock = parse_clock(&session.time)?;
                local_to_utc(weekday_on_or_before(anchor, weekday).and_time(clock))
            });
            entry.starts_at = starts_at;

            if let Some(link) = &session.link {
                entry = entry.with_result_link(link);
            }
            let finished = session
                .status_text
                .as_deref()
                .is_some_and(|text| text.to_lowercase().contains(RESULTS_MARKER));
            entry.with_status(if finished {
                SessionStatus::Finished
            } else {
                SessionStatus::Upcoming
            })
        })
        .collect()
}

/// Applies the weekend-spanning rule to a resolved start.
///
/// Weekend-spanning categories start at local midnight unless a detailed
/// schedule is known, in which case the first session sets the start.
pub fn event_start(
    category: &CategoryDescriptor,
    instant: DateTime<Utc>,
    schedule: &[ScheduleEntry],
) -> DateTime<Utc> {
    if !category.weekend_spanning {
        return instant;
    }
    if let Some(first) = schedule.iter().filter_map(|s| s.starts_at).min() {
        return first;
    }
    start_of_local_day(local_date(instant)).unwrap_or(instant)
}

/// Chooses what a countdown should target.
///
/// The first session still in the future, or when every session is over,
/// the most recent one marked finished.
pub fn countdown_target(schedule: &[ScheduleEntry], now: DateTime<Utc>) -> Option<CountdownTarget> {
    let dated = schedule
        .iter()
        .filter_map(|s| s.starts_at.map(|at| (s, at)));

    if let Some((session, at)) = dated.clone().filter(|(_, at)| *at > now).min_by_key(|(_, at)| *at)
    {
        return Some(CountdownTarget {
            label: session.activity.clone(),
            at,
            finished: false,
        });
    }

    dated
        .max_by_key(|(_, at)| *at)
        .map(|(session, at)| CountdownTarget {
            label: session.activity.clone(),
            at,
            finished: true,
        })
}
