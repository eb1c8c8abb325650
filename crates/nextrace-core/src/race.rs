//! Normalized race records.
//!
//! - [`NormalizedRace`]: the canonical "next race" of one category
//! - [`ScheduleEntry`]: one practice/qualifying/race session of that event
//! - [`CountdownTarget`]: what a countdown should point at
//! - [`RaceSet`]: at most one race per category, sorted by start

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::CategoryDescriptor;

/// Whether a session has already produced results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// The session has results published.
    Finished,
    /// The session has not run yet.
    Upcoming,
}

impl SessionStatus {
    /// Returns the Spanish label shown by the source pages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Finished => "Finalizada",
            Self::Upcoming => "Próxima",
        }
    }
}

/// One session of an event weekend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Day label as published (`"Viernes"`).
    pub day: String,
    /// Human time as published (`"13:30"`).
    pub time: String,
    /// Activity name (`"Clasificación"`).
    pub activity: String,
    /// The resolved session start, when the day and time could be resolved.
    pub starts_at: Option<DateTime<Utc>>,
    /// Link to the session results.
    pub result_link: Option<String>,
    /// Finished/upcoming marker, when the source publishes one.
    pub status: Option<SessionStatus>,
}

impl ScheduleEntry {
    /// Creates a session entry without a resolved instant.
    pub fn new(
        day: impl Into<String>,
        time: impl Into<String>,
        activity: impl Into<String>,
    ) -> Self {
        Self {
            day: day.into(),
            time: time.into(),
            activity: activity.into(),
            starts_at: None,
            result_link: None,
            status: None,
        }
    }

    /// Builder method to set the resolved start.
    pub fn with_starts_at(mut self, starts_at: DateTime<Utc>) -> Self {
        self.starts_at = Some(starts_at);
        self
    }

    /// Builder method to set the results link.
    pub fn with_result_link(mut self, link: impl Into<String>) -> Self {
        self.result_link = Some(link.into());
        self
    }

    /// Builder method to set the status.
    pub fn with_status(mut self, status: SessionStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns true if the session starts strictly after `now`.
    pub fn is_future_at(&self, now: DateTime<Utc>) -> bool {
        self.starts_at.is_some_and(|at| at > now)
    }
}

/// The instant a countdown display should target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownTarget {
    /// Name of the targeted session.
    pub label: String,
    /// When the targeted session starts.
    pub at: DateTime<Utc>,
    /// True when every session is over and this is the last one.
    pub finished: bool,
}

/// The next upcoming race of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRace {
    /// Category identifier.
    pub category_id: String,
    /// Category display name.
    pub category_name: String,
    /// Category short name.
    pub short_name: String,
    /// Absolute event start.
    pub date: DateTime<Utc>,
    /// Circuit name.
    pub circuit_name: String,
    /// Free-text location.
    pub location: String,
    /// Circuit image reference.
    pub circuit_image: String,
    /// Per-session schedule, empty when the detail page had none.
    pub schedule: Vec<ScheduleEntry>,
    /// Live broadcast URL, when a live indicator is published.
    pub live_url: Option<String>,
    /// Live indicator present and no session left upcoming.
    pub is_live: bool,
    /// Whether `schedule` came from a detailed per-session listing.
    pub has_detailed_schedule: bool,
    /// Countdown target derived from the schedule.
    pub countdown: Option<CountdownTarget>,
    /// Every session of the event is in the past.
    pub event_finished: bool,
    /// Copied from the category: export as an all-day weekend range.
    pub weekend_spanning: bool,
}

impl NormalizedRace {
    /// Creates a race for `category` starting at `date`.
    pub fn new(
        category: &CategoryDescriptor,
        date: DateTime<Utc>,
        circuit_name: impl Into<String>,
    ) -> Self {
        Self {
            category_id: category.id.clone(),
            category_name: category.name.clone(),
            short_name: category.short_name.clone(),
            date,
            circuit_name: circuit_name.into(),
            location: String::new(),
            circuit_image: String::new(),
            schedule: Vec::new(),
            live_url: None,
            is_live: false,
            has_detailed_schedule: false,
            countdown: None,
            event_finished: false,
            weekend_spanning: category.weekend_spanning,
        }
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder method to set the circuit image.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.circuit_image = image.into();
        self
    }

    /// Builder method to attach a detailed schedule.
    pub fn with_schedule(mut self, schedule: Vec<ScheduleEntry>) -> Self {
        self.has_detailed_schedule = !schedule.is_empty();
        self.schedule = schedule;
        self
    }

    /// Builder method to set the live broadcast URL.
    pub fn with_live_url(mut self, url: impl Into<String>) -> Self {
        self.live_url = Some(url.into());
        self
    }
}

/// Which fallback tier produced a [`RaceSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackTier {
    /// Scraped from the live sources; some categories may be missing.
    Live,
    /// Deterministic placeholders; every source failed.
    Placeholder,
}

impl FallbackTier {
    /// Returns a stable name for logs and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Placeholder => "placeholder",
        }
    }
}

impl fmt::Display for FallbackTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// At most one race per category, ascending by start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceSet {
    races: Vec<NormalizedRace>,
    /// The tier that produced these races.
    pub tier: FallbackTier,
    /// When the set was assembled.
    pub generated_at: DateTime<Utc>,
}

impl RaceSet {
    /// Builds a set, keeping the earliest race per category and sorting by start.
    pub fn new(
        mut races: Vec<NormalizedRace>,
        tier: FallbackTier,
        generated_at: DateTime<Utc>,
    ) -> Self {
        races.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.category_id.cmp(&b.category_id))
        });
        let mut seen = std::collections::HashSet::new();
        races.retain(|race| seen.insert(race.category_id.clone()));
        Self {
            races,
            tier,
            generated_at,
        }
    }

    /// Returns the races in start order.
    pub fn races(&self) -> &[NormalizedRace] {
        &self.races
    }

    /// Looks up the race of a category.
    pub fn get(&self, category_id: &str) -> Option<&NormalizedRace> {
        self.races.iter().find(|r| r.category_id == category_id)
    }

    /// Number of races in the set.
    pub fn len(&self) -> usize {
        self.races.len()
    }

    /// Returns true if the set holds no race.
    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }

    /// Iterates over the races in start order.
    pub fn iter(&self) -> impl Iterator<Item = &NormalizedRace> {
        self.races.iter()
    }
}
