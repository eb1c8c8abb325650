//! Category aggregation.
//!
//! Each configured category runs its own fetch chain: the adapter's
//! listing, the optional detail page, then normalization. Chains run
//! concurrently up to `max_in_flight`, each bounded by the category timeout.
//! A failed or timed-out chain contributes nothing; it never affects the
//! others.

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::{StreamExt, stream};
use nextrace_core::time::{local_date, upcoming_sunday};
use nextrace_core::{CategoryDescriptor, NormalizedRace};
use nextrace_sources::normalize::{
    countdown_target, event_start, is_upcoming, resolve, resolve_countdown, resolve_sessions,
};
use nextrace_sources::{AdapterSet, DetailPage, SourceError, SourceErrorCode, UpcomingEntry};
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::AggregatorSettings;

/// Runs the per-category fetch chains.
#[derive(Debug, Clone)]
pub struct Aggregator {
    categories: Vec<CategoryDescriptor>,
    adapters: AdapterSet,
    max_in_flight: usize,
    category_timeout: Duration,
}

impl Aggregator {
    /// Creates an aggregator over `categories`.
    pub fn new(
        categories: Vec<CategoryDescriptor>,
        adapters: AdapterSet,
        settings: &AggregatorSettings,
    ) -> Self {
        Self {
            categories,
            adapters,
            max_in_flight: settings.max_in_flight.max(1),
            category_timeout: settings.category_timeout(),
        }
    }

    /// Returns the configured categories.
    pub fn categories(&self) -> &[CategoryDescriptor] {
        &self.categories
    }

    /// Collects the next race of every category that resolves one.
    ///
    /// The result is unordered; [`nextrace_core::RaceSet`] sorts it.
    pub async fn collect(&self, now: DateTime<Utc>) -> Vec<NormalizedRace> {
        let races: Vec<NormalizedRace> = stream::iter(&self.categories)
            .map(|category| self.collect_bounded(category, now))
            .buffer_unordered(self.max_in_flight)
            .filter_map(|race| async move { race })
            .collect()
            .await;

        info!(
            resolved = races.len(),
            configured = self.categories.len(),
            "Aggregation finished"
        );
        races
    }

    async fn collect_bounded(
        &self,
        category: &CategoryDescriptor,
        now: DateTime<Utc>,
    ) -> Option<NormalizedRace> {
        let span = info_span!("category", category = %category.id);
        let chain = tokio::time::timeout(self.category_timeout, self.collect_category(category, now));
        let timeout = self.category_timeout;
        async move {
            match chain.await {
                Ok(race) => race,
                Err(_) => {
                    warn!(timeout_secs = timeout.as_secs(), "Category timed out");
                    None
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Runs one category's chain without the outer timeout.
    pub async fn collect_category(
        &self,
        category: &CategoryDescriptor,
        now: DateTime<Utc>,
    ) -> Option<NormalizedRace> {
        let adapter = match self.adapters.get(category.adapter) {
            Ok(adapter) => adapter,
            Err(e) => {
                log_failure(&e, "adapter");
                return None;
            }
        };

        let (listing, detail) = tokio::join!(
            adapter.fetch_upcoming(category, now),
            adapter.fetch_detail(category)
        );
        let listing = listing.unwrap_or_else(|e| {
            log_failure(&e, "listing");
            None
        });
        let detail = detail.unwrap_or_else(|e| {
            log_failure(&e, "detail");
            None
        });

        let race = assemble(category, listing, detail.as_ref(), now);
        match &race {
            Some(race) => debug!(date = %race.date, circuit = %race.circuit_name, "Resolved race"),
            None => info!(adapter = adapter.name(), "No upcoming race"),
        }
        race
    }
}

fn log_failure(error: &SourceError, stage: &str) {
    match error.code() {
        SourceErrorCode::ExtractionMiss => {
            debug!(stage, code = %error.code(), error = %error, "Page had nothing to extract")
        }
        code if code.is_recoverable() => {
            warn!(stage, code = %code, error = %error, "Source failed")
        }
        code => error!(stage, code = %code, error = %error, "Source misconfigured"),
    }
}

/// Builds a category's race from its listing entry and detail page.
///
/// The detail page only enriches the listing entry when both describe the
/// same race weekend; its countdown then overrides the listing date. With no
/// listing entry the detail page alone is used, provided it still describes
/// something ahead of `now`.
pub fn assemble(
    category: &CategoryDescriptor,
    listing: Option<UpcomingEntry>,
    detail: Option<&DetailPage>,
    now: DateTime<Utc>,
) -> Option<NormalizedRace> {
    let detail_raw = detail.and_then(DetailPage::as_extraction);
    let detail_at = detail_raw.as_ref().and_then(|raw| match resolve(raw, now) {
        Ok(at) => Some(at),
        Err(e) => {
            warn!(error = %e, "Detail page date unresolved");
            None
        }
    });

    match listing {
        Some(entry) => {
            let same_weekend = detail_at.is_some_and(|at| {
                upcoming_sunday(local_date(at)) == upcoming_sunday(local_date(entry.starts_at))
            });
            let detail = detail.filter(|_| same_weekend);
            let starts_at = detail
                .and_then(|page| page.countdown)
                .and_then(resolve_countdown)
                .unwrap_or(entry.starts_at);

            let raw = entry.raw;
            let race = NormalizedRace::new(category, starts_at, &raw.circuit)
                .with_location(&raw.location)
                .with_image(&raw.image);
            let live_url = detail
                .and_then(|page| page.live_url.clone())
                .or(raw.live_url);
            Some(finish(category, race, detail, live_url, now))
        }
        None => {
            let (page, raw, at) = match (detail, detail_raw, detail_at) {
                (Some(page), Some(raw), Some(at)) => (page, raw, at),
                _ => return None,
            };
            let race = NormalizedRace::new(category, at, &raw.circuit)
                .with_location(&raw.location)
                .with_image(&category.icon);
            let race = finish(category, race, Some(page), raw.live_url.clone(), now);

            let ahead = is_upcoming(&raw, at, now) || race.schedule.iter().any(|s| s.is_future_at(now));
            if ahead {
                debug!("Recovered race from detail page");
                Some(race)
            } else {
                None
            }
        }
    }
}

fn finish(
    category: &CategoryDescriptor,
    mut race: NormalizedRace,
    detail: Option<&DetailPage>,
    live_url: Option<String>,
    now: DateTime<Utc>,
) -> NormalizedRace {
    let schedule = detail.map(resolve_sessions).unwrap_or_default();
    race.date = event_start(category, race.date, &schedule);
    race.countdown = countdown_target(&schedule, now);
    race.event_finished = race.countdown.as_ref().is_some_and(|c| c.finished);

    let session_ahead = schedule.iter().any(|s| s.is_future_at(now));
    race.is_live = live_url.is_some() && !session_ahead;
    race.live_url = live_url;
    race.with_schedule(schedule)
}
