//! Revalidation window for live race sets.
//!
//! The last live result is reused until its window expires. Placeholder
//! results are never stored, so the next request retries the sources.

use std::time::Duration;

use nextrace_core::{FallbackTier, RaceSet};
use tokio::time::Instant;
use tracing::{debug, trace};

/// A stored race set and its expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached set.
    pub set: RaceSet,
    /// When the entry expires (monotonic clock).
    expires_at: Instant,
}

impl CacheEntry {
    /// Creates a new entry expiring after `ttl`.
    pub fn new(set: RaceSet, ttl: Duration) -> Self {
        Self {
            set,
            expires_at: Instant::now() + ttl,
        }
    }

    /// Returns true if the entry has expired.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Returns the time until expiration.
    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

/// Holds the most recent live race set.
#[derive(Debug)]
pub struct RevalidationWindow {
    ttl: Duration,
    entry: Option<CacheEntry>,
}

impl RevalidationWindow {
    /// Creates an empty window of length `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// Returns the window length.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the stored set if it is still fresh.
    pub fn get_valid(&self) -> Option<&RaceSet> {
        let entry = self.entry.as_ref().filter(|entry| !entry.is_expired())?;
        trace!(
            remaining_ms = entry.time_until_expiry().as_millis() as u64,
            "Reusing race set"
        );
        Some(&entry.set)
    }

    /// Stores a set if it came from the live tier.
    ///
    /// Returns true if the set was stored.
    pub fn store(&mut self, set: &RaceSet) -> bool {
        if set.tier != FallbackTier::Live || self.ttl.is_zero() {
            debug!(tier = %set.tier, "Not caching race set");
            self.entry = None;
            return false;
        }
        self.entry = Some(CacheEntry::new(set.clone(), self.ttl));
        debug!(
            races = set.len(),
            ttl_secs = self.ttl.as_secs(),
            "Cached race set"
        );
        true
    }

    /// Drops the stored set.
    pub fn clear(&mut self) {
        if self.entry.take().is_some() {
            debug!("Cleared cached race set");
        }
    }
}
