//! SourceAdapter trait definition.
//!
//! A [`SourceAdapter`] knows how to read one site family's pages. The three
//! strategies (DOM walker, regex extractor, WebDriver-driven browser) are
//! interchangeable behind this trait and selected per category through
//! [`AdapterKind`].
//!
//! Adapters never cache and never retry: each call is one bounded fetch.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use nextrace_core::{AdapterKind, CategoryDescriptor};
use tracing::debug;

use crate::error::{SourceError, SourceResult};
use crate::normalize::select_upcoming;
use crate::raw::{DetailPage, RawExtraction};

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe so adapters can be stored as
/// `Arc<dyn SourceAdapter>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The soonest upcoming listing entry together with its resolved start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingEntry {
    pub raw: RawExtraction,
    pub starts_at: DateTime<Utc>,
}

/// The core abstraction for reading a category's pages.
///
/// # Implementation Notes
///
/// - Implementations must be `Send + Sync`; the aggregator shares them
///   across concurrent category chains
/// - A malformed listing entry is skipped, never fatal for the page
/// - Zero extracted entries is a normal outcome for `fetch_listing` and
///   returns `Ok(vec![])`; `fetch_upcoming` reports it as an extraction miss
pub trait SourceAdapter: Send + Sync {
    /// Returns the strategy name (e.g., "dom", "pattern", "browser").
    fn name(&self) -> &str;

    /// Fetches and extracts every entry of the category's listing page.
    fn fetch_listing<'a>(
        &'a self,
        category: &'a CategoryDescriptor,
    ) -> BoxFuture<'a, SourceResult<Vec<RawExtraction>>>;

    /// Fetches the category's current-event detail page, if it has one.
    ///
    /// The default implementation reports that no detail page exists.
    fn fetch_detail<'a>(
        &'a self,
        _category: &'a CategoryDescriptor,
    ) -> BoxFuture<'a, SourceResult<Option<DetailPage>>> {
        Box::pin(async { Ok(None) })
    }

    /// Fetches the listing and returns its soonest entry still ahead of `now`.
    ///
    /// A listing with no entries at all is an [`SourceErrorCode::ExtractionMiss`];
    /// a listing whose entries are all past is `Ok(None)`.
    ///
    /// [`SourceErrorCode::ExtractionMiss`]: crate::error::SourceErrorCode::ExtractionMiss
    fn fetch_upcoming<'a>(
        &'a self,
        category: &'a CategoryDescriptor,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, SourceResult<Option<UpcomingEntry>>> {
        Box::pin(async move {
            let entries = self.fetch_listing(category).await?;
            debug!(
                category = %category.id,
                adapter = self.name(),
                entries = entries.len(),
                "Extracted listing entries"
            );
            upcoming_entry(entries, now).map_err(|e| e.with_adapter(self.name()))
        })
    }
}

/// Picks the soonest upcoming entry of a fetched listing.
pub(crate) fn upcoming_entry(
    entries: Vec<RawExtraction>,
    now: DateTime<Utc>,
) -> SourceResult<Option<UpcomingEntry>> {
    if entries.is_empty() {
        return Err(SourceError::extraction_miss("listing has no entries"));
    }
    Ok(select_upcoming(entries, now).map(|(raw, starts_at)| UpcomingEntry { raw, starts_at }))
}

/// The adapters available to the aggregator, keyed by strategy.
#[derive(Clone, Default)]
pub struct AdapterSet {
    adapters: HashMap<AdapterKind, Arc<dyn SourceAdapter>>,
}

impl AdapterSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to register the adapter of a strategy.
    pub fn with_adapter(mut self, kind: AdapterKind, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.adapters.insert(kind, adapter);
        self
    }

    /// Returns the adapter registered for `kind`.
    pub fn get(&self, kind: AdapterKind) -> SourceResult<Arc<dyn SourceAdapter>> {
        self.adapters.get(&kind).cloned().ok_or_else(|| {
            SourceError::configuration(format!("No adapter registered for '{}'", kind))
        })
    }

    /// Returns the registered strategies.
    pub fn kinds(&self) -> impl Iterator<Item = AdapterKind> + '_ {
        self.adapters.keys().copied()
    }
}

impl fmt::Debug for AdapterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.adapters.values().map(|a| a.name().to_string()).collect();
        names.sort();
        f.debug_struct("AdapterSet").field("adapters", &names).finish()
    }
}

/// An adapter that always fails.
///
/// Useful for testing or as a stand-in when an adapter fails to initialize.
#[derive(Debug)]
pub struct ErrorAdapter {
    name: String,
    error: SourceError,
}

impl ErrorAdapter {
    /// Creates a new error adapter.
    pub fn new(name: impl Into<String>, error: SourceError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }

    fn error(&self) -> SourceError {
        SourceError::new(self.error.code(), self.error.message()).with_adapter(&self.name)
    }
}

impl SourceAdapter for ErrorAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_listing<'a>(
        &'a self,
        _category: &'a CategoryDescriptor,
    ) -> BoxFuture<'a, SourceResult<Vec<RawExtraction>>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }

    fn fetch_detail<'a>(
        &'a self,
        _category: &'a CategoryDescriptor,
    ) -> BoxFuture<'a, SourceResult<Option<DetailPage>>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }
}
