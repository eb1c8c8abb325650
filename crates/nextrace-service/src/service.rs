//! The inbound API: race data and calendar exports.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use nextrace_core::{CalendarDocument, CategoryDescriptor, RaceSet, race_document, races_document};
use nextrace_sources::{AdapterSet, PageFetcher, standard_adapters};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::aggregator::Aggregator;
use crate::cache::RevalidationWindow;
use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::fallback;

/// Serves the current race set and its calendar exports.
///
/// Cloning is cheap; clones share the revalidation window.
#[derive(Debug, Clone)]
pub struct RaceService {
    config: Arc<ServiceConfig>,
    aggregator: Arc<Aggregator>,
    window: Arc<Mutex<RevalidationWindow>>,
}

impl RaceService {
    /// Creates a service with the standard adapters.
    pub fn new(config: ServiceConfig) -> ServiceResult<Self> {
        config.validate()?;
        let fetcher = PageFetcher::new(config.http.fetch_config())?;
        let adapters = standard_adapters(fetcher, config.webdriver.clone())?;
        Self::with_adapters(config, adapters)
    }

    /// Creates a service with a caller-provided adapter set.
    pub fn with_adapters(config: ServiceConfig, adapters: AdapterSet) -> ServiceResult<Self> {
        config.validate()?;
        debug!(adapters = ?adapters, categories = config.categories.len(), "Creating race service");
        let aggregator = Aggregator::new(config.categories.clone(), adapters, &config.aggregator);
        let window = RevalidationWindow::new(config.revalidate());
        Ok(Self {
            config: Arc::new(config),
            aggregator: Arc::new(aggregator),
            window: Arc::new(Mutex::new(window)),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Returns the configured categories.
    pub fn categories(&self) -> &[CategoryDescriptor] {
        &self.config.categories
    }

    /// Returns the next race of every category.
    ///
    /// Never fails: a total source outage yields placeholder data.
    pub async fn get_race_data(&self) -> RaceSet {
        self.race_data_at(Utc::now()).await
    }

    /// Returns the race set as of `now`.
    pub async fn race_data_at(&self, now: DateTime<Utc>) -> RaceSet {
        // Held across aggregation so concurrent callers share one run.
        let mut window = self.window.lock().await;
        if let Some(set) = window.get_valid() {
            debug!(races = set.len(), "Serving race set from revalidation window");
            return set.clone();
        }

        info!(categories = self.config.categories.len(), "Aggregating race data");
        let live = self.aggregator.collect(now).await;
        let set = fallback::settle(live, &self.config.categories, now);
        window.store(&set);
        set
    }

    /// Drops the cached race set so the next call fetches again.
    pub async fn invalidate(&self) {
        self.window.lock().await.clear();
    }

    /// Returns the calendar export of one category, or of the whole set.
    pub async fn get_calendar_document(&self, category: Option<&str>) -> ServiceResult<CalendarDocument> {
        self.calendar_document_at(category, Utc::now()).await
    }

    /// Returns the calendar export as of `now`.
    ///
    /// A category that is not configured, or has no race in the current
    /// set, is reported as [`ServiceError::UnknownCategory`].
    pub async fn calendar_document_at(
        &self,
        category: Option<&str>,
        now: DateTime<Utc>,
    ) -> ServiceResult<CalendarDocument> {
        if let Some(id) = category.filter(|id| self.config.category(id).is_none()) {
            return Err(ServiceError::unknown_category(id));
        }

        let set = self.race_data_at(now).await;
        let document = match category {
            Some(id) => {
                let race = set.get(id).ok_or_else(|| ServiceError::unknown_category(id))?;
                race_document(race, &self.config.calendar, now)
            }
            None => races_document(set.iter(), &self.config.calendar, now),
        };
        debug!(filename = %document.filename, bytes = document.body.len(), "Built calendar export");
        Ok(document)
    }
}
