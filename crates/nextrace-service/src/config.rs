//! Service configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/nextrace/config.toml` by default. Every field has a default,
//! so an empty or missing file yields the built-in categories.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nextrace_core::{CalendarOptions, CategoryDescriptor, builtin_categories};
use nextrace_sources::{FetchConfig, WebDriverConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};

/// Configuration for the race service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Seconds a live race set is reused before recomputation.
    pub revalidate_secs: u64,

    /// Outbound HTTP settings.
    pub http: HttpSettings,

    /// Aggregation concurrency and bounds.
    pub aggregator: AggregatorSettings,

    /// Browser adapter settings.
    pub webdriver: WebDriverConfig,

    /// Calendar export settings.
    pub calendar: CalendarOptions,

    /// Tracked categories.
    pub categories: Vec<CategoryDescriptor>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            revalidate_secs: 60,
            http: HttpSettings::default(),
            aggregator: AggregatorSettings::default(),
            webdriver: WebDriverConfig::default(),
            calendar: CalendarOptions::default(),
            categories: builtin_categories(),
        }
    }
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// `User-Agent` header.
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        let fetch = FetchConfig::default();
        Self {
            timeout_secs: fetch.timeout.as_secs(),
            user_agent: fetch.user_agent,
        }
    }
}

impl HttpSettings {
    /// Converts to the fetcher configuration.
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::default()
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_user_agent(&self.user_agent)
    }
}

/// Aggregation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorSettings {
    /// Maximum categories fetched at once.
    pub max_in_flight: usize,

    /// Outer bound on one category's whole fetch chain, in seconds.
    pub category_timeout_secs: u64,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            max_in_flight: 4,
            category_timeout_secs: 25,
        }
    }
}

impl AggregatorSettings {
    /// Returns the per-category timeout.
    pub fn category_timeout(&self) -> Duration {
        Duration::from_secs(self.category_timeout_secs)
    }
}

impl ServiceConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> ServiceResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!(path = %path.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ServiceResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        debug!(
            path = %path.display(),
            categories = config.categories.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nextrace")
    }

    /// Returns the revalidation window length.
    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }

    /// Looks up a configured category.
    pub fn category(&self, id: &str) -> Option<&CategoryDescriptor> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Checks the configuration for values the service cannot run with.
    pub fn validate(&self) -> ServiceResult<()> {
        if self.categories.is_empty() {
            return Err(ServiceError::config("No categories configured"));
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.id.trim().is_empty() {
                return Err(ServiceError::config("Category with an empty id"));
            }
            if !seen.insert(category.id.as_str()) {
                return Err(ServiceError::config(format!(
                    "Duplicate category id '{}'",
                    category.id
                )));
            }
            if category.listing_url.trim().is_empty() {
                return Err(ServiceError::config(format!(
                    "Category '{}' has an empty listing URL",
                    category.id
                )));
            }
            if category
                .detail_url
                .as_deref()
                .is_some_and(|url| url.trim().is_empty())
            {
                return Err(ServiceError::config(format!(
                    "Category '{}' has an empty detail URL",
                    category.id
                )));
            }
        }

        if self.aggregator.max_in_flight == 0 {
            return Err(ServiceError::config("aggregator.max_in_flight must be at least 1"));
        }
        if self.aggregator.category_timeout_secs == 0 {
            return Err(ServiceError::config(
                "aggregator.category_timeout_secs must be positive",
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(ServiceError::config("http.timeout_secs must be positive"));
        }
        if self.webdriver.navigation_timeout.is_zero() {
            return Err(ServiceError::config(
                "webdriver.navigation_timeout_secs must be positive",
            ));
        }
        if self.webdriver.url.trim().is_empty() {
            return Err(ServiceError::config("webdriver.url is empty"));
        }
        Ok(())
    }

    /// Builder: replace the categories.
    pub fn with_categories(mut self, categories: Vec<CategoryDescriptor>) -> Self {
        self.categories = categories;
        self
    }

    /// Builder: set the revalidation window.
    pub fn with_revalidate_secs(mut self, secs: u64) -> Self {
        self.revalidate_secs = secs;
        self
    }

    /// Builder: set the max in-flight categories.
    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.aggregator.max_in_flight = max;
        self
    }

    /// Builder: set the per-category timeout.
    pub fn with_category_timeout_secs(mut self, secs: u64) -> Self {
        self.aggregator.category_timeout_secs = secs;
        self
    }

    /// Builder: set the calendar options.
    pub fn with_calendar(mut self, calendar: CalendarOptions) -> Self {
        self.calendar = calendar;
        self
    }

    /// Builder: set the WebDriver settings.
    pub fn with_webdriver(mut self, webdriver: WebDriverConfig) -> Self {
        self.webdriver = webdriver;
        self
    }
}
