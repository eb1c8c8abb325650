//! Browser-driven listing reader.
//!
//! Some listings are only populated by client-side script after the season
//! is picked in a year selector. The browser adapter drives a real browser
//! through a WebDriver endpoint, selects the current year, waits for the
//! page to settle and then hands the rendered source to the DOM walker.
//!
//! [`WebDriverConfig`] is always available so configuration files stay
//! valid when the crate is built without the `browser` feature.

#[cfg(feature = "browser")]
mod adapter;
#[cfg(feature = "browser")]
mod webdriver;

#[cfg(all(test, feature = "browser"))]
mod fake_driver;

#[cfg(feature = "browser")]
pub use adapter::BrowserAdapter;
#[cfg(feature = "browser")]
pub use webdriver::{Session, WebDriverClient};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default WebDriver endpoint.
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Year options of the season selector.
const YEAR_OPTION: &str = "select#anio option";

/// WebDriver connection and wait settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebDriverConfig {
    /// Driver endpoint (chromedriver, geckodriver, selenium).
    pub url: String,
    /// Upper bound for the page to settle after selecting the year.
    #[serde(rename = "navigation_timeout_secs", with = "secs")]
    pub navigation_timeout: Duration,
    /// Delay between settle checks.
    #[serde(rename = "poll_interval_ms", with = "millis")]
    pub poll_interval: Duration,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WEBDRIVER_URL.to_string(),
            navigation_timeout: Duration::from_secs(8),
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl WebDriverConfig {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// CSS selector of the year option to pick.
pub fn year_option_selector(year: i32) -> String {
    format!("{}[value=\"{}\"]", YEAR_OPTION, year)
}
