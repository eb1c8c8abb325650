use chrono::{DateTime, Datelike, Utc};
use tracing::{debug, info, warn};

use nextrace_core::CategoryDescriptor;
use nextrace_core::time::local_date;

use super::webdriver::{Session, WebDriverClient};
use super::{WebDriverConfig, year_option_selector};
use crate::adapter::{BoxFuture, SourceAdapter, UpcomingEntry, upcoming_entry};
use crate::detail::{DetailSelectors, fetch_detail};
use crate::dom::{ListingSelectors, parse_listing};
use crate::error::{SourceError, SourceResult};
use crate::http::PageFetcher;
use crate::raw::{DetailPage, RawExtraction};

/// Listing card rendered once the season is loaded.
const LISTING_CARD: &str = ".info-card";

/// Reads script-rendered listings through a WebDriver session.
#[derive(Debug, Clone)]
pub struct BrowserAdapter {
    driver: WebDriverClient,
    config: WebDriverConfig,
    fetcher: PageFetcher,
    listing: ListingSelectors,
    detail: DetailSelectors,
}

impl BrowserAdapter {
    /// Creates the adapter. Detail pages are static and go through `fetcher`.
    pub fn new(fetcher: PageFetcher, config: WebDriverConfig) -> SourceResult<Self> {
        if config.navigation_timeout.is_zero() {
            return Err(SourceError::configuration(
                "WebDriver navigation timeout must be positive",
            ));
        }
        Ok(Self {
            driver: WebDriverClient::new(fetcher.client().clone(), config.url.clone()),
            config,
            fetcher,
            listing: ListingSelectors::new()?,
            detail: DetailSelectors::new()?,
        })
    }

    /// Returns the WebDriver settings.
    pub fn config(&self) -> &WebDriverConfig {
        &self.config
    }

    /// Renders the listing of `year` and parses its cards.
    pub async fn fetch_season(
        &self,
        category: &CategoryDescriptor,
        year: i32,
    ) -> SourceResult<Vec<RawExtraction>> {
        let session = self
            .driver
            .new_session()
            .await
            .map_err(|e| e.with_adapter(self.name()))?;

        let result = self.render_season(&session, &category.listing_url, year).await;
        session.close().await;

        let html = result.map_err(|e| e.with_adapter(self.name()))?;
        Ok(parse_listing(&html, &category.listing_url, &self.listing))
    }

    async fn render_season(&self, session: &Session, url: &str, year: i32) -> SourceResult<String> {
        session.navigate(url).await?;

        let selector = year_option_selector(year);
        match session.find(&selector).await? {
            Some(option) if session.is_selected(&option).await? => {
                debug!(year, "Season already selected");
            }
            Some(option) => {
                let before = session.current_url().await?;
                session.click(&option).await?;
                self.wait_for_season(session, &option, &before).await?;
                debug!(year, "Selected season");
            }
            None => {
                warn!(url = %url, year, "Year selector not found, reading page as loaded");
            }
        }

        session.page_source().await
    }

    /// Polls until the page navigated away or the selected season rendered.
    async fn wait_for_season(&self, session: &Session, option: &str, before: &str) -> SourceResult<()> {
        let settle = async {
            loop {
                tokio::time::sleep(self.config.poll_interval).await;
                match settled(session, option, before).await {
                    Ok(true) => return Ok(()),
                    Ok(false) => continue,
                    Err(e) => return Err(e),
                }
            }
        };

        tokio::time::timeout(self.config.navigation_timeout, settle)
            .await
            .map_err(|_| {
                SourceError::timeout(format!(
                    "Page did not settle within {:?} after selecting the season",
                    self.config.navigation_timeout
                ))
            })?
    }
}

async fn settled(session: &Session, option: &str, before: &str) -> SourceResult<bool> {
    if session.current_url().await? != before {
        return Ok(true);
    }
    Ok(session.is_selected(option).await? && session.find(LISTING_CARD).await?.is_some())
}

impl SourceAdapter for BrowserAdapter {
    fn name(&self) -> &str {
        "browser"
    }

    fn fetch_listing<'a>(
        &'a self,
        category: &'a CategoryDescriptor,
    ) -> BoxFuture<'a, SourceResult<Vec<RawExtraction>>> {
        Box::pin(async move {
            let year = local_date(Utc::now()).year();
            self.fetch_season(category, year).await
        })
    }

    fn fetch_detail<'a>(
        &'a self,
        category: &'a CategoryDescriptor,
    ) -> BoxFuture<'a, SourceResult<Option<DetailPage>>> {
        Box::pin(async move {
            fetch_detail(&self.fetcher, &self.detail, category)
                .await
                .map_err(|e| e.with_adapter(self.name()))
        })
    }

    fn fetch_upcoming<'a>(
        &'a self,
        category: &'a CategoryDescriptor,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, SourceResult<Option<UpcomingEntry>>> {
        Box::pin(async move {
            let year = local_date(now).year();
            let entries = self.fetch_season(category, year).await?;
            info!(
                category = %category.id,
                year,
                entries = entries.len(),
                "Rendered season listing"
            );
            upcoming_entry(entries, now).map_err(|e| e.with_adapter(self.name()))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::SourceErrorCode;
    use crate::http::FetchConfig;
    use nextrace_core::AdapterKind;

    fn fetcher() -> PageFetcher {
        PageFetcher::new(FetchConfig::default()).unwrap()
    }

    #[test]
    fn zero_navigation_timeout_is_rejected() {
        let config = WebDriverConfig::default().with_navigation_timeout(Duration::ZERO);
        let err = BrowserAdapter::new(fetcher(), config).unwrap_err();
        assert_eq!(err.code(), SourceErrorCode::Configuration);
    }

    #[tokio::test]
    async fn unreachable_driver_is_recoverable() {
        let config = WebDriverConfig::default()
            .with_url("http://127.0.0.1:9")
            .with_navigation_timeout(Duration::from_secs(1));
        let adapter = BrowserAdapter::new(fetcher(), config).unwrap();
        let category = CategoryDescriptor::new(
            "tc",
            "Turismo Carretera",
            "TC",
            "https://actc.org.ar/tc/calendario.html",
            AdapterKind::Browser,
        );

        let err = adapter.fetch_listing(&category).await.unwrap_err();
        assert_eq!(err.code(), SourceErrorCode::Browser);
        assert_eq!(err.adapter(), Some("browser"));
        assert!(err.is_recoverable());
    }

    mod season {
        use std::time::Instant;

        use super::*;
        use crate::browser::fake_driver::{FakeDriver, PageBehavior, SESSION};

        const NAVIGATION_TIMEOUT: Duration = Duration::from_millis(300);

        fn category() -> CategoryDescriptor {
            CategoryDescriptor::new(
                "tc",
                "Turismo Carretera",
                "TC",
                "https://actc.org.ar/tc/calendario.html",
                AdapterKind::Browser,
            )
        }

        fn adapter(driver: &FakeDriver) -> BrowserAdapter {
            let config = WebDriverConfig::default()
                .with_url(driver.url())
                .with_navigation_timeout(NAVIGATION_TIMEOUT)
                .with_poll_interval(Duration::from_millis(20));
            BrowserAdapter::new(fetcher(), config).unwrap()
        }

        fn click() -> String {
            format!("POST /session/{}/element/opt/click", SESSION)
        }

        fn delete() -> String {
            format!("DELETE /session/{}", SESSION)
        }

        #[tokio::test]
        async fn selected_season_is_read_without_click() {
            let driver = FakeDriver::start(PageBehavior {
                preselected: true,
                ..PageBehavior::default()
            })
            .await;

            let entries = adapter(&driver).fetch_season(&category(), 2025).await.unwrap();
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].circuit, "Autódromo Ciudad de Rafaela");
            assert!(!driver.received(&click()));
            assert!(driver.received(&delete()));
        }

        #[tokio::test]
        async fn click_waits_for_season_to_render() {
            let driver = FakeDriver::start(PageBehavior::default()).await;

            let entries = adapter(&driver).fetch_season(&category(), 2025).await.unwrap();
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].time.as_deref(), Some("13:30"));

            let requests = driver.requests();
            let clicked = requests.iter().position(|r| *r == click()).unwrap();
            let source = requests
                .iter()
                .position(|r| *r == format!("GET /session/{}/source", SESSION))
                .unwrap();
            assert!(clicked < source);
            assert!(driver.received(&delete()));
        }

        #[tokio::test]
        async fn unsettled_page_times_out_within_navigation_bound() {
            let driver = FakeDriver::start(PageBehavior {
                settles: false,
                ..PageBehavior::default()
            })
            .await;

            let started = Instant::now();
            let err = adapter(&driver).fetch_season(&category(), 2025).await.unwrap_err();
            let elapsed = started.elapsed();

            assert_eq!(err.code(), SourceErrorCode::Timeout);
            assert_eq!(err.adapter(), Some("browser"));
            assert!(elapsed >= NAVIGATION_TIMEOUT);
            assert!(elapsed < Duration::from_secs(3));
            assert!(driver.received(&delete()));
        }

        #[tokio::test]
        async fn missing_year_selector_reads_page_as_loaded() {
            let driver = FakeDriver::start(PageBehavior {
                has_option: false,
                ..PageBehavior::default()
            })
            .await;

            let entries = adapter(&driver).fetch_season(&category(), 2025).await.unwrap();
            assert_eq!(entries.len(), 1);
            assert!(!driver.received(&click()));
        }

        #[tokio::test]
        async fn cancelled_render_still_closes_session() {
            let driver = FakeDriver::start(PageBehavior {
                preselected: true,
                hang_source: true,
                ..PageBehavior::default()
            })
            .await;
            let adapter = adapter(&driver);

            let cancelled = tokio::time::timeout(
                Duration::from_millis(200),
                adapter.fetch_season(&category(), 2025),
            )
            .await;
            assert!(cancelled.is_err());

            let deadline = Instant::now() + Duration::from_secs(3);
            while !driver.received(&delete()) && Instant::now() < deadline {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            assert!(driver.received(&delete()));
        }
    }
}
