//! Source adapters and date normalization.
//!
//! This crate reads racing calendars from the series' web pages:
//!
//! - [`SourceAdapter`] - The trait every extraction strategy implements
//! - [`RawExtraction`] / [`DetailPage`] - Site-agnostic extracted fields
//! - [`normalize`] - Turns partial dates into absolute instants
//! - [`SourceError`] - Error types for adapter operations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//! │  DomAdapter  │  │PatternAdapter│  │BrowserAdapter│
//! └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!        │                 │                 │
//!        └────────┬────────┴─────────────────┘
//!                 │  SourceAdapter
//!                 ▼
//!          ┌──────────────┐
//!          │RawExtraction │
//!          └──────┬───────┘
//!                 │
//!                 ▼ normalize::resolve()
//!          ┌──────────────┐
//!          │ DateTime<Utc>│
//!          └──────────────┘
//! ```

pub mod adapter;
pub mod browser;
pub mod detail;
pub mod dom;
pub mod error;
pub mod http;
pub mod markup;
pub mod normalize;
pub mod pattern;
pub mod raw;

use std::sync::Arc;

use nextrace_core::AdapterKind;

// Re-export main types at crate root
pub use adapter::{AdapterSet, BoxFuture, ErrorAdapter, SourceAdapter, UpcomingEntry};
#[cfg(feature = "browser")]
pub use browser::BrowserAdapter;
pub use browser::WebDriverConfig;
pub use detail::{DetailSelectors, parse_detail};
pub use dom::{DomAdapter, ListingSelectors, parse_listing};
pub use error::{SourceError, SourceErrorCode, SourceResult};
pub use http::{FetchConfig, PageFetcher};
pub use pattern::{FragmentPatterns, PatternAdapter, extract_listing};
pub use raw::{CountdownParts, DetailPage, RawExtraction, RawSession};

/// Builds the adapter set with every compiled-in strategy.
///
/// Without the `browser` feature, browser categories get an adapter that
/// reports a configuration error.
pub fn standard_adapters(fetcher: PageFetcher, webdriver: WebDriverConfig) -> SourceResult<AdapterSet> {
    let set = AdapterSet::new()
        .with_adapter(AdapterKind::Dom, Arc::new(DomAdapter::new(fetcher.clone())?))
        .with_adapter(AdapterKind::Pattern, Arc::new(PatternAdapter::new(fetcher.clone())?));
    Ok(set.with_adapter(AdapterKind::Browser, browser_adapter(fetcher, webdriver)?))
}

#[cfg(feature = "browser")]
fn browser_adapter(fetcher: PageFetcher, webdriver: WebDriverConfig) -> SourceResult<Arc<dyn SourceAdapter>> {
    Ok(Arc::new(BrowserAdapter::new(fetcher, webdriver)?))
}

#[cfg(not(feature = "browser"))]
fn browser_adapter(_fetcher: PageFetcher, _webdriver: WebDriverConfig) -> SourceResult<Arc<dyn SourceAdapter>> {
    Ok(Arc::new(ErrorAdapter::new(
        "browser",
        SourceError::configuration("Built without the 'browser' feature"),
    )))
}
