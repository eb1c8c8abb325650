//! Static per-category configuration.
//!
//! A [`CategoryDescriptor`] names one tracked racing series, where its pages
//! live, and which adapter strategy reads them. Descriptors are read once at
//! startup and never mutated.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The adapter strategy used to read a category's listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    /// Walks repeated listing cards in the parsed DOM.
    Dom,
    /// Matches repeated HTML fragments with regular expressions.
    #[serde(alias = "regex")]
    Pattern,
    /// Drives a WebDriver browser to select the season before extracting.
    Browser,
}

impl AdapterKind {
    /// Returns the configuration tag for this strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dom => "dom",
            Self::Pattern => "pattern",
            Self::Browser => "browser",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for one tracked racing category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDescriptor {
    /// Stable identifier (`"tc"`, `"tc2000"`), also used in calendar UIDs.
    pub id: String,
    /// Full display name.
    pub name: String,
    /// Short display name used in calendar summaries.
    pub short_name: String,
    /// Icon path or URL for the display layer.
    #[serde(default)]
    pub icon: String,
    /// The season listing page.
    pub listing_url: String,
    /// The current-event detail page, when the site family publishes one.
    #[serde(default)]
    pub detail_url: Option<String>,
    /// Which adapter strategy reads the listing.
    pub adapter: AdapterKind,
    /// Whether events span the whole weekend and export as all-day ranges.
    #[serde(default)]
    pub weekend_spanning: bool,
}

impl CategoryDescriptor {
    /// Creates a descriptor with the required fields.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        short_name: impl Into<String>,
        listing_url: impl Into<String>,
        adapter: AdapterKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            short_name: short_name.into(),
            icon: String::new(),
            listing_url: listing_url.into(),
            detail_url: None,
            adapter,
            weekend_spanning: false,
        }
    }

    /// Builder method to set the detail page.
    pub fn with_detail_url(mut self, url: impl Into<String>) -> Self {
        self.detail_url = Some(url.into());
        self
    }

    /// Builder method to set the icon.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Builder method to flag the category as weekend-spanning.
    pub fn with_weekend_spanning(mut self, weekend_spanning: bool) -> Self {
        self.weekend_spanning = weekend_spanning;
        self
    }
}

fn actc(id: &str, name: &str, short_name: &str) -> CategoryDescriptor {
    CategoryDescriptor::new(
        id,
        name,
        short_name,
        format!("https://actc.org.ar/{id}/calendario.html"),
        AdapterKind::Dom,
    )
    .with_detail_url(format!("https://actc.org.ar/{id}/index.html"))
    .with_icon(format!("/{id}.png"))
}

/// Returns the categories tracked out of the box.
pub fn builtin_categories() -> Vec<CategoryDescriptor> {
    vec![
        actc("tc", "Turismo Carretera", "TC"),
        actc("tcp", "TC Pista", "TCP"),
        actc("tcm", "TC Mouras", "TCM"),
        actc("tcpm", "TC Pista Mouras", "TCPM"),
        actc("tcpk", "TC Pick Up", "TCPK"),
        actc("tcppk", "TC Pista Pick Up", "TCPPK"),
        CategoryDescriptor::new(
            "tc2000",
            "TC2000",
            "TC2000",
            "https://www.tc2000.com.ar/calendario",
            AdapterKind::Pattern,
        )
        .with_icon("/tc2000.png")
        .with_weekend_spanning(true),
    ]
}
