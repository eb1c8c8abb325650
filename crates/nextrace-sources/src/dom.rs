//! DOM-structured listing walker.
//!
//! Selects the repeated "info card" elements of a season listing and reads
//! each card's child text and attributes.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use nextrace_core::CategoryDescriptor;

use crate::adapter::{BoxFuture, SourceAdapter};
use crate::detail::{DetailSelectors, fetch_detail};
use crate::error::SourceResult;
use crate::http::PageFetcher;
use crate::markup::{absolutize, compile, first_text};
use crate::raw::{DetailPage, RawExtraction};

/// Compiled selectors for the listing cards.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    card: Selector,
    day: Selector,
    month: Selector,
    time: Selector,
    circuit: Selector,
    location: Selector,
    image: Selector,
    live: Selector,
}

impl ListingSelectors {
    /// Compiles the selectors of the current listing layout.
    pub fn new() -> SourceResult<Self> {
        Ok(Self {
            card: compile(".info-card")?,
            day: compile(".fecha .dia")?,
            month: compile(".fecha .mes")?,
            time: compile(".fecha .hora")?,
            circuit: compile(".autodromo")?,
            location: compile(".localidad")?,
            image: compile("img")?,
            live: compile(".en-vivo a")?,
        })
    }
}

/// Parses every card of a listing page.
///
/// Cards missing a day, month or circuit are skipped.
pub fn parse_listing(html: &str, page_url: &str, selectors: &ListingSelectors) -> Vec<RawExtraction> {
    let document = Html::parse_document(html);
    let entries: Vec<_> = document
        .select(&selectors.card)
        .enumerate()
        .filter_map(|(index, card)| {
            let entry = parse_card(card, page_url, selectors);
            if entry.is_none() {
                trace!(index, "Skipping incomplete listing card");
            }
            entry
        })
        .collect();

    debug!(url = %page_url, entries = entries.len(), "Parsed listing");
    entries
}

fn parse_card(
    card: ElementRef<'_>,
    page_url: &str,
    selectors: &ListingSelectors,
) -> Option<RawExtraction> {
    let day = first_text(card, &selectors.day)?;
    let month = first_text(card, &selectors.month)?;
    let circuit = first_text(card, &selectors.circuit)?;

    let mut raw = RawExtraction::new(day, month, circuit);
    raw.time = first_text(card, &selectors.time);
    raw.location = first_text(card, &selectors.location).unwrap_or_default();
    raw.image = card
        .select(&selectors.image)
        .next()
        .and_then(|img| img.value().attr("src").or_else(|| img.value().attr("data-src")))
        .map(|src| absolutize(page_url, src))
        .unwrap_or_default();
    raw.live_url = card
        .select(&selectors.live)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| absolutize(page_url, href));
    Some(raw)
}

/// Reads listings by walking the parsed DOM.
#[derive(Debug, Clone)]
pub struct DomAdapter {
    fetcher: PageFetcher,
    listing: ListingSelectors,
    detail: DetailSelectors,
}

impl DomAdapter {
    /// Creates the adapter, compiling its selectors.
    pub fn new(fetcher: PageFetcher) -> SourceResult<Self> {
        Ok(Self {
            fetcher,
            listing: ListingSelectors::new()?,
            detail: DetailSelectors::new()?,
        })
    }
}

impl SourceAdapter for DomAdapter {
    fn name(&self) -> &str {
        "dom"
    }

    fn fetch_listing<'a>(
        &'a self,
        category: &'a CategoryDescriptor,
    ) -> BoxFuture<'a, SourceResult<Vec<RawExtraction>>> {
        Box::pin(async move {
            let html = self
                .fetcher
                .get(&category.listing_url)
                .await
                .map_err(|e| e.with_adapter(self.name()))?;
            Ok(parse_listing(&html, &category.listing_url, &self.listing))
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
}
