//! Raw-text regex extractor.
//!
//! For pages read as plain text, listing entries are found by matching the
//! repeated `race-item` fragment and then each field's class inside it.

use std::sync::LazyLock;

use html_escape::decode_html_entities;
use regex::Regex;
use tracing::{debug, trace};

use nextrace_core::CategoryDescriptor;

use crate::adapter::{BoxFuture, SourceAdapter};
use crate::detail::{DetailSelectors, fetch_detail};
use crate::error::{SourceError, SourceResult};
use crate::http::PageFetcher;
use crate::markup::{absolutize, collapse_whitespace};
use crate::raw::{DetailPage, RawExtraction};

static RACE_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<article[^>]*class="[^"]*\brace-item\b[^"]*"[^>]*>(.*?)</article>"#)
        .expect("Invalid race item regex")
});

static IMAGE_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<img[^>]*?\s(?:data-src|src)="([^"]+)""#).expect("Invalid image regex")
});

static LIVE_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a[^>]*class="[^"]*\brace-live\b[^"]*"[^>]*href="([^"]+)""#)
        .expect("Invalid live link regex")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("Invalid tag regex"));

/// Field patterns of one `race-item` fragment.
#[derive(Debug, Clone)]
pub struct FragmentPatterns {
    day: Regex,
    month: Regex,
    time: Regex,
    circuit: Regex,
    location: Regex,
}

impl FragmentPatterns {
    /// Builds the patterns of the current listing layout.
    pub fn new() -> SourceResult<Self> {
        Ok(Self {
            day: class_field("race-day")?,
            month: class_field("race-month")?,
            time: class_field("race-time")?,
            circuit: class_field("race-track")?,
            location: class_field("race-city")?,
        })
    }
}

/// Matches the opening tag of the element carrying `class`; the tag name
/// is captured so the body can run to the element's own closing tag.
fn class_field(class: &str) -> SourceResult<Regex> {
    let pattern = format!(
        r#"(?is)<([a-z][a-z0-9]*)\b[^>]*class="[^"]*\b{}\b[^"]*"[^>]*>"#,
        regex::escape(class)
    );
    Regex::new(&pattern).map_err(|e| {
        SourceError::configuration(format!("Invalid field pattern '{}'", class))
            .with_source(e)
    })
}

fn capture_text(pattern: &Regex, fragment: &str) -> Option<String> {
    let caps = pattern.captures(fragment)?;
    let open = caps.get(0)?;
    let tag = caps.get(1)?.as_str().to_ascii_lowercase();
    let body = element_body(&fragment[open.end()..], &tag)?;
    let text = collapse_whitespace(&decode_entities(&TAG.replace_all(body, " ")));
    (!text.is_empty()).then_some(text)
}

/// Returns the markup before the closing tag matching an already-open `tag`.
///
/// Nested elements of the same name are balanced. `None` if it never closes.
fn element_body<'a>(rest: &'a str, tag: &str) -> Option<&'a str> {
    let lower = rest.to_ascii_lowercase();
    let open = format!("<{tag}");
    let close = format!("</{tag}");
    let mut depth = 0usize;
    let mut pos = 0;

    while let Some(idx) = lower[pos..].find('<') {
        let at = pos + idx;
        let tail = &lower[at..];
        if tail.starts_with(&close) {
            if depth == 0 {
                return Some(&rest[..at]);
            }
            depth -= 1;
        } else if tail.starts_with(&open)
            && tail[open.len()..].starts_with(|c: char| c == '>' || c.is_whitespace())
        {
            depth += 1;
        }
        pos = at + 1;
    }
    None
}

/// Decodes HTML entities in listing text.
pub fn decode_entities(text: &str) -> String {
    decode_html_entities(text).into_owned()
}

/// Extracts every `race-item` fragment of a listing page.
///
/// Fragments missing a day, month or circuit are skipped.
pub fn extract_listing(html: &str, page_url: &str, patterns: &FragmentPatterns) -> Vec<RawExtraction> {
    let entries: Vec<_> = RACE_ITEM
        .captures_iter(html)
        .filter_map(|caps| {
            let fragment = caps.get(1)?.as_str();
            let entry = extract_fragment(fragment, page_url, patterns);
            if entry.is_none() {
                trace!(bytes = fragment.len(), "Skipping incomplete race item");
            }
            entry
        })
        .collect();

    debug!(url = %page_url, entries = entries.len(), "Matched listing fragments");
    entries
}

fn extract_fragment(fragment: &str, page_url: &str, patterns: &FragmentPatterns) -> Option<RawExtraction> {
    let day = capture_text(&patterns.day, fragment)?;
    let month = capture_text(&patterns.month, fragment)?;
    let circuit = capture_text(&patterns.circuit, fragment)?;

    let mut raw = RawExtraction::new(day, month, circuit);
    raw.time = capture_text(&patterns.time, fragment);
    raw.location = capture_text(&patterns.location, fragment).unwrap_or_default();
    raw.image = IMAGE_SRC
        .captures(fragment)
        .and_then(|caps| caps.get(1))
        .map(|m| absolutize(page_url, &decode_entities(m.as_str())))
        .unwrap_or_default();
    raw.live_url = LIVE_HREF
        .captures(fragment)
        .and_then(|caps| caps.get(1))
        .map(|m| absolutize(page_url, &decode_entities(m.as_str())));
    Some(raw)
}

/// Reads listings by matching HTML fragments.
#[derive(Debug, Clone)]
pub struct PatternAdapter {
    fetcher: PageFetcher,
    patterns: FragmentPatterns,
    detail: DetailSelectors,
}

impl PatternAdapter {
    /// Creates the adapter, building its patterns.
    pub fn new(fetcher: PageFetcher) -> SourceResult<Self> {
        Ok(Self {
            fetcher,
            patterns: FragmentPatterns::new()?,
            detail: DetailSelectors::new()?,
        })
    }
}

impl SourceAdapter for PatternAdapter {
    fn name(&self) -> &str {
        "pattern"
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
            Ok(extract_listing(&html, &category.listing_url, &self.patterns))
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

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_URL: &str = "https://www.tc2000.com.ar/calendario";

    const LISTING_HTML: &str = r#"
<main>
  <article class="race-item past">
    <span class="race-day">13</span> <span class="race-month">Jul</span>
    <h3 class="race-track">Aut&oacute;dromo Oscar y Juan G&aacute;lvez</h3>
    <p class="race-city">Buenos Aires</p>
    <img class="thumb" src="/uploads/galvez.jpg" alt="">
  </article>
  <article class="race-item">
    <span class="race-day">08</span> <span class="race-month">AGO</span>
    <h3 class="race-track"><strong>Termas de R&#237;o Hondo</strong></h3>
    <p class="race-city">Santiago del Estero</p>
    <img class="thumb" src="https://cdn.tc2000.com.ar/termas.jpg" alt="">
    <a class="race-live" href="/en-vivo">EN VIVO</a>
  </article>
  <article class="race-item">
    <span class="race-month">SEP</span>
    <h3 class="race-track">A confirmar</h3>
  </article>
</main>
"#;

    fn extract(html: &str) -> Vec<RawExtraction> {
        extract_listing(html, LISTING_URL, &FragmentPatterns::new().unwrap())
    }

    #[test]
    fn extracts_complete_fragments() {
        let entries = extract(LISTING_HTML);
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].day, "13");
        assert_eq!(entries[0].month_token, "Jul");
        assert_eq!(entries[0].circuit, "Autódromo Oscar y Juan Gálvez");
        assert_eq!(entries[0].image, "https://www.tc2000.com.ar/uploads/galvez.jpg");
        assert!(entries[0].live_url.is_none());
    }

    #[test]
    fn nested_tags_and_numeric_entities() {
        let entries = extract(LISTING_HTML);
        assert_eq!(entries[1].circuit, "Termas de Río Hondo");
        assert_eq!(entries[1].location, "Santiago del Estero");
        assert_eq!(entries[1].image, "https://cdn.tc2000.com.ar/termas.jpg");
        assert_eq!(
            entries[1].live_url.as_deref(),
            Some("https://www.tc2000.com.ar/en-vivo")
        );
    }

    #[test]
    fn unmatched_page_is_empty() {
        assert!(extract("<div class=\"calendar-v2\"></div>").is_empty());
    }

    #[test]
    fn entity_decoding() {
        assert_eq!(decode_entities("R&iacute;o &amp; Sierra"), "Río & Sierra");
        assert_eq!(decode_entities("&#x00E1;&#233;"), "áé");
        assert_eq!(
            decode_entities("Aut&oacute;dromo N&ordm; 1 &ndash; Paran&aacute; &rsquo;25 &deg;"),
            "Autódromo Nº 1 – Paraná ’25 °"
        );
    }

    #[test]
    fn field_spans_sibling_inline_elements() {
        let html = r#"
<article class="race-item">
  <span class="race-day">08</span><span class="race-month">AGO</span>
  <h3 class="race-track"><span>Termas</span> <span>de R&iacute;o Hondo</span></h3>
  <p class="race-city">Santiago <em>del</em> Estero</p>
</article>
"#;
        let entries = extract(html);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].circuit, "Termas de Río Hondo");
        assert_eq!(entries[0].location, "Santiago del Estero");
    }

    #[test]
    fn nested_same_name_elements_are_balanced() {
        assert_eq!(
            element_body("<div>a</div> b</div><div>c</div>", "div"),
            Some("<div>a</div> b")
        );
        assert_eq!(element_body("<b>never closed", "span"), None);
    }

    #[test]
    fn unclosed_field_skips_fragment() {
        let html = r#"<article class="race-item"><span class="race-day">08<span class="race-month">AGO</span><h3 class="race-track">Rafaela</h3></article>"#;
        assert!(extract(html).is_empty());
    }
}
