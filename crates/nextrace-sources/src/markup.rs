//! Small helpers shared by the HTML readers.

use scraper::{ElementRef, Selector};
use url::Url;

use crate::error::{SourceError, SourceResult};

/// Compiles a CSS selector, reporting invalid input as a configuration error.
pub fn compile(css: &str) -> SourceResult<Selector> {
    Selector::parse(css)
        .map_err(|e| SourceError::configuration(format!("Invalid selector '{}': {:?}", css, e)))
}

/// Returns the whitespace-collapsed text of an element.
pub fn text_of(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Returns the collapsed text of the first match under `scope`, if any and non-empty.
pub fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(text_of)
        .filter(|text| !text.is_empty())
}

/// Joins runs of whitespace (including newlines and `&nbsp;`) into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves a possibly relative link against the page it was found on.
///
/// Unresolvable input is returned unchanged.
pub fn absolutize(base: &str, href: &str) -> String {
    let href = href.trim();
    Url::parse(base)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn invalid_selector_is_configuration_error() {
        let err = compile("div[").unwrap_err();
        assert!(!err.is_recoverable());
        assert!(err.message().contains("div["));
    }

    #[test]
    fn text_is_collapsed() {
        let html = Html::parse_fragment("<p>  Autódromo\n   Oscar&nbsp;Cabalén </p>");
        let p = compile("p").unwrap();
        let element = html.select(&p).next().unwrap();
        assert_eq!(text_of(element), "Autódromo Oscar Cabalén");
    }

    #[test]
    fn links_resolve_against_page() {
        assert_eq!(
            absolutize("https://actc.org.ar/tc/index.html", "/tc/envivo/42"),
            "https://actc.org.ar/tc/envivo/42"
        );
        assert_eq!(
            absolutize("https://actc.org.ar/tc/index.html", "img/rafaela.jpg"),
            "https://actc.org.ar/tc/img/rafaela.jpg"
        );
        assert_eq!(
            absolutize("https://actc.org.ar/tc/index.html", "https://cdn.example/a.jpg"),
            "https://cdn.example/a.jpg"
        );
        assert_eq!(absolutize("not a url", "/x"), "/x");
    }
}
