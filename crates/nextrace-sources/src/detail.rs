//! Current-event detail page reader.
//!
//! The detail page of a category carries the richest timing data: a header
//! date, the per-day session blocks, an optional live-broadcast anchor and,
//! sometimes, the authoritative countdown the page's own script runs.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use crate::error::SourceResult;
use crate::http::PageFetcher;
use crate::markup::{absolutize, compile, first_text, text_of};
use crate::raw::{CountdownParts, DetailPage, RawSession};
use nextrace_core::CategoryDescriptor;

/// The generic live page linked when nothing is being broadcast.
const GENERIC_LIVE_PATH: &str = "/envivo";

/// Compiled selectors for the detail page.
#[derive(Debug, Clone)]
pub struct DetailSelectors {
    race_name: Selector,
    circuit: Selector,
    location: Selector,
    header_date: Selector,
    live_anchor: Selector,
    day_block: Selector,
    day_label: Selector,
    session: Selector,
    session_time: Selector,
    session_name: Selector,
    session_link: Selector,
    countdown: Selector,
    script: Selector,
}

impl DetailSelectors {
    /// Compiles the selectors of the current detail page layout.
    pub fn new() -> SourceResult<Self> {
        Ok(Self {
            race_name: compile(".venue h2")?,
            circuit: compile("ul.menu-race-feature a.circuito")?,
            location: compile("ul.menu-race-feature .localidad")?,
            header_date: compile(".volanta .date")?,
            live_anchor: compile("#carrera-envivo a")?,
            day_block: compile("#calendario .date")?,
            day_label: compile(".hd .dia")?,
            session: compile(".sep-eta")?,
            session_time: compile("b")?,
            session_name: compile("span")?,
            session_link: compile("a")?,
            countdown: compile("#countdown")?,
            script: compile("script")?,
        })
    }
}

/// `countdown(YYYY, M, D, h, m)` as called by the page script.
static COUNTDOWN_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"countdown\(\s*(\d{4})\s*,\s*(\d{1,2})\s*,\s*(\d{1,2})\s*,\s*(\d{1,2})\s*,\s*(\d{1,2})\s*\)")
        .expect("Invalid countdown regex")
});

/// Parses a detail page.
///
/// Missing pieces are left empty; this never fails on markup.
pub fn parse_detail(html: &str, page_url: &str, selectors: &DetailSelectors) -> DetailPage {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let live_url = document
        .select(&selectors.live_anchor)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && *href != GENERIC_LIVE_PATH)
        .map(|href| absolutize(page_url, href));

    let page = DetailPage {
        event_date: first_text(root, &selectors.header_date)
            .as_deref()
            .and_then(parse_header_date),
        race_name: first_text(root, &selectors.race_name).unwrap_or_default(),
        circuit: first_text(root, &selectors.circuit).unwrap_or_default(),
        location: first_text(root, &selectors.location).unwrap_or_default(),
        live_url,
        sessions: parse_sessions(&document, page_url, selectors),
        countdown: countdown_from_attributes(&document, selectors)
            .or_else(|| countdown_from_script(&document, selectors)),
    };

    debug!(
        race = %page.race_name,
        sessions = page.sessions.len(),
        dated = page.is_dated(),
        live = page.live_url.is_some(),
        "Parsed detail page"
    );
    page
}

/// Fetches and parses the detail page of a category, if it has one.
pub async fn fetch_detail(
    fetcher: &PageFetcher,
    selectors: &DetailSelectors,
    category: &CategoryDescriptor,
) -> SourceResult<Option<DetailPage>> {
    let Some(url) = category.detail_url.as_deref() else {
        return Ok(None);
    };
    let html = fetcher.get(url).await?;
    Ok(Some(parse_detail(&html, url, selectors)))
}

/// Parses a `dd.mm.yy` (or `dd.mm.yyyy`, `dd/mm/yy`) header date.
pub fn parse_header_date(text: &str) -> Option<NaiveDate> {
    let parts: Vec<u32> = text
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect();

    let [day, month, year] = parts.as_slice() else {
        return None;
    };
    let year = if *year < 100 { 2000 + *year } else { *year };
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, *month, *day)
}

fn parse_sessions(
    document: &Html,
    page_url: &str,
    selectors: &DetailSelectors,
) -> Vec<RawSession> {
    let mut sessions = Vec::new();
    for block in document.select(&selectors.day_block) {
        let day_label = first_text(block, &selectors.day_label).unwrap_or_default();
        for row in block.select(&selectors.session) {
            match parse_session_row(row, &day_label, page_url, selectors) {
                Some(session) => sessions.push(session),
                None => trace!(day = %day_label, "Skipping session row without time or name"),
            }
        }
    }
    sessions
}

fn parse_session_row(
    row: ElementRef<'_>,
    day_label: &str,
    page_url: &str,
    selectors: &DetailSelectors,
) -> Option<RawSession> {
    let time = first_text(row, &selectors.session_time)?;
    let activity = first_text(row, &selectors.session_name)?;
    let anchor = row.select(&selectors.session_link).next();

    Some(RawSession {
        day_label: day_label.to_string(),
        time,
        activity,
        link: anchor
            .and_then(|a| a.value().attr("href"))
            .map(|href| absolutize(page_url, href)),
        status_text: anchor.map(text_of).filter(|text| !text.is_empty()),
    })
}

fn countdown_from_attributes(document: &Html, selectors: &DetailSelectors) -> Option<CountdownParts> {
    let element = document.select(&selectors.countdown).next()?;
    let attr = |name: &str| element.value().attr(name)?.trim().parse::<u32>().ok();
    Some(CountdownParts::new(
        i32::try_from(attr("data-year")?).ok()?,
        attr("data-month")?,
        attr("data-day")?,
        attr("data-hour").unwrap_or(0),
        attr("data-minute").unwrap_or(0),
    ))
}

fn countdown_from_script(document: &Html, selectors: &DetailSelectors) -> Option<CountdownParts> {
    document.select(&selectors.script).find_map(|script| {
        let source = script.text().collect::<String>();
        let caps = COUNTDOWN_CALL.captures(&source)?;
        let num = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();
        Some(CountdownParts::new(
            i32::try_from(num(1)?).ok()?,
            num(2)?,
            num(3)?,
            num(4)?,
            num(5)?,
        ))
    })
}
