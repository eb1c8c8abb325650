//! Adapter output before normalization.
//!
//! Every adapter strategy produces the same [`RawExtraction`] shape, so the
//! normalizer never needs to know which page structure the fields came from.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use nextrace_core::time::ARGENTINA;

/// Authoritative timestamp components published separately from the listing.
///
/// The components are Argentina wall-clock values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl CountdownParts {
    /// Creates countdown components.
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
        }
    }

    /// Decomposes an absolute instant into Argentina wall-clock components.
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        let local = instant.with_timezone(&ARGENTINA);
        Self::new(
            local.year(),
            local.month(),
            local.day(),
            local.hour(),
            local.minute(),
        )
    }
}

/// Raw fields of one listing entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawExtraction {
    /// Day of month as published (`"10"`).
    pub day: String,
    /// Month name or number (`"AGO"`, `"08"`).
    pub month_token: String,
    /// Explicit year, when the page publishes one. Listings never do.
    pub year: Option<i32>,
    /// Optional wall-clock time (`"13:30"`).
    pub time: Option<String>,
    pub circuit: String,
    pub location: String,
    /// Image URL or reference, absolute when it could be resolved.
    pub image: String,
    /// Live-broadcast URL, present when the page shows a live indicator.
    pub live_url: Option<String>,
    /// Authoritative timestamp, takes precedence over `day`/`month_token`.
    pub countdown: Option<CountdownParts>,
}

impl RawExtraction {
    /// Creates an extraction from the listing date fragments and circuit.
    pub fn new(
        day: impl Into<String>,
        month_token: impl Into<String>,
        circuit: impl Into<String>,
    ) -> Self {
        Self {
            day: day.into(),
            month_token: month_token.into(),
            circuit: circuit.into(),
            ..Self::default()
        }
    }

    /// Builder method to pin the year instead of inferring it.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Builder method to set the wall-clock time.
    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder method to set the image reference.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Builder method to set the live-broadcast URL.
    pub fn with_live_url(mut self, url: impl Into<String>) -> Self {
        self.live_url = Some(url.into());
        self
    }

    /// Builder method to set the authoritative countdown.
    pub fn with_countdown(mut self, countdown: CountdownParts) -> Self {
        self.countdown = Some(countdown);
        self
    }
}

/// One session row of a detail page, before date resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSession {
    /// The day block label (`"Viernes"`).
    pub day_label: String,
    pub time: String,
    pub activity: String,
    pub link: Option<String>,
    /// Anchor text next to the session (`"Resultados"`).
    pub status_text: Option<String>,
}

/// Everything read from a category's current-event page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailPage {
    /// The header date, normally the Sunday of the event.
    pub event_date: Option<NaiveDate>,
    pub race_name: String,
    pub circuit: String,
    pub location: String,
    pub live_url: Option<String>,
    pub sessions: Vec<RawSession>,
    pub countdown: Option<CountdownParts>,
}

impl DetailPage {
    /// Returns true if the page carries anything that can date an event.
    pub fn is_dated(&self) -> bool {
        self.countdown.is_some() || self.event_date.is_some()
    }

    /// Synthesizes a listing entry from the page, for categories whose
    /// listing yielded nothing usable.
    pub fn as_extraction(&self) -> Option<RawExtraction> {
        let countdown = self.countdown;
        let (year, month, day) = match (countdown, self.event_date) {
            (Some(parts), _) => (parts.year, parts.month, parts.day),
            (None, Some(date)) => (date.year(), date.month(), date.day()),
            (None, None) => return None,
        };

        let circuit = if self.circuit.is_empty() {
            self.race_name.clone()
        } else {
            self.circuit.clone()
        };

        let mut raw = RawExtraction::new(day.to_string(), month.to_string(), circuit)
            .with_year(year)
            .with_location(self.location.clone());
        raw.live_url = self.live_url.clone();
        raw.countdown = countdown;
        Some(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn countdown_parts_use_local_wall_clock() {
        let instant = Utc.with_ymd_and_hms(2025, 8, 10, 16, 30, 0).unwrap();
        assert_eq!(
            CountdownParts::from_instant(instant),
            CountdownParts::new(2025, 8, 10, 13, 30)
        );
    }

    #[test]
    fn extraction_builder() {
        let raw = RawExtraction::new("10", "AGO", "Rafaela")
            .with_time("13:30")
            .with_location("Santa Fe")
            .with_image("https://actc.org.ar/img/rafaela.jpg");
        assert_eq!(raw.day, "10");
        assert_eq!(raw.month_token, "AGO");
        assert_eq!(raw.time.as_deref(), Some("13:30"));
        assert!(raw.live_url.is_none());
        assert!(raw.countdown.is_none());
        assert!(raw.year.is_none());
    }

    mod detail {
        use super::*;

        #[test]
        fn undated_page_yields_nothing() {
            let page = DetailPage {
                circuit: "Rafaela".to_string(),
                ..DetailPage::default()
            };
            assert!(!page.is_dated());
            assert!(page.as_extraction().is_none());
        }

        #[test]
        fn countdown_wins_over_header_date() {
            let page = DetailPage {
                event_date: NaiveDate::from_ymd_opt(2025, 8, 10),
                circuit: "Rafaela".to_string(),
                countdown: Some(CountdownParts::new(2025, 8, 10, 13, 30)),
                ..DetailPage::default()
            };
            let raw = page.as_extraction().unwrap();
            assert_eq!(raw.countdown, Some(CountdownParts::new(2025, 8, 10, 13, 30)));
            assert_eq!(raw.day, "10");
            assert_eq!(raw.month_token, "8");
        }

        #[test]
        fn header_date_becomes_listing_fragments() {
            let page = DetailPage {
                event_date: NaiveDate::from_ymd_opt(2025, 8, 10),
                race_name: "Gran Premio Coronación".to_string(),
                live_url: Some("https://actc.org.ar/tc/envivo/123".to_string()),
                ..DetailPage::default()
            };
            let raw = page.as_extraction().unwrap();
            assert_eq!(raw.circuit, "Gran Premio Coronación");
            assert_eq!((raw.day.as_str(), raw.month_token.as_str()), ("10", "8"));
            assert_eq!(raw.year, Some(2025));
            assert!(raw.countdown.is_none());
            assert!(raw.live_url.is_some());
        }
    }
}
