//! Flat event feed.
//!
//! A minimal projection of the race set for consumers that only show a
//! title, a start, an end and a cover image.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::race::NormalizedRace;
use crate::time::end_of_local_week;

/// One race as a feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFeedItem {
    /// Event start.
    pub event_time_and_day: DateTime<Utc>,
    /// `"<category> - <circuit>"`.
    pub event_title: String,
    /// Last millisecond of the local Sunday closing the event's week.
    pub end_date: DateTime<Utc>,
    pub cover_image: String,
}

impl EventFeedItem {
    /// Projects a race into a feed entry.
    pub fn from_race(race: &NormalizedRace) -> Self {
        Self {
            event_time_and_day: race.date,
            event_title: format!("{} - {}", race.category_name, race.circuit_name),
            end_date: end_of_local_week(race.date) + Duration::milliseconds(999),
            cover_image: race.circuit_image.clone(),
        }
    }
}

/// Projects every race, keeping the input order.
pub fn event_feed<'a>(races: impl IntoIterator<Item = &'a NormalizedRace>) -> Vec<EventFeedItem> {
    races.into_iter().map(EventFeedItem::from_race).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{AdapterKind, CategoryDescriptor};
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn race(date: DateTime<Utc>) -> NormalizedRace {
        let category = CategoryDescriptor::new(
            "tc",
            "Turismo Carretera",
            "TC",
            "https://actc.org.ar/tc/calendario.html",
            AdapterKind::Dom,
        );
        NormalizedRace::new(&category, date, "Autódromo Ciudad de Rafaela")
            .with_image("https://actc.org.ar/img/rafaela.jpg")
    }

    #[test]
    fn sunday_race_ends_same_local_day() {
        let item = EventFeedItem::from_race(&race(utc(2025, 8, 10, 16, 30)));
        assert_eq!(item.event_time_and_day, utc(2025, 8, 10, 16, 30));
        assert_eq!(item.event_title, "Turismo Carretera - Autódromo Ciudad de Rafaela");
        assert_eq!(
            item.end_date,
            utc(2025, 8, 11, 2, 59) + Duration::seconds(59) + Duration::milliseconds(999)
        );
        assert_eq!(item.cover_image, "https://actc.org.ar/img/rafaela.jpg");
    }

    #[test]
    fn friday_start_ends_on_following_sunday() {
        let item = EventFeedItem::from_race(&race(utc(2025, 8, 8, 3, 0)));
        assert_eq!(
            item.end_date,
            utc(2025, 8, 11, 2, 59) + Duration::seconds(59) + Duration::milliseconds(999)
        );
    }

    #[test]
    fn serializes_with_feed_field_names() {
        let feed = event_feed([&race(utc(2025, 8, 10, 16, 30))]);
        let json = serde_json::to_value(&feed).unwrap();
        assert_eq!(json[0]["event_time_and_day"], "2025-08-10T16:30:00Z");
        assert_eq!(json[0]["end_date"], "2025-08-11T02:59:59.999Z");
        assert_eq!(json[0]["event_title"], "Turismo Carretera - Autódromo Ciudad de Rafaela");
        assert!(json[0]["cover_image"].is_string());
    }
}
