//! Golden tests for calendar export.
//!
//! Documents are snapshotted with CRLF turned into LF so the snapshot files
//! stay readable. Run with `cargo insta review` to update snapshots after
//! intentional changes.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use icalendar::{Calendar, CalendarComponent, Component, DatePerhapsTime};

use crate::calendar::{CalendarOptions, race_document, races_document};
use crate::category::{AdapterKind, CategoryDescriptor};
use crate::race::NormalizedRace;

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

/// Fixed generation time shared by every document.
fn generated_at() -> DateTime<Utc> {
    utc(2025, 8, 5, 15, 0, 0)
}

fn alpha_race() -> NormalizedRace {
    let category = CategoryDescriptor::new(
        "alpha",
        "Alpha Series",
        "ALPHA",
        "https://alpha.example/calendario",
        AdapterKind::Dom,
    );
    // Sunday 2025-08-10 13:30 -03:00
    NormalizedRace::new(&category, utc(2025, 8, 10, 16, 30, 0), "Rafaela")
        .with_location("Santa Fe")
}

fn weekend_race() -> NormalizedRace {
    let category = CategoryDescriptor::new(
        "tc2000",
        "TC2000",
        "TC2000",
        "https://www.tc2000.com.ar/calendario",
        AdapterKind::Pattern,
    )
    .with_weekend_spanning(true);
    // Friday 2025-08-08, local start of day
    NormalizedRace::new(&category, utc(2025, 8, 8, 3, 0, 0), "Autódromo Termas de Río Hondo")
        .with_location("Santiago del Estero")
}

fn snapshot_text(body: &str) -> String {
    body.trim_end().replace("\r\n", "\n")
}

fn parse(body: &str) -> Calendar {
    body.parse::<Calendar>().unwrap()
}

#[test]
fn timed_sunday_event() {
    let doc = race_document(&alpha_race(), &CalendarOptions::default(), generated_at());
    let body = snapshot_text(&doc.body);
    insta::assert_snapshot!("timed_sunday_event", body);
}

#[test]
fn all_day_weekend_event() {
    let doc = race_document(&weekend_race(), &CalendarOptions::default(), generated_at());
    let body = snapshot_text(&doc.body);
    insta::assert_snapshot!("all_day_weekend_event", body);
}

#[test]
fn whole_set_export() {
    let races = [weekend_race(), alpha_race()];
    let doc = races_document(&races, &CalendarOptions::default(), generated_at());
    let body = snapshot_text(&doc.body);
    insta::assert_snapshot!("whole_set_export", body);
}

#[test]
fn exported_documents_parse_back() {
    let races = [weekend_race(), alpha_race()];
    let doc = races_document(&races, &CalendarOptions::default(), generated_at());
    let calendar = parse(&doc.body);

    let events: Vec<_> = calendar
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => Some(event),
            _ => None,
        })
        .collect();
    assert_eq!(events.len(), 2);

    assert_eq!(events[0].get_uid(), Some("tc2000-2025@nextrace.app"));
    assert_eq!(
        events[0].get_start(),
        Some(DatePerhapsTime::Date(
            NaiveDate::from_ymd_opt(2025, 8, 8).unwrap()
        ))
    );
    assert_eq!(
        events[0].get_end(),
        Some(DatePerhapsTime::Date(
            NaiveDate::from_ymd_opt(2025, 8, 11).unwrap()
        ))
    );

    assert_eq!(events[1].get_uid(), Some("alpha-2025@nextrace.app"));
    assert!(matches!(
        events[1].get_start(),
        Some(DatePerhapsTime::DateTime(_))
    ));
}

#[test]
fn custom_options_flow_into_header() {
    let options = CalendarOptions {
        product_id: "-//Example//Races//ES".to_string(),
        timezone: "America/Argentina/Cordoba".to_string(),
        uid_domain: "races.example".to_string(),
    };
    let doc = race_document(&alpha_race(), &options, generated_at());
    assert!(doc.body.contains("PRODID:-//Example//Races//ES\r\n"));
    assert!(doc.body.contains("X-WR-TIMEZONE:America/Argentina/Cordoba\r\n"));
    assert!(doc.body.contains("UID:alpha-2025@races.example\r\n"));
}
