//! Race set output.

use chrono::{DateTime, Duration, Utc};
use nextrace_core::time::ARGENTINA;
use nextrace_core::{FallbackTier, NormalizedRace, RaceSet, SessionStatus, event_feed};
use nextrace_service::RaceService;

use crate::error::ClientResult;

/// Prints the current race set, or its event feed when `feed` is set.
pub async fn run(service: &RaceService, json: bool, feed: bool) -> ClientResult<()> {
    let set = service.get_race_data().await;
    if feed {
        println!("{}", render_feed(&set)?);
    } else if json {
        println!("{}", serde_json::to_string_pretty(&set)?);
    } else {
        print!("{}", render_text(&set, Utc::now()));
    }
    Ok(())
}

/// Renders the event feed as pretty JSON.
pub fn render_feed(set: &RaceSet) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&event_feed(set.iter()))
}

/// Renders the race set as one block per race.
pub fn render_text(set: &RaceSet, now: DateTime<Utc>) -> String {
    let mut lines = Vec::new();
    if set.tier == FallbackTier::Placeholder {
        lines.push("Sin datos en vivo, fechas provisorias".to_string());
    }
    if set.is_empty() {
        lines.push("No hay carreras programadas".to_string());
    }

    for race in set.iter() {
        lines.push(race_line(race));
        if let Some(countdown) = &race.countdown {
            let status = if countdown.finished {
                SessionStatus::Finished
            } else {
                SessionStatus::Upcoming
            };
            let mut line = format!("       {}: {}", status.label(), countdown.label);
            if !countdown.finished {
                line.push_str(&format!(" (en {})", format_remaining(countdown.at - now)));
            }
            lines.push(line);
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn race_line(race: &NormalizedRace) -> String {
    let local = race.date.with_timezone(&ARGENTINA);
    let when = if race.weekend_spanning && !race.has_detailed_schedule {
        local.format("%d/%m/%Y").to_string()
    } else {
        local.format("%d/%m/%Y %H:%M").to_string()
    };

    let mut line = format!("{:<6} {:<16} {}", race.short_name, when, race.circuit_name);
    if !race.location.is_empty() {
        line.push_str(&format!(", {}", race.location));
    }
    if race.is_live {
        line.push_str(" [EN VIVO]");
    }
    line
}

/// Formats a remaining duration as its two largest units.
pub fn format_remaining(remaining: Duration) -> String {
    let minutes = remaining.num_minutes();
    if minutes < 1 {
        return "<1m".to_string();
    }
    let (days, hours, minutes) = (minutes / 1440, (minutes % 1440) / 60, minutes % 60);
    match (days, hours) {
        (0, 0) => format!("{}m", minutes),
        (0, h) => format!("{}h {}m", h, minutes),
        (d, h) => format!("{}d {}h", d, h),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nextrace_core::{AdapterKind, CategoryDescriptor, CountdownTarget};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn race(id: &str, short: &str, date: DateTime<Utc>) -> NormalizedRace {
        let category = CategoryDescriptor::new(id, id, short, "https://x", AdapterKind::Dom);
        NormalizedRace::new(&category, date, "Autódromo Ciudad de Rafaela").with_location("Santa Fe")
    }

    #[test]
    fn renders_local_times_in_order() {
        let set = RaceSet::new(
            vec![
                race("tcp", "TCP", utc(2025, 8, 24, 15, 0)),
                race("tc", "TC", utc(2025, 8, 10, 16, 30)),
            ],
            FallbackTier::Live,
            utc(2025, 8, 5, 15, 0),
        );
        let text = render_text(&set, utc(2025, 8, 5, 15, 0));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("TC     10/08/2025 13:30"));
        assert!(lines[0].ends_with("Autódromo Ciudad de Rafaela, Santa Fe"));
        assert!(lines[1].starts_with("TCP    24/08/2025 12:00"));
    }

    #[test]
    fn renders_countdown_and_live_marker() {
        let mut live = race("tc", "TC", utc(2025, 8, 10, 16, 30));
        live.is_live = true;
        live.countdown = Some(CountdownTarget {
            label: "Final".to_string(),
            at: utc(2025, 8, 10, 16, 30),
            finished: true,
        });
        let mut next = race("tcp", "TCP", utc(2025, 8, 10, 18, 0));
        next.countdown = Some(CountdownTarget {
            label: "Final".to_string(),
            at: utc(2025, 8, 10, 18, 0),
            finished: false,
        });

        let set = RaceSet::new(vec![live, next], FallbackTier::Live, utc(2025, 8, 10, 17, 0));
        let text = render_text(&set, utc(2025, 8, 10, 17, 0));
        assert!(text.contains("Rafaela, Santa Fe [EN VIVO]\n       Finalizada: Final\n"));
        assert!(text.contains("       Próxima: Final (en 1h 0m)\n"));
    }

    #[test]
    fn weekend_spanning_shows_date_only() {
        let mut tc2000 = race("tc2000", "TC2000", utc(2025, 8, 8, 3, 0));
        tc2000.weekend_spanning = true;
        let set = RaceSet::new(vec![tc2000], FallbackTier::Live, utc(2025, 8, 5, 15, 0));
        let text = render_text(&set, utc(2025, 8, 5, 15, 0));
        assert!(text.starts_with("TC2000 08/08/2025       Autódromo"));
    }

    #[test]
    fn placeholder_and_empty_sets_are_flagged() {
        let placeholder = RaceSet::new(
            vec![race("tc", "TC", utc(2025, 8, 12, 15, 0))],
            FallbackTier::Placeholder,
            utc(2025, 8, 5, 15, 0),
        );
        assert!(render_text(&placeholder, utc(2025, 8, 5, 15, 0)).starts_with("Sin datos en vivo"));

        let empty = RaceSet::new(Vec::new(), FallbackTier::Live, utc(2025, 8, 5, 15, 0));
        assert_eq!(render_text(&empty, utc(2025, 8, 5, 15, 0)), "No hay carreras programadas\n");
    }

    #[test]
    fn feed_lists_races_in_date_order() {
        let set = RaceSet::new(
            vec![
                race("tcp", "TCP", utc(2025, 8, 24, 15, 0)),
                race("tc", "TC", utc(2025, 8, 10, 16, 30)),
            ],
            FallbackTier::Live,
            utc(2025, 8, 5, 15, 0),
        );
        let feed: serde_json::Value = serde_json::from_str(&render_feed(&set).unwrap()).unwrap();
        let items = feed.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["event_title"], "tc - Autódromo Ciudad de Rafaela");
        assert_eq!(items[0]["end_date"], "2025-08-11T02:59:59.999Z");
        assert_eq!(items[1]["event_time_and_day"], "2025-08-24T15:00:00Z");

        let empty = RaceSet::new(Vec::new(), FallbackTier::Live, utc(2025, 8, 5, 15, 0));
        assert_eq!(render_feed(&empty).unwrap(), "[]");
    }

    #[test]
    fn remaining_time_units() {
        assert_eq!(format_remaining(Duration::seconds(30)), "<1m");
        assert_eq!(format_remaining(Duration::minutes(-5)), "<1m");
        assert_eq!(format_remaining(Duration::minutes(42)), "42m");
        assert_eq!(format_remaining(Duration::minutes(125)), "2h 5m");
        assert_eq!(format_remaining(Duration::minutes(1440 + 190)), "1d 3h");
    }
}
