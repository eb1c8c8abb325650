//! Fallback tier selection.
//!
//! The live result is used as-is whenever it holds at least one race. Only
//! when every category came back empty is the set replaced by placeholders,
//! which need nothing external and therefore cannot fail.

use chrono::{DateTime, Duration, Utc};
use nextrace_core::{CategoryDescriptor, FallbackTier, NormalizedRace, RaceSet, ScheduleEntry};
use tracing::{info, warn};

/// Circuit name shown while the real venue is unknown.
pub const PLACEHOLDER_CIRCUIT: &str = "Autódromo a confirmar";

/// Location shown while the real venue is unknown.
pub const PLACEHOLDER_LOCATION: &str = "Argentina";

/// Image shown while the real venue is unknown.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-circuit.jpg";

/// Picks the tier for a finished aggregation run.
pub fn settle(
    live: Vec<NormalizedRace>,
    categories: &[CategoryDescriptor],
    now: DateTime<Utc>,
) -> RaceSet {
    if !live.is_empty() || categories.is_empty() {
        let set = RaceSet::new(live, FallbackTier::Live, now);
        info!(
            tier = %set.tier,
            races = set.len(),
            missing = categories.len().saturating_sub(set.len()),
            "Serving live race data"
        );
        return set;
    }

    let set = RaceSet::new(placeholder_races(categories, now), FallbackTier::Placeholder, now);
    warn!(
        tier = %set.tier,
        races = set.len(),
        "Every source failed, serving placeholder race data"
    );
    set
}

/// Builds one placeholder race per category.
///
/// The i-th category is dated `i + 1` weeks after `now`.
pub fn placeholder_races(categories: &[CategoryDescriptor], now: DateTime<Utc>) -> Vec<NormalizedRace> {
    categories
        .iter()
        .zip(1i64..)
        .map(|(category, weeks)| {
            NormalizedRace::new(category, now + Duration::weeks(weeks), PLACEHOLDER_CIRCUIT)
                .with_location(PLACEHOLDER_LOCATION)
                .with_image(PLACEHOLDER_IMAGE)
                .with_schedule(placeholder_schedule())
        })
        .collect()
}

/// The generic three-session weekend.
pub fn placeholder_schedule() -> Vec<ScheduleEntry> {
    vec![
        ScheduleEntry::new("Viernes", "10:00", "Entrenamientos"),
        ScheduleEntry::new("Sábado", "14:00", "Clasificación"),
        ScheduleEntry::new("Domingo", "12:00", "Carrera"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nextrace_core::{AdapterKind, builtin_categories};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 5, 15, 0, 0).unwrap()
    }

    fn race(id: &str, day: u32) -> NormalizedRace {
        let category = CategoryDescriptor::new(id, id, id, "https://x", AdapterKind::Dom);
        NormalizedRace::new(&category, Utc.with_ymd_and_hms(2025, 8, day, 16, 0, 0).unwrap(), "Rafaela")
    }

    #[test]
    fn partial_live_result_stays_live() {
        let categories = builtin_categories();
        let set = settle(vec![race("tcp", 24), race("tc", 10)], &categories, now());
        assert_eq!(set.tier, FallbackTier::Live);
        assert_eq!(set.len(), 2);
        assert_eq!(set.races()[0].category_id, "tc");
        assert_eq!(set.generated_at, now());
    }

    #[test]
    fn total_outage_yields_placeholders() {
        let categories = builtin_categories();
        let set = settle(Vec::new(), &categories, now());

        assert_eq!(set.tier, FallbackTier::Placeholder);
        assert_eq!(set.len(), categories.len());
        for (i, race) in set.iter().enumerate() {
            assert!(race.date > now());
            assert_eq!(race.date, now() + Duration::weeks(i as i64 + 1));
            assert_eq!(race.circuit_name, PLACEHOLDER_CIRCUIT);
            assert_eq!(race.schedule.len(), 3);
            assert!(!race.is_live);
        }
    }

    #[test]
    fn placeholders_follow_configuration_order() {
        let categories = builtin_categories();
        let races = placeholder_races(&categories, now());
        let ids: Vec<_> = races.iter().map(|r| r.category_id.as_str()).collect();
        let expected: Vec<_> = categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, expected);
        assert!(races[6].weekend_spanning);
    }

    #[test]
    fn placeholder_schedule_is_a_full_weekend() {
        let activities: Vec<_> = placeholder_schedule()
            .into_iter()
            .map(|s| (s.day, s.activity))
            .collect();
        assert_eq!(
            activities,
            vec![
                ("Viernes".to_string(), "Entrenamientos".to_string()),
                ("Sábado".to_string(), "Clasificación".to_string()),
                ("Domingo".to_string(), "Carrera".to_string()),
            ]
        );
    }

    #[test]
    fn no_categories_is_an_empty_live_set() {
        let set = settle(Vec::new(), &[], now());
        assert_eq!(set.tier, FallbackTier::Live);
        assert!(set.is_empty());
    }
}
