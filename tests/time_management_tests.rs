//! Tests for simulation-time to wall-clock conversion
//!
//! Simulation seconds are offsets from a base epoch; results are exported
//! with UTC timestamps derived from it.

use airport_facility_sim::*;
use chrono::{Duration, TimeZone, Timelike, Utc};

/// Test conversion from the default base epoch
#[test]
fn test_default_epoch() {
    let clock = TimeManager::new(DEFAULT_BASE_EPOCH).unwrap();
    assert_eq!(clock.base(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(clock.to_iso8601(0.0), "2024-01-01T00:00:00Z");
    assert_eq!(clock.to_iso8601(5400.0), "2024-01-01T01:30:00Z");
}

/// Test that fractional seconds survive conversion
#[test]
fn test_fractional_seconds() {
    let clock = TimeManager::new(DEFAULT_BASE_EPOCH).unwrap();
    let stamp = clock.to_utc(90.5);
    assert_eq!(stamp - clock.base(), Duration::milliseconds(90_500));
    assert_eq!(clock.sim_seconds(stamp), 90.5);
}

/// Test a custom base instant
#[test]
fn test_custom_base() {
    let base = Utc.with_ymd_and_hms(2025, 6, 30, 22, 0, 0).unwrap();
    let clock = TimeManager::from_datetime(base);

    let later = clock.to_utc(3.0 * 3600.0);
    assert_eq!(later.hour(), 1);
    assert_eq!(later.date_naive().to_string(), "2025-07-01");
    assert_eq!(clock.sim_seconds(base - Duration::minutes(10)), -600.0);
}

/// Test time-of-day and day-count helpers used by crew shifts
#[test]
fn test_day_helpers() {
    assert_eq!(TimeManager::seconds_of_day(3600.0), 3600.0);
    assert_eq!(TimeManager::seconds_of_day(86_400.0 + 1800.0), 1800.0);
    assert_eq!(TimeManager::days(43_200.0), 0.5);
}

/// Test that results export every timestamp through the crew configuration epoch
#[test]
fn test_results_export_uses_epoch() {
    let mut restrooms = std::collections::BTreeMap::new();
    restrooms.insert(RestroomId::new("R1"), RestroomCapacity { floor: 1, capacity_m: 0.2, capacity_f: 0.2 });
    let mut travel = TravelTimeMatrix::new();
    travel.insert_symmetric("Base_1", "R1", 60.0);
    travel.insert_symmetric("Base_2", "R1", 60.0);

    let mut config = CrewConfig::default();
    config.base_epoch = Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap().timestamp();
    let optimizer = CleaningCrewOptimizer::new(restrooms, travel, 7200.0, 60.0, config).unwrap();
    let results = optimizer
        .run_optimization(&DemandSnapshot::default(), &[CleaningRequirement::new("R1", 1)])
        .unwrap();

    let clock = optimizer.time_manager().unwrap();
    let exported = results.export(&clock);
    let times: Vec<String> = exported.kpi_timeline.iter().map(|k| k.time.to_rfc3339()).collect();
    assert_eq!(
        times,
        vec!["2024-03-01T06:00:00+00:00", "2024-03-01T07:00:00+00:00", "2024-03-01T08:00:00+00:00"]
    );

    // one routine cleaning required at mid-horizon
    assert_eq!(exported.tasks[0].required_time, clock.to_utc(3600.0));
    assert_eq!(exported.crew_schedules.len(), 3);
}
