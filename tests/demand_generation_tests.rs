//! Tests for passenger-level demand generation and the batch restroom simulation
//!
//! Seeded generators make every expectation reproducible.

use airport_facility_sim::demand::{EntryOffset, ServerPoolOutput, SECURITY_NODE};
use airport_facility_sim::*;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn flights() -> Vec<FlightRecord> {
    vec![
        FlightRecord::arrival("AA100", noon(), "G1", 150),
        FlightRecord::departure("UA200", noon() + Duration::hours(2), "G2", 180),
        FlightRecord::arrival("DL300", noon() + Duration::days(1), "G1", 90),
    ]
}

fn simulate(seed: u64) -> ServerPoolOutput {
    let passengers = PassengerGenerator::new(PassengerBehavior::default(), Some(seed))
        .unwrap()
        .generate_for_day(&flights(), day())
        .unwrap();
    let layout = TerminalLayout::from_config(&TerminalConfig::default());
    let mut simulator = ServerPoolSimulator::from_layout(ServerPoolParams::default(), &layout, Some(seed))
        .unwrap()
        .with_origin(SECURITY_NODE, 50.0, -50.0);
    simulator.run(&passengers).unwrap()
}

/// Only flights of the requested day are expanded
#[test]
fn test_generate_for_day_filters_by_date() {
    let mut generator = PassengerGenerator::new(PassengerBehavior::default(), Some(1)).unwrap();
    let passengers = generator.generate_for_day(&flights(), day()).unwrap();
    assert_eq!(passengers.len(), 330);
    assert!(passengers.iter().all(|p| p.entry_time.date_naive() == day()));
}

/// Entry offsets stay inside their clipping bounds
#[test]
fn test_entry_offsets_are_clipped() {
    let mut generator = PassengerGenerator::new(PassengerBehavior::default(), Some(2)).unwrap();
    let passengers = generator.generate_for_day(&flights(), day()).unwrap();

    for passenger in &passengers {
        if passenger.flight_id == FlightId::new("AA100") {
            let minutes = (passenger.entry_time - noon()).num_milliseconds() as f64 / 60_000.0;
            assert!((0.0..=15.0).contains(&minutes), "arrival offset {}", minutes);
            assert_eq!(passenger.origin, SECURITY_NODE);
        } else {
            let departure = noon() + Duration::hours(2);
            let minutes = (passenger.entry_time - departure).num_milliseconds() as f64 / 60_000.0;
            assert!((-90.0..=-30.0).contains(&minutes), "departure offset {}", minutes);
            assert_eq!(passenger.origin, "G2");
        }
    }
}

/// Output is sorted by entry time and identical for identical seeds
#[test]
fn test_seeded_generation_is_reproducible() {
    let first = PassengerGenerator::new(PassengerBehavior::default(), Some(9))
        .unwrap()
        .generate_for_day(&flights(), day())
        .unwrap();
    let second = PassengerGenerator::new(PassengerBehavior::default(), Some(9))
        .unwrap()
        .generate_for_day(&flights(), day())
        .unwrap();
    assert_eq!(first, second);
    assert!(first.windows(2).all(|w| w[0].entry_time <= w[1].entry_time));
}

/// Restroom probability and gender share act as hard switches at 0 and 1
#[test]
fn test_behavior_extremes() {
    let behavior = PassengerBehavior { restroom_probability: 1.0, male_share: 0.0, ..PassengerBehavior::default() };
    let passengers = PassengerGenerator::new(behavior, Some(3)).unwrap().generate_for_day(&flights(), day()).unwrap();
    assert!(passengers.iter().all(|p| p.uses_restroom && p.gender == Gender::Female));

    let behavior = PassengerBehavior { restroom_probability: 0.0, ..PassengerBehavior::default() };
    let passengers = PassengerGenerator::new(behavior, Some(3)).unwrap().generate_for_day(&flights(), day()).unwrap();
    assert!(passengers.iter().all(|p| !p.uses_restroom));
}

/// Empty selections and bad parameters are typed errors
#[test]
fn test_generation_errors() {
    let mut generator = PassengerGenerator::new(PassengerBehavior::default(), Some(4)).unwrap();
    let other_day = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    assert!(matches!(generator.generate_for_day(&flights(), other_day), Err(DemandError::EmptyDataset { .. })));
    assert!(matches!(
        generator.generate_for_od(&flights(), day(), "G2", "G1"),
        Err(DemandError::EmptyDataset { .. })
    ));

    let od = generator.generate_for_od(&flights(), day(), "G2", SECURITY_NODE).unwrap();
    assert_eq!(od.len(), 180);

    let behavior = PassengerBehavior { restroom_probability: 1.5, ..PassengerBehavior::default() };
    assert!(matches!(PassengerGenerator::new(behavior, None), Err(DemandError::InvalidParameter(_))));

    let behavior = PassengerBehavior {
        arrival_offset: EntryOffset { mean: 5.0, std_dev: 3.0, min: 10.0, max: 0.0 },
        ..PassengerBehavior::default()
    };
    assert!(PassengerGenerator::new(behavior, None).is_err());
}

/// Every restroom user is served once, first come first served
#[test]
fn test_server_pool_visits() {
    let output = simulate(11);
    assert!(!output.visits.is_empty());

    for visit in &output.visits {
        assert!(visit.arrival >= visit.entry);
        assert!(visit.service_start >= visit.arrival);
        assert!(visit.service_end >= visit.service_start);
        assert!((visit.wait - (visit.service_start - visit.arrival)).abs() < 1e-9);
    }
    assert_eq!(output.at(0.0), output.start);
    assert_eq!(output.at(90.0), output.start + Duration::seconds(90));
}

/// Users only enter sections of their own gender
#[test]
fn test_server_pool_respects_gender() {
    let passengers = PassengerGenerator::new(PassengerBehavior::default(), Some(5))
        .unwrap()
        .generate_for_day(&flights(), day())
        .unwrap();
    let users = passengers.iter().filter(|p| p.uses_restroom).count();
    let layout = TerminalLayout::from_config(&TerminalConfig::default());
    let mut simulator = ServerPoolSimulator::from_layout(ServerPoolParams::default(), &layout, Some(5))
        .unwrap()
        .with_origin(SECURITY_NODE, 50.0, -50.0);
    let output = simulator.run(&passengers).unwrap();
    assert_eq!(output.visits.len(), users);

    let female_sections = output.visits.iter().filter(|v| v.section.gender == Gender::Female).count();
    let female_users = passengers.iter().filter(|p| p.uses_restroom && p.gender == Gender::Female).count();
    assert_eq!(female_sections, female_users);
}

/// Passengers from an origin without coordinates are rejected
#[test]
fn test_unknown_origin() {
    let passengers = PassengerGenerator::new(PassengerBehavior { restroom_probability: 1.0, ..Default::default() }, Some(6))
        .unwrap()
        .generate_for_day(&flights(), day())
        .unwrap();
    let layout = TerminalLayout::from_config(&TerminalConfig::default());
    let mut simulator = ServerPoolSimulator::from_layout(ServerPoolParams::default(), &layout, Some(6)).unwrap();
    assert!(matches!(simulator.run(&passengers), Err(DemandError::UnknownOrigin(_))));
}

/// A single slow server builds queues that show up in the waiting-time series
#[test]
fn test_waiting_time_series_feeds_crew_optimizer() {
    let passengers = PassengerGenerator::new(PassengerBehavior { restroom_probability: 1.0, ..Default::default() }, Some(8))
        .unwrap()
        .generate_for_day(&flights(), day())
        .unwrap();
    let layout = TerminalLayout::from_config(&TerminalConfig::default());
    let params = ServerPoolParams { servers: 1, mean_service_minutes: 5.0, ..ServerPoolParams::default() };
    let mut simulator =
        ServerPoolSimulator::from_layout(params, &layout, Some(8)).unwrap().with_origin(SECURITY_NODE, 50.0, -50.0);
    let output = simulator.run(&passengers).unwrap();

    let n_steps = 240;
    let series = output.waiting_time_series(60.0, n_steps);
    assert!(!series.is_empty());
    assert!(series.values().all(|s| s.len() == n_steps));
    assert!(series.values().flatten().all(|&w| w >= 0.0));
    assert!(output.average_wait().values().any(|&w| w > 0.0));

    let demand = DemandSnapshot::from_waiting_times(series);
    assert!(!demand.has_arrival_data());
}
