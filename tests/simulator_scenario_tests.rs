//! End-to-end scenarios of the restroom flow simulator
//!
//! A single deplaning flight feeding one restroom gives hand-checkable
//! queue trajectories; the default terminal checks the run-level outputs.

use airport_facility_sim::types::{EntryPointSpec, FlightSpec, RestroomSpec};
use airport_facility_sim::*;
use std::collections::BTreeMap;

/// One restroom, one entry point, 60 passengers over ten minutes, men only
fn single_restroom_config() -> TerminalConfig {
    let mut config = TerminalConfig::default();
    config.floors = vec![1];

    config.restrooms = BTreeMap::new();
    config.restrooms.insert(
        RestroomId::new("R1"),
        RestroomSpec { floor: 1, x: 10.0, y: 0.0, capacity_m: 0.2, capacity_f: 0.2 },
    );
    config.entry_points = BTreeMap::new();
    config.entry_points.insert(EntryPointId::new("E1"), EntryPointSpec { floor: 1, x: 0.0, y: 0.0 });
    config.gate_mappings = BTreeMap::new();
    config.gate_mappings.insert("G".to_string(), EntryPointId::new("E1"));

    config.flights = BTreeMap::new();
    config.flights.insert(
        FlightId::new("XY1"),
        FlightSpec {
            arrival_time: 0.0,
            passengers: 60,
            aircraft_type: AircraftType::Medium,
            gate: "G".to_string(),
            flow_type: FlowType::Deplaning,
            boarding_start: 3600.0,
            boarding_duration: 2700.0,
        },
    );

    config.simulation.alpha_arrival = 1.0;
    config.simulation.male_share = 1.0;
    config.simulation.time_step = 5.0;
    config.simulation.duration = 1200.0;
    config
}

fn men() -> SectionId {
    SectionId::new(RestroomId::new("R1"), Gender::Male)
}

fn women() -> SectionId {
    SectionId::new(RestroomId::new("R1"), Gender::Female)
}

/// Flight flow reaches the men's section at 0.1 pax/s while the flight deplanes
#[test]
fn test_single_flight_arrival_rates() {
    let mut simulator = RestroomSimulator::new(single_restroom_config()).unwrap();
    let output = simulator.run().unwrap();
    assert_eq!(output.n_steps, 240);

    let series = output.series(&men()).unwrap();
    // active for t = 0..=600 s, inclusive end
    for t in 0..=120 {
        assert!((series.arrival_rate[t] - 0.1).abs() < 1e-12, "step {}", t);
    }
    assert!(series.arrival_rate[121..].iter().all(|&r| r == 0.0));

    let stats = &output.section_statistics[&men()];
    assert!((stats.total_passengers - 121.0 * 0.1 * 5.0).abs() < 1e-9);
}

/// Queue approaches the level where ramped service matches arrivals
#[test]
fn test_single_flight_queue_trajectory() {
    let mut simulator = RestroomSimulator::new(single_restroom_config()).unwrap();
    let output = simulator.run().unwrap();
    let queue = &output.series(&men()).unwrap().queue_length;

    assert_eq!(queue[0], 0.0);
    assert!((queue[1] - 0.5).abs() < 1e-12);
    assert!((queue[2] - 0.75).abs() < 1e-12);
    assert!(queue.iter().all(|&l| (0.0..1.0).contains(&l)));
    // drained well before the horizon ends
    assert_eq!(*queue.last().unwrap(), 0.0);

    let waits = &output.series(&men()).unwrap().waiting_time;
    assert!(waits.iter().all(|w| w.is_finite() && *w >= 0.0));
    assert!(waits[10] > 0.0);
}

/// The women's section sees nothing when every passenger is male
#[test]
fn test_gender_split_respected() {
    let mut simulator = RestroomSimulator::new(single_restroom_config()).unwrap();
    let output = simulator.run().unwrap();
    let series = output.series(&women()).unwrap();

    assert!(series.arrival_rate.iter().all(|&r| r == 0.0));
    assert!(series.queue_length.iter().all(|&l| l == 0.0));
    assert!(series.waiting_time.iter().all(|&w| w == 0.0));
}

/// A half-utilized section is stable and the assignment settles in two passes
#[test]
fn test_single_flight_stability_and_convergence() {
    let mut simulator = RestroomSimulator::new(single_restroom_config()).unwrap();
    let output = simulator.run().unwrap();

    assert!(output.stability.overall_stable);
    let men_stability = &output.stability.sections[&men()];
    assert_eq!(men_stability.class, StabilityClass::Stable);
    assert!((men_stability.utilization_percent - 50.0).abs() < 1e-9);

    let iterations = &output.convergence.iterations_per_step;
    assert_eq!(iterations.len(), 240);
    assert!(iterations[..=120].iter().all(|&i| i == 2));
    assert!(iterations[121..].iter().all(|&i| i == 1));
    assert!(output.convergence.all_converged());
    assert_eq!(output.statistics.converged_steps, 240);
}

/// Every policy sends the same flow when there is only one candidate
#[test]
fn test_methods_agree_on_single_candidate() {
    for method in [AssignmentMethod::Logit, AssignmentMethod::Deterministic, AssignmentMethod::Proportional] {
        let mut config = single_restroom_config();
        config.simulation.method = method;
        let output = RestroomSimulator::new(config).unwrap().run().unwrap();
        assert_eq!(output.method, method);
        assert!((output.series(&men()).unwrap().arrival_rate[0] - 0.1).abs() < 1e-12);
    }
}

/// Deterministic assignment concentrates a gate's flow on one section per gender
#[test]
fn test_default_terminal_deterministic() {
    let mut config = TerminalConfig::default();
    config.simulation.method = AssignmentMethod::Deterministic;
    config.simulation.duration = 1800.0;

    let mut simulator = RestroomSimulator::new(config).unwrap();
    let output = simulator.run().unwrap();

    // AA100 deplanes at G1 from 600 s; at 700 s one men's section carries it
    let step = 70;
    let busy: Vec<&SectionId> = output
        .sections
        .iter()
        .filter(|(id, s)| id.gender == Gender::Male && s.arrival_rate[step] > 0.0)
        .map(|(id, _)| id)
        .collect();
    assert_eq!(busy.len(), 1);

    let total_male: f64 = output
        .sections
        .iter()
        .filter(|(id, _)| id.gender == Gender::Male)
        .map(|(_, s)| s.arrival_rate[step])
        .sum();
    // 150 pax over 600 s, half of them use a restroom, half of those are men
    assert!((total_male - 0.0625).abs() < 1e-9);
}

/// The default terminal produces consistent run-level outputs
#[test]
fn test_default_terminal_outputs() {
    let mut config = TerminalConfig::default();
    config.simulation.seed = Some(7);
    let mut simulator = RestroomSimulator::new(config).unwrap();
    let output = simulator.run().unwrap();

    assert_eq!(output.seed, Some(7));
    assert_eq!(output.sections.len(), 6);
    assert_eq!(output.movement_summary.total_pairs, 9);
    assert_eq!(output.flight_summary.total_flights, 2);
    assert_eq!(output.flight_summary.boarding_flights, 1);

    let statistics = &output.statistics;
    assert!(statistics.total_passengers > 0.0);
    assert_eq!(statistics.time_steps, 720);
    assert!(statistics.peak_queue_section.is_some());
    let summary = statistics.generate_summary_report();
    assert!(summary.contains("=== Restroom Simulation Summary ==="));

    let json = serde_json::to_string(&output).unwrap();
    assert!(json.contains("\"R1-M\""));

    let demand = output.demand_snapshot();
    assert!(demand.has_arrival_data());
    assert_eq!(demand.waiting_times.len(), 6);
}

/// Re-running starts from empty queues and reproduces the series
#[test]
fn test_rerun_is_reproducible() {
    let mut simulator = RestroomSimulator::new(single_restroom_config()).unwrap();
    let first = simulator.run().unwrap();
    let second = simulator.run().unwrap();
    assert_eq!(first.sections, second.sections);
    assert_ne!(first.run_id, second.run_id);
}
