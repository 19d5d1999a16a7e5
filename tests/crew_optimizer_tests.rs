//! Scenario tests for the cleaning crew optimizer
//!
//! One restroom, 60-second steps and hand-traced timelines: call-ins,
//! emergencies, preemption, restocking, usage-triggered cleaning and
//! incomplete travel data.

use airport_facility_sim::crew::{CleaningRequirement, DemandSnapshot, RestroomCapacity, TravelTimeMatrix};
use airport_facility_sim::types::CrewMemberSpec;
use airport_facility_sim::*;
use std::collections::BTreeMap;

const DT: f64 = 60.0;

fn restrooms() -> BTreeMap<RestroomId, RestroomCapacity> {
    let mut restrooms = BTreeMap::new();
    restrooms.insert(RestroomId::new("R1"), RestroomCapacity { floor: 1, capacity_m: 0.2, capacity_f: 0.2 });
    restrooms
}

fn travel() -> TravelTimeMatrix {
    let mut travel = TravelTimeMatrix::new();
    travel.insert_symmetric("Base_1", "R1", 60.0);
    travel.insert_symmetric("Base_2", "R1", 60.0);
    travel.insert_symmetric("Base_1", "Base_2", 90.0);
    travel
}

fn solo_crew() -> CrewConfig {
    let mut config = CrewConfig::default();
    config.crew_members = vec![CrewMemberSpec {
        name: "Dana Reyes".to_string(),
        shift_start_hours: 0.0,
        shift_end_hours: 8.0,
        skill_level: 1.5,
        hourly_rate: 20.0,
        base_location: LocationId::new("Base_1"),
        emergency_capable: true,
    }];
    config
}

fn optimizer(duration: f64, config: CrewConfig) -> CleaningCrewOptimizer {
    CleaningCrewOptimizer::new(restrooms(), travel(), duration, DT, config).unwrap()
}

/// Men's waiting times at R1 with the given spikes, zero elsewhere
fn spikes(n_steps: usize, spikes: &[(usize, f64)]) -> DemandSnapshot {
    let mut waits = vec![0.0; n_steps];
    for &(index, value) in spikes {
        waits[index] = value;
    }
    let mut waiting_times = BTreeMap::new();
    waiting_times.insert(SectionId::new(RestroomId::new("R1"), Gender::Male), waits);
    DemandSnapshot::from_waiting_times(waiting_times)
}

fn urgent(results: &OptimizationResults) -> Vec<&airport_facility_sim::crew::TaskRecord> {
    results.tasks.iter().filter(|t| t.priority >= 3).collect()
}

/// A 90-second wait creates one priority 4 call-in, staffed at once
#[test]
fn test_call_in_from_waiting_spike() {
    let optimizer = optimizer(3600.0, CrewConfig::default());
    let results = optimizer.run_optimization(&spikes(60, &[(5, 90.0)]), &[]).unwrap();

    let tasks = urgent(&results);
    assert_eq!(tasks.len(), 1);
    let task = tasks[0];
    assert_eq!(task.cleaning_type, CleaningType::CallIn);
    assert_eq!(task.priority, 4);
    assert_eq!(task.created_time, 300.0);
    assert_eq!(task.deadline, Some(3900.0));
    assert_eq!(task.assigned_crew.len(), 1);
    // 60 s travel plus 20 minutes of cleaning
    assert_eq!(task.completion_time, Some(1560.0));

    assert_eq!(results.task_summary.real_time_call_ins, 1);
    assert_eq!(results.task_completions.len(), 1);
    assert_eq!(results.crew_assignments[0].time, 300.0);
}

/// A second spike while the call-in is still open is suppressed
#[test]
fn test_duplicate_call_in_suppressed() {
    let optimizer = optimizer(3600.0, CrewConfig::default());
    let results = optimizer.run_optimization(&spikes(60, &[(5, 90.0), (10, 90.0)]), &[]).unwrap();
    assert_eq!(urgent(&results).len(), 1);
}

/// Threshold bands map waits to task types and priorities
#[test]
fn test_urgency_bands() {
    for (wait, cleaning_type, priority) in [
        (45.0, CleaningType::CallIn, 3),
        (90.0, CleaningType::CallIn, 4),
        (150.0, CleaningType::Emergency, 5),
    ] {
        let optimizer = optimizer(3600.0, CrewConfig::default());
        let results = optimizer.run_optimization(&spikes(60, &[(2, wait)]), &[]).unwrap();
        let tasks = urgent(&results);
        assert_eq!(tasks.len(), 1, "wait {}", wait);
        assert_eq!(tasks[0].cleaning_type, cleaning_type);
        assert_eq!(tasks[0].priority, priority);
    }

    // exactly on a threshold does not trigger
    let optimizer = optimizer(3600.0, CrewConfig::default());
    let results = optimizer.run_optimization(&spikes(60, &[(2, 30.0)]), &[]).unwrap();
    assert!(results.tasks.is_empty());
}

/// An emergency gets the emergency deadline window
#[test]
fn test_emergency_deadline() {
    let optimizer = optimizer(3600.0, CrewConfig::default());
    let results = optimizer.run_optimization(&spikes(60, &[(2, 150.0)]), &[]).unwrap();
    let task = urgent(&results)[0];
    assert_eq!(task.created_time, 120.0);
    assert_eq!(task.deadline, Some(1920.0));
    assert_eq!(results.task_summary.emergency_responses, 1);
    assert!(results.cost_breakdown.emergency_cost > 0.0);
}

/// Urgent work pulls the only crew member off a routine cleaning
#[test]
fn test_preemption_defers_routine_task() {
    let optimizer = optimizer(3600.0, solo_crew());
    let requirements = [CleaningRequirement::new("R1", 1)];
    let results = optimizer.run_optimization(&spikes(60, &[(5, 90.0)]), &requirements).unwrap();

    let routine = results.tasks.iter().find(|t| t.cleaning_type == CleaningType::Routine).unwrap();
    assert!(routine.was_preempted);
    // deferred to 300 + 1800, deadline untouched
    assert_eq!(routine.required_time, 2100.0);
    assert_eq!(routine.deadline, Some(3600.0));
    assert_eq!(routine.completion_time, Some(2400.0));

    let call_in = urgent(&results)[0];
    assert_eq!(call_in.assigned_crew, vec![CrewId(1)]);
    // already on site, 20 minutes of cleaning
    assert_eq!(call_in.completion_time, Some(1500.0));

    assert_eq!(results.task_summary.preempted_tasks, 1);
    assert_eq!(results.task_summary.completed_tasks, 2);

    // the interrupted interval is cut at the preemption time
    let schedule = &results.crew_schedules[&CrewId(1)];
    assert_eq!(schedule[0].task_id, Some(routine.id));
    assert_eq!(schedule[0].end, 300.0);
}

/// A second high-priority call-in waits for the busy crew member instead of taking them
#[test]
fn test_busy_crew_not_taken_for_equal_priority() {
    let mut restrooms = restrooms();
    restrooms.insert(RestroomId::new("R2"), RestroomCapacity { floor: 1, capacity_m: 0.2, capacity_f: 0.2 });
    let mut travel = travel();
    travel.insert_symmetric("Base_1", "R2", 60.0);
    travel.insert_symmetric("Base_2", "R2", 60.0);
    travel.insert_symmetric("R1", "R2", 60.0);
    let optimizer = CleaningCrewOptimizer::new(restrooms, travel, 3600.0, DT, solo_crew()).unwrap();

    let mut r1 = vec![0.0; 60];
    r1[5] = 90.0;
    let mut r2 = vec![0.0; 60];
    r2[6] = 90.0;
    let mut waiting_times = BTreeMap::new();
    waiting_times.insert(SectionId::new(RestroomId::new("R1"), Gender::Male), r1);
    waiting_times.insert(SectionId::new(RestroomId::new("R2"), Gender::Male), r2);
    let results = optimizer.run_optimization(&DemandSnapshot::from_waiting_times(waiting_times), &[]).unwrap();

    let tasks = urgent(&results);
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].completion_time, Some(1560.0));
    assert!(!tasks[0].was_preempted);
    // staffed once the crew member frees up at 1560, one minute from R1
    assert_eq!(tasks[1].created_time, 360.0);
    assert_eq!(tasks[1].completion_time, Some(2820.0));
    assert_eq!(results.task_summary.preempted_tasks, 0);
    assert_eq!(results.crew_assignments.iter().map(|a| a.time).collect::<Vec<_>>(), vec![300.0, 1560.0]);
}

/// Running low on supplies sends the crew member to the depot
#[test]
fn test_restock_after_supplies_run_low() {
    let mut config = solo_crew();
    config.supply_management.supplies_per_cleaning = 60.0;
    let optimizer = optimizer(3600.0, config);
    let results = optimizer.run_optimization(&DemandSnapshot::default(), &[CleaningRequirement::new("R1", 1)]).unwrap();

    let restocks: Vec<_> = results.crew_schedules[&CrewId(1)].iter().filter(|e| e.task_id.is_none()).collect();
    assert_eq!(restocks.len(), 1);
    // R1 to Base_2, ten minutes at the depot, back to R1
    assert_eq!(restocks[0].start, 960.0);
    assert_eq!(restocks[0].end, 1680.0);
    assert_eq!(restocks[0].status, CrewStatus::Traveling);
    assert_eq!(results.cost_breakdown.restock_cost, 25.0);
}

/// Accumulated passenger usage triggers a single usage-based cleaning
#[test]
fn test_usage_based_cleaning() {
    let n_steps = 40;
    let mut demand = DemandSnapshot::default();
    demand.arrival_rates.insert(SectionId::new(RestroomId::new("R1"), Gender::Male), vec![0.125; n_steps]);

    let optimizer = optimizer(n_steps as f64 * DT, CrewConfig::default());
    let results = optimizer.run_optimization(&demand, &[]).unwrap();

    let usage = results.tasks_of_type(CleaningType::UsageBased);
    assert_eq!(usage.len(), 1);
    // 7.5 passengers per step reach 150 at step 19
    assert_eq!(usage[0].created_time, 1140.0);
    assert_eq!(usage[0].priority, 2);
    assert_eq!(usage[0].completion_time, Some(2100.0));
    assert_eq!(results.task_summary.usage_based_cleanings, 1);
}

/// A missing travel time aborts the run with an unrecoverable error
#[test]
fn test_missing_travel_time_is_fatal() {
    let mut travel = TravelTimeMatrix::new();
    travel.insert_symmetric("Base_2", "R1", 60.0);
    let optimizer = CleaningCrewOptimizer::new(restrooms(), travel, 3600.0, DT, CrewConfig::default()).unwrap();

    let err = optimizer.run_optimization(&DemandSnapshot::default(), &[CleaningRequirement::new("R1", 1)]).unwrap_err();
    match &err {
        SimulationError::MissingTravelTime { from, to } => {
            assert_eq!(from, &LocationId::new("Base_1"));
            assert_eq!(to, &LocationId::new("R1"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(!err.is_recoverable());
}

/// Indicators are taken hourly plus once at the horizon end
#[test]
fn test_kpi_timeline_and_export() {
    let optimizer = optimizer(3600.0, CrewConfig::default());
    let results = optimizer.run_optimization(&spikes(60, &[(5, 90.0)]), &[]).unwrap();

    let times: Vec<f64> = results.kpi_timeline.iter().map(|k| k.time).collect();
    assert_eq!(times, vec![0.0, 3600.0]);
    assert_eq!(results.final_kpis.time, 3600.0);
    assert_eq!(results.total_time_steps, 60);
    assert!(results.final_kpis.total_cost > 0.0);

    let clock = optimizer.time_manager().unwrap();
    let exported = results.export(&clock);
    assert_eq!(exported.tasks[0].created_time, clock.to_utc(300.0));
    assert_eq!(exported.final_kpis.time.to_rfc3339(), "2024-01-01T01:00:00+00:00");

    let json = results.to_json(&clock).unwrap();
    assert!(json.contains("2024-01-01T00:05:00Z"));
}

/// Requirements for unknown restrooms are skipped, not fatal
#[test]
fn test_unknown_requirement_skipped() {
    let optimizer = optimizer(3600.0, CrewConfig::default());
    let results = optimizer
        .run_optimization(&DemandSnapshot::default(), &[CleaningRequirement::new("R9", 3)])
        .unwrap();
    assert!(results.tasks.is_empty());
    assert_eq!(results.task_summary.total_tasks, 0);
}
