//! Optimization results and their export to absolute time
//!
//! Results are produced in simulation seconds. [`OptimizationResults::export`]
//! converts every timestamp to UTC using the run's [`TimeManager`], which is
//! what the CLI writes out.

use super::kpi::{CostBreakdown, CrewPerformance, KpiSnapshot, TaskSummary};
use super::CleaningTask;
use crate::simulation::TimeManager;
use crate::types::{CleaningType, CrewId, CrewStatus, RestroomId, RunId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One interval of a crew member's timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEvent<T = f64> {
    /// Interval start
    pub start: T,
    /// Interval end
    pub end: T,
    /// Task worked on, `None` for restock trips
    pub task_id: Option<TaskId>,
    /// Restroom worked at, `None` for restock trips
    pub restroom_id: Option<RestroomId>,
    /// Activity during the interval
    pub status: CrewStatus,
}

/// Crew dispatched at one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord<T = f64> {
    /// Step time
    pub time: T,
    /// Crew per task
    pub assignments: BTreeMap<TaskId, Vec<CrewId>>,
}

/// A finished task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCompletion<T = f64> {
    /// Completion time
    pub time: T,
    /// Completed task
    pub task_id: TaskId,
    /// Restroom cleaned
    pub restroom_id: RestroomId,
    /// Task category
    pub cleaning_type: CleaningType,
    /// Crew that finished it
    pub crew: Vec<CrewId>,
}

/// Final state of a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord<T = f64> {
    /// Task identifier
    pub id: TaskId,
    /// Restroom
    pub restroom_id: RestroomId,
    /// Task category
    pub cleaning_type: CleaningType,
    /// Priority, 1 to 5
    pub priority: u8,
    /// Creation time
    pub created_time: T,
    /// Earliest intended start
    pub required_time: T,
    /// Latest intended completion
    pub deadline: Option<T>,
    /// Completion time, `None` if never completed
    pub completion_time: Option<T>,
    /// Crew assigned at the end of the run
    pub assigned_crew: Vec<CrewId>,
    /// Passenger impact score
    pub passenger_impact: f64,
    /// Disruption cost
    pub disruption_cost: f64,
    /// Whether the task lost its crew to an urgent task
    pub was_preempted: bool,
}

impl From<&CleaningTask> for TaskRecord {
    fn from(task: &CleaningTask) -> Self {
        Self {
            id: task.id,
            restroom_id: task.restroom_id.clone(),
            cleaning_type: task.cleaning_type,
            priority: task.priority,
            created_time: task.created_time,
            required_time: task.required_time,
            deadline: task.deadline,
            completion_time: task.completion_time,
            assigned_crew: task.assigned_crew.clone(),
            passenger_impact: task.passenger_impact,
            disruption_cost: task.disruption_cost,
            was_preempted: task.was_preempted,
        }
    }
}

/// Complete output of a crew optimization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResults<T = f64> {
    /// Run identifier
    pub run_id: RunId,
    /// Hourly indicator snapshots plus one at the horizon end
    pub kpi_timeline: Vec<KpiSnapshot<T>>,
    /// Crew dispatched per step
    pub crew_assignments: Vec<AssignmentRecord<T>>,
    /// Tasks in completion order
    pub task_completions: Vec<TaskCompletion<T>>,
    /// Indicators at the horizon end
    pub final_kpis: KpiSnapshot<T>,
    /// Cost split by source
    pub cost_breakdown: CostBreakdown,
    /// Per-crew-member results
    pub crew_performance: BTreeMap<CrewId, CrewPerformance>,
    /// Task statistics
    pub task_summary: TaskSummary,
    /// Every task created during the run
    pub tasks: Vec<TaskRecord<T>>,
    /// Timeline of every crew member
    pub crew_schedules: BTreeMap<CrewId, Vec<ScheduleEvent<T>>>,
    /// Horizon length in seconds
    pub simulation_duration: f64,
    /// Step length in seconds
    pub simulation_dt: f64,
    /// Steps executed
    pub total_time_steps: usize,
}

impl OptimizationResults {
    /// Convert every timestamp to UTC
    pub fn export(&self, clock: &TimeManager) -> OptimizationResults<DateTime<Utc>> {
        let at = |t: f64| clock.to_utc(t);

        OptimizationResults {
            run_id: self.run_id,
            kpi_timeline: self.kpi_timeline.iter().map(|k| k.at_utc(clock)).collect(),
            crew_assignments: self
                .crew_assignments
                .iter()
                .map(|a| AssignmentRecord { time: at(a.time), assignments: a.assignments.clone() })
                .collect(),
            task_completions: self
                .task_completions
                .iter()
                .map(|c| TaskCompletion {
                    time: at(c.time),
                    task_id: c.task_id,
                    restroom_id: c.restroom_id.clone(),
                    cleaning_type: c.cleaning_type,
                    crew: c.crew.clone(),
                })
                .collect(),
            final_kpis: self.final_kpis.at_utc(clock),
            cost_breakdown: self.cost_breakdown.clone(),
            crew_performance: self.crew_performance.clone(),
            task_summary: self.task_summary.clone(),
            tasks: self
                .tasks
                .iter()
                .map(|t| TaskRecord {
                    id: t.id,
                    restroom_id: t.restroom_id.clone(),
                    cleaning_type: t.cleaning_type,
                    priority: t.priority,
                    created_time: at(t.created_time),
                    required_time: at(t.required_time),
                    deadline: t.deadline.map(at),
                    completion_time: t.completion_time.map(at),
                    assigned_crew: t.assigned_crew.clone(),
                    passenger_impact: t.passenger_impact,
                    disruption_cost: t.disruption_cost,
                    was_preempted: t.was_preempted,
                })
                .collect(),
            crew_schedules: self
                .crew_schedules
                .iter()
                .map(|(id, events)| {
                    let events = events
                        .iter()
                        .map(|e| ScheduleEvent {
                            start: at(e.start),
                            end: at(e.end),
                            task_id: e.task_id,
                            restroom_id: e.restroom_id.clone(),
                            status: e.status,
                        })
                        .collect();
                    (*id, events)
                })
                .collect(),
            simulation_duration: self.simulation_duration,
            simulation_dt: self.simulation_dt,
            total_time_steps: self.total_time_steps,
        }
    }

    /// Tasks of one category
    pub fn tasks_of_type(&self, cleaning_type: CleaningType) -> Vec<&TaskRecord> {
        self.tasks.iter().filter(|t| t.cleaning_type == cleaning_type).collect()
    }

    /// Write the exported results as pretty JSON
    pub fn to_json(&self, clock: &TimeManager) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.export(clock))
    }
}
