//! Key performance indicators of a cleaning crew run
//!
//! All indicators are computed from the crew and task state at the moment of
//! the snapshot, so a timeline of snapshots shows how cost, responsiveness
//! and service quality evolve over the horizon.

use super::{CleaningTask, CrewMember};
use crate::simulation::TimeManager;
use crate::types::{CleaningType, CrewConfig, CrewId, RestroomId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Indicator values at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSnapshot<T = f64> {
    /// Snapshot time
    pub time: T,
    /// Labor, overtime, supply and restock cost so far
    pub total_cost: f64,
    /// Mean creation-to-completion time of urgent tasks, minutes
    pub avg_response_time: f64,
    /// Passenger satisfaction, 0 to 100
    pub passenger_satisfaction: f64,
    /// Busy share of on-shift crew, percent
    pub crew_utilization: f64,
    /// Mean creation-to-completion time of emergencies, minutes
    pub emergency_response_time: f64,
    /// Completed share of created tasks, percent
    pub task_completion_rate: f64,
    /// Overtime hours across the crew
    pub overtime_hours: f64,
    /// Cleaning quality, 0 to 100
    pub cleaning_quality_score: f64,
    /// Summed disruption cost of executed tasks
    pub disruption_cost: f64,
    /// Mean capacity reduction of executed tasks, percent
    pub avg_capacity_reduction: f64,
}

impl KpiSnapshot {
    /// Convert the snapshot time to absolute time
    pub fn at_utc(&self, clock: &TimeManager) -> KpiSnapshot<chrono::DateTime<chrono::Utc>> {
        KpiSnapshot {
            time: clock.to_utc(self.time),
            total_cost: self.total_cost,
            avg_response_time: self.avg_response_time,
            passenger_satisfaction: self.passenger_satisfaction,
            crew_utilization: self.crew_utilization,
            emergency_response_time: self.emergency_response_time,
            task_completion_rate: self.task_completion_rate,
            overtime_hours: self.overtime_hours,
            cleaning_quality_score: self.cleaning_quality_score,
            disruption_cost: self.disruption_cost,
            avg_capacity_reduction: self.avg_capacity_reduction,
        }
    }
}

/// Cost split by source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Regular-time labor
    pub labor_cost: f64,
    /// Overtime labor
    pub overtime_cost: f64,
    /// Consumables of completed cleanings
    pub supply_cost: f64,
    /// Surcharge on priority 4 and 5 tasks
    pub emergency_cost: f64,
    /// Restock trips
    pub restock_cost: f64,
}

/// Per-crew-member results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewPerformance {
    /// Display name
    pub name: String,
    /// Completed tasks the crew member worked on
    pub tasks_completed: usize,
    /// Credited cleaning hours
    pub total_work_time_hours: f64,
    /// Mean estimated duration of completed tasks, minutes
    pub avg_task_duration: f64,
    /// Completed tasks of priority 4 or 5
    pub emergency_tasks: usize,
    /// Efficiency, 0 to 100
    pub efficiency_score: f64,
}

/// Completion figures of one task type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskTypeSummary {
    /// Created tasks
    pub total: usize,
    /// Completed tasks
    pub completed: usize,
    /// Completed share, percent
    pub completion_rate: f64,
}

/// Task statistics over the run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    /// Created tasks
    pub total_tasks: usize,
    /// Completed tasks
    pub completed_tasks: usize,
    /// Completed share, percent
    pub overall_completion_rate: f64,
    /// Figures by task type name
    pub task_types: BTreeMap<String, TaskTypeSummary>,
    /// Mean passenger impact at task creation
    pub avg_passenger_impact: f64,
    /// Usage-triggered tasks created
    pub usage_based_cleanings: usize,
    /// Call-ins created
    pub real_time_call_ins: usize,
    /// Emergencies created
    pub emergency_responses: usize,
    /// Tasks that lost their crew to an urgent task
    pub preempted_tasks: usize,
    /// Passengers counted since each restroom's last cleaning
    pub total_restroom_usage: f64,
    /// Restrooms above 80% of the usage threshold
    pub restrooms_needing_attention: usize,
}

/// Everything the indicators are computed from
#[derive(Debug, Clone, Copy)]
pub struct KpiInputs<'a> {
    /// Crew state
    pub crew: &'a [CrewMember],
    /// All tasks created so far
    pub tasks: &'a [CleaningTask],
    /// Crew configuration
    pub config: &'a CrewConfig,
    /// Horizon length in seconds
    pub duration: f64,
    /// Restock cost accrued so far
    pub restock_cost: f64,
    /// Usage since the last cleaning, per restroom
    pub usage: &'a BTreeMap<RestroomId, f64>,
}

impl<'a> KpiInputs<'a> {
    fn days(&self) -> f64 {
        TimeManager::days(self.duration)
    }

    fn crew_member(&self, id: CrewId) -> Option<&'a CrewMember> {
        self.crew.iter().find(|c| c.id == id)
    }

    fn completed(&self) -> impl Iterator<Item = &'a CleaningTask> + 'a {
        self.tasks.iter().filter(|t| !t.is_open())
    }

    fn avg_team_skill(&self, task: &CleaningTask) -> Option<f64> {
        let skills: Vec<f64> =
            task.assigned_crew.iter().filter_map(|&id| self.crew_member(id)).map(|c| c.skill_level).collect();
        if skills.is_empty() {
            None
        } else {
            Some(skills.iter().sum::<f64>() / skills.len() as f64)
        }
    }

    /// Indicator values at `now`
    pub fn snapshot(&self, now: f64) -> KpiSnapshot {
        let completed: Vec<&CleaningTask> = self.completed().collect();
        let executed: Vec<&CleaningTask> = self.tasks.iter().filter(|t| !t.assigned_crew.is_empty()).collect();

        KpiSnapshot {
            time: now,
            total_cost: self.total_cost(),
            avg_response_time: mean_response_minutes(completed.iter().copied().filter(|t| t.cleaning_type.is_urgent())),
            passenger_satisfaction: self.passenger_satisfaction(&completed),
            crew_utilization: self.crew_utilization(now),
            emergency_response_time: mean_response_minutes(
                completed.iter().copied().filter(|t| t.cleaning_type == CleaningType::Emergency),
            ),
            task_completion_rate: if self.tasks.is_empty() {
                100.0
            } else {
                completed.len() as f64 / self.tasks.len() as f64 * 100.0
            },
            overtime_hours: self.crew.iter().map(|c| c.overtime_hours(self.days())).sum(),
            cleaning_quality_score: self.cleaning_quality(&completed),
            disruption_cost: self.tasks.iter().map(|t| t.disruption_cost).sum(),
            avg_capacity_reduction: if executed.is_empty() {
                0.0
            } else {
                executed.iter().map(|t| t.capacity_reduction).sum::<f64>() / executed.len() as f64 * 100.0
            },
        }
    }

    fn total_cost(&self) -> f64 {
        let costs = self.cost_breakdown();
        costs.labor_cost + costs.overtime_cost + costs.supply_cost + costs.restock_cost
    }

    fn passenger_satisfaction(&self, completed: &[&CleaningTask]) -> f64 {
        if completed.is_empty() {
            return 85.0;
        }
        let scores: Vec<f64> = completed
            .iter()
            .map(|task| {
                let mut score = 85.0;
                if let (Some(done), Some(deadline)) = (task.completion_time, task.deadline) {
                    if done > deadline {
                        let delay_minutes = (done - deadline) / 60.0;
                        score -= (delay_minutes * 2.0).min(40.0);
                    }
                }
                if let Some(skill) = self.avg_team_skill(task) {
                    score += (skill - 1.0) * 10.0;
                }
                score.clamp(0.0, 100.0)
            })
            .collect();
        scores.iter().sum::<f64>() / scores.len() as f64
    }

    fn crew_utilization(&self, now: f64) -> f64 {
        let on_shift: Vec<&CrewMember> = self.crew.iter().filter(|c| c.is_on_shift(now)).collect();
        if on_shift.is_empty() {
            return 0.0;
        }
        let busy = on_shift.iter().filter(|c| c.status.is_busy()).count();
        busy as f64 / on_shift.len() as f64 * 100.0
    }

    fn cleaning_quality(&self, completed: &[&CleaningTask]) -> f64 {
        if completed.is_empty() {
            return 80.0;
        }
        let routine_minutes = self.config.cleaning_durations.routine;
        let scores: Vec<f64> = completed
            .iter()
            .map(|task| {
                let skill = self.avg_team_skill(task).unwrap_or(1.5);
                let mut score = 60.0 + skill * 20.0;
                if task.cleaning_type == CleaningType::Routine && task.estimated_duration >= routine_minutes {
                    score += 5.0;
                }
                score.min(100.0)
            })
            .collect();
        scores.iter().sum::<f64>() / scores.len() as f64
    }

    /// Cost split by source
    pub fn cost_breakdown(&self) -> CostBreakdown {
        let costs = &self.config.cost_parameters;
        let supply_unit = costs.supply_cost_per_cleaning;
        let (labor_cost, overtime_cost) = self
            .crew
            .iter()
            .map(|c| c.labor_cost(self.days(), costs.overtime_multiplier))
            .fold((0.0, 0.0), |(l, o), (cl, co)| (l + cl, o + co));
        let completed = self.completed().count() as f64;
        let urgent_completed = self.completed().filter(|t| t.is_high_priority()).count() as f64;

        CostBreakdown {
            labor_cost,
            overtime_cost,
            supply_cost: completed * supply_unit,
            emergency_cost: urgent_completed * supply_unit * costs.emergency_cost_multiplier,
            restock_cost: self.restock_cost,
        }
    }

    /// Results for every crew member
    pub fn crew_performance(&self) -> BTreeMap<CrewId, CrewPerformance> {
        let days = self.days();
        self.crew
            .iter()
            .map(|crew| {
                let done: Vec<&CleaningTask> =
                    self.completed().filter(|t| t.assigned_crew.contains(&crew.id)).collect();
                let emergency_tasks = done.iter().filter(|t| t.is_high_priority()).count();
                let avg_task_duration = if done.is_empty() {
                    0.0
                } else {
                    done.iter().map(|t| t.estimated_duration).sum::<f64>() / done.len() as f64
                };
                let efficiency_score = if done.is_empty() {
                    0.0
                } else {
                    (crew.skill_level * 30.0 + done.len() as f64 * 2.0 + emergency_tasks as f64 * 5.0
                        - crew.overtime_hours(days) * 3.0)
                        .clamp(0.0, 100.0)
                };
                (
                    crew.id,
                    CrewPerformance {
                        name: crew.name.clone(),
                        tasks_completed: done.len(),
                        total_work_time_hours: crew.hours_worked(),
                        avg_task_duration,
                        emergency_tasks,
                        efficiency_score,
                    },
                )
            })
            .collect()
    }

    /// Task statistics
    pub fn task_summary(&self) -> TaskSummary {
        let total_tasks = self.tasks.len();
        let completed_tasks = self.completed().count();
        let rate = |done: usize, total: usize| if total == 0 { 0.0 } else { done as f64 / total as f64 * 100.0 };

        let mut task_types = BTreeMap::new();
        for cleaning_type in CleaningType::ALL {
            let of_type = self.tasks.iter().filter(|t| t.cleaning_type == cleaning_type);
            let total = of_type.clone().count();
            if total == 0 {
                continue;
            }
            let completed = of_type.filter(|t| !t.is_open()).count();
            task_types.insert(
                cleaning_type.to_string(),
                TaskTypeSummary { total, completed, completion_rate: rate(completed, total) },
            );
        }

        let count = |ct: CleaningType| self.tasks.iter().filter(|t| t.cleaning_type == ct).count();
        let attention_level = self.config.usage_threshold * 0.8;

        TaskSummary {
            total_tasks,
            completed_tasks,
            overall_completion_rate: rate(completed_tasks, total_tasks),
            task_types,
            avg_passenger_impact: if total_tasks == 0 {
                0.0
            } else {
                self.tasks.iter().map(|t| t.passenger_impact).sum::<f64>() / total_tasks as f64
            },
            usage_based_cleanings: count(CleaningType::UsageBased),
            real_time_call_ins: count(CleaningType::CallIn),
            emergency_responses: count(CleaningType::Emergency),
            preempted_tasks: self.tasks.iter().filter(|t| t.was_preempted).count(),
            total_restroom_usage: self.usage.values().sum(),
            restrooms_needing_attention: self.usage.values().filter(|&&u| u > attention_level).count(),
        }
    }
}

fn mean_response_minutes<'a>(tasks: impl Iterator<Item = &'a CleaningTask>) -> f64 {
    let responses: Vec<f64> = tasks
        .filter(|t| t.created_time > 0.0)
        .filter_map(|t| t.completion_time.map(|done| (done - t.created_time) / 60.0))
        .collect();
    if responses.is_empty() {
        0.0
    } else {
        responses.iter().sum::<f64>() / responses.len() as f64
    }
}
