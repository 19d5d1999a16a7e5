//! Cleaning tasks

use crate::types::{CleaningType, CrewId, RestroomId, TaskId};
use serde::{Deserialize, Serialize};

/// One cleaning job at one restroom
///
/// The category is carried by `cleaning_type`; task ids are opaque sequence
/// numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningTask {
    /// Task identifier
    pub id: TaskId,
    /// Restroom to clean
    pub restroom_id: RestroomId,
    /// Task category
    pub cleaning_type: CleaningType,
    /// 1 (lowest) to 5 (highest)
    pub priority: u8,
    /// Single-cleaner duration in minutes
    pub estimated_duration: f64,
    /// Earliest intended start, simulation seconds
    pub required_time: f64,
    /// Latest intended completion, simulation seconds
    pub deadline: Option<f64>,
    /// When the task was created
    pub created_time: f64,
    /// Crew currently assigned, empty while pending
    pub assigned_crew: Vec<CrewId>,
    /// When the last assigned crew member finished
    pub completion_time: Option<f64>,
    /// Passenger impact score, 0 to 100
    pub passenger_impact: f64,
    /// Cost of closing capacity while cleaning
    pub disruption_cost: f64,
    /// Share of restroom capacity removed while cleaning
    pub capacity_reduction: f64,
    /// Set when the last assigned crew member was pulled off for an urgent task
    pub was_preempted: bool,
}

impl CleaningTask {
    /// Create an unassigned task
    pub fn new(
        id: TaskId,
        restroom_id: RestroomId,
        cleaning_type: CleaningType,
        priority: u8,
        estimated_duration: f64,
        required_time: f64,
    ) -> Self {
        Self {
            id,
            restroom_id,
            cleaning_type,
            priority,
            estimated_duration,
            required_time,
            deadline: None,
            created_time: 0.0,
            assigned_crew: Vec::new(),
            completion_time: None,
            passenger_impact: 0.0,
            disruption_cost: 0.0,
            capacity_reduction: 0.0,
            was_preempted: false,
        }
    }

    /// Set the deadline
    pub fn with_deadline(mut self, deadline: f64) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the creation time
    pub fn created_at(mut self, created_time: f64) -> Self {
        self.created_time = created_time;
        self
    }

    /// Set the passenger impact score
    pub fn with_impact(mut self, passenger_impact: f64) -> Self {
        self.passenger_impact = passenger_impact;
        self
    }

    /// Not yet completed
    pub fn is_open(&self) -> bool {
        self.completion_time.is_none()
    }

    /// Open and without crew
    pub fn is_pending(&self) -> bool {
        self.is_open() && self.assigned_crew.is_empty()
    }

    /// Priority 4 and 5 tasks get deadline grace and team staffing
    pub fn is_high_priority(&self) -> bool {
        self.priority >= 4
    }
}

/// Passenger impact score, 0 to 100, from a facility's current load
///
/// Weighs arrival rate (saturating at 0.2 pax/s), queue length (saturating at
/// 10 pax) and waiting time (saturating at 600 s) 30/40/30.
pub fn passenger_impact(arrival_rate: f64, queue_length: f64, waiting_time: f64) -> f64 {
    let arrival = (arrival_rate / 0.2).min(1.0);
    let queue = (queue_length / 10.0).min(1.0);
    let wait = (waiting_time / 600.0).min(1.0);
    (0.3 * arrival + 0.4 * queue + 0.3 * wait) * 100.0
}
