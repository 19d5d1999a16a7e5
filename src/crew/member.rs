//! Cleaning crew members and their mutable working state

use crate::simulation::TimeManager;
use crate::types::{CrewId, CrewMemberSpec, CrewStatus, LocationId, TaskId};
use serde::{Deserialize, Serialize};

/// Full supply level a restock trip brings a crew member back to
pub const FULL_SUPPLIES: f64 = 100.0;

/// A crew member as the optimizer tracks them through a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    /// Crew identifier
    pub id: CrewId,
    /// Display name
    pub name: String,
    /// Current activity
    pub status: CrewStatus,
    /// Restroom, base or depot the crew member is at or heading to
    pub current_location: LocationId,
    /// Daily shift start, seconds after midnight
    pub shift_start: f64,
    /// Daily shift end, seconds after midnight
    pub shift_end: f64,
    /// Hourly wage
    pub hourly_rate: f64,
    /// Skill multiplier
    pub skill_level: f64,
    /// Whether emergencies may be assigned
    pub emergency_capable: bool,
    /// Remaining supplies, 0 to 100
    pub supplies_remaining: f64,
    /// Task being worked on, if any
    pub current_task: Option<TaskId>,
    /// When the travel leg of the current task ends
    pub travel_end_time: f64,
    /// When the current task or restock trip ends, 0 when idle
    pub current_task_end_time: f64,
    /// Accumulated cleaning time in minutes
    pub total_work_time: f64,
    /// Start of the most recent restock trip
    pub last_restock_time: f64,
}

impl CrewMember {
    /// Create an idle, fully supplied crew member at their base
    pub fn from_spec(id: CrewId, spec: &CrewMemberSpec) -> Self {
        Self {
            id,
            name: spec.name.clone(),
            status: CrewStatus::Idle,
            current_location: spec.base_location.clone(),
            shift_start: spec.shift_start_hours * 3600.0,
            shift_end: spec.shift_end_hours * 3600.0,
            hourly_rate: spec.hourly_rate,
            skill_level: spec.skill_level,
            emergency_capable: spec.emergency_capable,
            supplies_remaining: FULL_SUPPLIES,
            current_task: None,
            travel_end_time: 0.0,
            current_task_end_time: 0.0,
            total_work_time: 0.0,
            last_restock_time: 0.0,
        }
    }

    /// Whether `now` falls inside the repeating daily shift, bounds included
    pub fn is_on_shift(&self, now: f64) -> bool {
        let time_of_day = TimeManager::seconds_of_day(now);
        self.shift_start <= time_of_day && time_of_day <= self.shift_end
    }

    /// On shift and not tied up by unfinished work
    pub fn is_available(&self, now: f64) -> bool {
        if !self.is_on_shift(now) {
            return false;
        }
        let occupied = matches!(self.status, CrewStatus::Cleaning | CrewStatus::Traveling | CrewStatus::Break);
        !(occupied && self.current_task_end_time > now)
    }

    /// Hours of cleaning work credited so far
    pub fn hours_worked(&self) -> f64 {
        self.total_work_time / 60.0
    }

    /// Scheduled hours over a horizon of `days` days
    pub fn scheduled_hours(&self, days: f64) -> f64 {
        (self.shift_end - self.shift_start) / 3600.0 * days
    }

    /// Hours worked beyond the schedule
    pub fn overtime_hours(&self, days: f64) -> f64 {
        (self.hours_worked() - self.scheduled_hours(days)).max(0.0)
    }

    /// Labor cost split into regular and overtime pay
    pub fn labor_cost(&self, days: f64, overtime_multiplier: f64) -> (f64, f64) {
        let worked = self.hours_worked();
        let scheduled = self.scheduled_hours(days);
        if worked <= scheduled {
            (worked * self.hourly_rate, 0.0)
        } else {
            (scheduled * self.hourly_rate, (worked - scheduled) * self.hourly_rate * overtime_multiplier)
        }
    }
}
