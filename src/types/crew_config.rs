//! Cleaning crew configuration
//!
//! Crew roster, cleaning durations, cost coefficients, supply logistics,
//! urgency thresholds and scheduling windows for the cleaning crew optimizer.
//! Every section falls back to its default when omitted from the JSON file.

use super::config::{read_json_file, validate_non_negative, validate_positive};
use super::{CleaningType, ConfigError, ConfigValidationError, LocationId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 2024-01-01T00:00:00Z, the instant simulation second zero maps to
pub const DEFAULT_BASE_EPOCH: i64 = 1_704_067_200;

fn default_true() -> bool {
    true
}

/// One crew member as configured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMemberSpec {
    /// Display name
    pub name: String,
    /// Shift start, hours into the day
    pub shift_start_hours: f64,
    /// Shift end, hours into the day
    pub shift_end_hours: f64,
    /// Skill multiplier, 1.0 is an average cleaner
    pub skill_level: f64,
    /// Hourly wage
    pub hourly_rate: f64,
    /// Where the crew member starts the run
    pub base_location: LocationId,
    /// Whether the crew member may take emergency tasks
    #[serde(default = "default_true")]
    pub emergency_capable: bool,
}

/// Expected cleaning duration in minutes for each task type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningDurations {
    /// Routine cleaning
    pub routine: f64,
    /// Emergency cleaning
    pub emergency: f64,
    /// Call-in cleaning
    pub call_in: f64,
    /// Deep clean
    pub deep_clean: f64,
    /// Usage-triggered cleaning
    pub usage_based: f64,
}

impl Default for CleaningDurations {
    fn default() -> Self {
        Self { routine: 15.0, emergency: 25.0, call_in: 20.0, deep_clean: 45.0, usage_based: 15.0 }
    }
}

impl CleaningDurations {
    /// Duration in minutes for a task type
    pub fn minutes(&self, cleaning_type: CleaningType) -> f64 {
        match cleaning_type {
            CleaningType::Routine => self.routine,
            CleaningType::Emergency => self.emergency,
            CleaningType::CallIn => self.call_in,
            CleaningType::DeepClean => self.deep_clean,
            CleaningType::UsageBased => self.usage_based,
        }
    }
}

/// Cost coefficients used by scoring and KPI accounting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostParameters {
    /// Pay multiplier for hours beyond the scheduled shift
    pub overtime_multiplier: f64,
    /// Cost units per unit of capacity reduction at full passenger impact
    pub disruption_multiplier: f64,
    /// Share of restroom capacity removed per active cleaner
    pub capacity_reduction_per_cleaner: f64,
    /// Consumables cost per completed cleaning
    pub supply_cost_per_cleaning: f64,
    /// Multiplier on supply cost for priority 4 and 5 tasks
    pub emergency_cost_multiplier: f64,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            overtime_multiplier: 1.5,
            disruption_multiplier: 50.0,
            capacity_reduction_per_cleaner: 0.3,
            supply_cost_per_cleaning: 3.5,
            emergency_cost_multiplier: 2.0,
        }
    }
}

/// Supply consumption and restocking logistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyManagement {
    /// Where crews restock
    pub depot_location: LocationId,
    /// Supply units used by one routine cleaning (out of 100)
    pub supplies_per_cleaning: f64,
    /// Time spent at the depot in minutes
    pub restock_time_minutes: f64,
    /// Cost of one restock trip
    pub restock_cost: f64,
}

impl Default for SupplyManagement {
    fn default() -> Self {
        Self {
            depot_location: LocationId::new("Base_2"),
            supplies_per_cleaning: 15.0,
            restock_time_minutes: 10.0,
            restock_cost: 25.0,
        }
    }
}

/// Waiting-time thresholds, in seconds, that trigger reactive cleanings
///
/// A facility's worst section wait above `call_in` creates a priority 3
/// call-in, above `high_priority_call_in` a priority 4 call-in, and above
/// `emergency` a priority 5 emergency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyThresholds {
    /// Priority 3 call-in threshold
    pub call_in: f64,
    /// Priority 4 call-in threshold
    pub high_priority_call_in: f64,
    /// Priority 5 emergency threshold
    pub emergency: f64,
}

impl Default for UrgencyThresholds {
    fn default() -> Self {
        Self { call_in: 30.0, high_priority_call_in: 60.0, emergency: 120.0 }
    }
}

impl UrgencyThresholds {
    /// Classify a waiting time into a reactive task type and priority
    pub fn classify(&self, waiting_time: f64) -> Option<(CleaningType, u8)> {
        if waiting_time > self.emergency {
            Some((CleaningType::Emergency, 5))
        } else if waiting_time > self.high_priority_call_in {
            Some((CleaningType::CallIn, 4))
        } else if waiting_time > self.call_in {
            Some((CleaningType::CallIn, 3))
        } else {
            None
        }
    }
}

/// Time windows of the scheduler, all in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingWindows {
    /// Tasks become assignable this long before their required time
    pub lookahead: f64,
    /// Urgent tasks for a facility are not duplicated within this window
    pub duplicate_suppression: f64,
    /// A task whose last crew member is preempted is pushed back by this much
    pub preemption_deferral: f64,
    /// Extra deadline slack granted to priority 4 and 5 tasks
    pub deadline_grace: f64,
    /// Deadlines closer than this earn the urgency bonus
    pub urgency_bonus_window: f64,
    /// Deadline offset of routine tasks from their required time
    pub routine_deadline: f64,
    /// Deadline offset of call-ins from creation
    pub call_in_deadline: f64,
    /// Deadline offset of emergencies from creation
    pub emergency_deadline: f64,
    /// Deadline offset of usage-based tasks from creation
    pub usage_deadline: f64,
}

impl Default for SchedulingWindows {
    fn default() -> Self {
        Self {
            lookahead: 1800.0,
            duplicate_suppression: 1800.0,
            preemption_deferral: 1800.0,
            deadline_grace: 1800.0,
            urgency_bonus_window: 1800.0,
            routine_deadline: 1800.0,
            call_in_deadline: 3600.0,
            emergency_deadline: 1800.0,
            usage_deadline: 3600.0,
        }
    }
}

fn default_usage_threshold() -> f64 {
    150.0
}

fn default_base_epoch() -> i64 {
    DEFAULT_BASE_EPOCH
}

fn default_crew_members() -> Vec<CrewMemberSpec> {
    vec![
        CrewMemberSpec {
            name: "Alice Johnson".to_string(),
            shift_start_hours: 0.0,
            shift_end_hours: 8.0,
            skill_level: 1.8,
            hourly_rate: 22.0,
            base_location: LocationId::new("Base_1"),
            emergency_capable: true,
        },
        CrewMemberSpec {
            name: "Bob Smith".to_string(),
            shift_start_hours: 0.5,
            shift_end_hours: 8.5,
            skill_level: 1.5,
            hourly_rate: 19.0,
            base_location: LocationId::new("Base_2"),
            emergency_capable: true,
        },
        CrewMemberSpec {
            name: "Henry Clark".to_string(),
            shift_start_hours: 0.0,
            shift_end_hours: 5.0,
            skill_level: 2.0,
            hourly_rate: 25.0,
            base_location: LocationId::new("Base_2"),
            emergency_capable: true,
        },
    ]
}

/// Complete crew optimizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewConfig {
    /// Crew roster
    #[serde(default = "default_crew_members")]
    pub crew_members: Vec<CrewMemberSpec>,
    /// Cleaning durations by type
    #[serde(default)]
    pub cleaning_durations: CleaningDurations,
    /// Cost coefficients
    #[serde(default)]
    pub cost_parameters: CostParameters,
    /// Supply logistics
    #[serde(default)]
    pub supply_management: SupplyManagement,
    /// Reactive cleaning thresholds
    #[serde(default)]
    pub urgency: UrgencyThresholds,
    /// Scheduler time windows
    #[serde(default)]
    pub scheduling: SchedulingWindows,
    /// Passengers served since the last cleaning that trigger a usage-based task
    #[serde(default = "default_usage_threshold")]
    pub usage_threshold: f64,
    /// Unix timestamp that simulation second zero maps to
    #[serde(default = "default_base_epoch")]
    pub base_epoch: i64,
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            crew_members: default_crew_members(),
            cleaning_durations: CleaningDurations::default(),
            cost_parameters: CostParameters::default(),
            supply_management: SupplyManagement::default(),
            urgency: UrgencyThresholds::default(),
            scheduling: SchedulingWindows::default(),
            usage_threshold: default_usage_threshold(),
            base_epoch: DEFAULT_BASE_EPOCH,
        }
    }
}

impl CrewConfig {
    /// Load crew configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = read_json_file(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Validate the crew configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.crew_members.is_empty() {
            return Err(ConfigValidationError::Empty("crew member"));
        }
        for member in &self.crew_members {
            if !(member.shift_end_hours > member.shift_start_hours)
                || member.shift_start_hours < 0.0
                || member.shift_end_hours > 24.0
            {
                return Err(ConfigValidationError::InvalidShift {
                    name: member.name.clone(),
                    start: member.shift_start_hours,
                    end: member.shift_end_hours,
                });
            }
            validate_positive(&format!("{} skill_level", member.name), member.skill_level)?;
            validate_non_negative(&format!("{} hourly_rate", member.name), member.hourly_rate)?;
        }

        for cleaning_type in CleaningType::ALL {
            validate_positive(
                &format!("cleaning_durations.{}", cleaning_type),
                self.cleaning_durations.minutes(cleaning_type),
            )?;
        }

        let supply = &self.supply_management;
        validate_positive("supply_management.supplies_per_cleaning", supply.supplies_per_cleaning)?;
        if supply.supplies_per_cleaning > 100.0 {
            return Err(ConfigValidationError::InvalidShare {
                field: "supply_management.supplies_per_cleaning / 100".to_string(),
                value: supply.supplies_per_cleaning / 100.0,
            });
        }
        validate_non_negative("supply_management.restock_time_minutes", supply.restock_time_minutes)?;

        let urgency = &self.urgency;
        if !(urgency.call_in >= 0.0
            && urgency.call_in < urgency.high_priority_call_in
            && urgency.high_priority_call_in < urgency.emergency)
        {
            return Err(ConfigValidationError::UnorderedThresholds {
                call_in: urgency.call_in,
                high_priority: urgency.high_priority_call_in,
                emergency: urgency.emergency,
            });
        }

        validate_positive("usage_threshold", self.usage_threshold)?;
        Ok(())
    }
}
