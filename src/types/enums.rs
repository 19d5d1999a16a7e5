//! Enumeration types for the terminal facility simulator
//!
//! This module contains the enumerations shared across the restroom simulator and
//! the cleaning crew optimizer: genders of facility sections, flight flow kinds,
//! aircraft classes, assignment policies, crew statuses and cleaning task types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gender served by a restroom section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    /// Men's section (`M`)
    #[serde(rename = "M")]
    Male,
    /// Women's section (`F`)
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    /// Both genders in section order
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    /// Short code used in section ids
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "m" | "male" => Ok(Gender::Male),
            "f" | "female" => Ok(Gender::Female),
            _ => Err(format!("Unknown gender: {}", s)),
        }
    }
}

/// Direction of a flight's passenger flow through the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
    /// Arriving passengers leaving the aircraft
    Deplaning,
    /// Departing passengers heading to the gate
    Boarding,
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowType::Deplaning => write!(f, "deplaning"),
            FlowType::Boarding => write!(f, "boarding"),
        }
    }
}

impl FromStr for FlowType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deplaning" | "arrival" | "arrivals" => Ok(FlowType::Deplaning),
            "boarding" | "departure" | "departures" => Ok(FlowType::Boarding),
            _ => Err(format!("Unknown flow type: {}", s)),
        }
    }
}

/// Aircraft size class, which determines how long deplaning takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AircraftType {
    /// Regional jets and turboprops
    Small,
    /// Narrow-body aircraft
    Medium,
    /// Large narrow-body aircraft
    Large,
    /// Twin-aisle aircraft
    WideBody,
    /// Any class not listed above
    #[serde(other)]
    Other,
}

impl AircraftType {
    /// Time in seconds for all passengers to leave the aircraft
    pub fn deplaning_duration(&self) -> f64 {
        match self {
            AircraftType::Small => 300.0,
            AircraftType::Medium => 600.0,
            AircraftType::Large => 900.0,
            AircraftType::WideBody => 1200.0,
            AircraftType::Other => 600.0,
        }
    }
}

impl fmt::Display for AircraftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AircraftType::Small => write!(f, "small"),
            AircraftType::Medium => write!(f, "medium"),
            AircraftType::Large => write!(f, "large"),
            AircraftType::WideBody => write!(f, "wide_body"),
            AircraftType::Other => write!(f, "other"),
        }
    }
}

/// Flow-splitting policy used to distribute passengers among candidate facilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentMethod {
    /// Multinomial logit split proportional to `exp(-theta * cost)`
    #[default]
    Logit,
    /// All flow to the single cheapest facility
    Deterministic,
    /// Flow proportional to `max_cost - cost + 1`
    Proportional,
}

impl fmt::Display for AssignmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentMethod::Logit => write!(f, "logit"),
            AssignmentMethod::Deterministic => write!(f, "deterministic"),
            AssignmentMethod::Proportional => write!(f, "proportional"),
        }
    }
}

impl FromStr for AssignmentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logit" => Ok(AssignmentMethod::Logit),
            "deterministic" | "all-or-nothing" => Ok(AssignmentMethod::Deterministic),
            "proportional" => Ok(AssignmentMethod::Proportional),
            _ => Err(format!("Unknown assignment method: {}", s)),
        }
    }
}

/// What a crew member is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrewStatus {
    /// Waiting for work
    Idle,
    /// Cleaning a restroom
    Cleaning,
    /// Walking to a restroom or to the supply depot
    Traveling,
    /// On a break
    Break,
    /// Handling an emergency
    EmergencyResponse,
}

impl CrewStatus {
    /// Whether the status counts as busy for utilization and preemption
    pub fn is_busy(&self) -> bool {
        matches!(self, CrewStatus::Cleaning | CrewStatus::Traveling)
    }
}

impl fmt::Display for CrewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrewStatus::Idle => write!(f, "idle"),
            CrewStatus::Cleaning => write!(f, "cleaning"),
            CrewStatus::Traveling => write!(f, "traveling"),
            CrewStatus::Break => write!(f, "break"),
            CrewStatus::EmergencyResponse => write!(f, "emergency_response"),
        }
    }
}

/// Category of a cleaning task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningType {
    /// Scheduled in advance from the cleaning requirements
    Routine,
    /// Triggered by a severe waiting-time spike
    Emergency,
    /// Triggered by an elevated waiting time
    CallIn,
    /// Extended cleaning
    DeepClean,
    /// Triggered by accumulated passenger usage since the last cleaning
    UsageBased,
}

impl CleaningType {
    /// All cleaning types in reporting order
    pub const ALL: [CleaningType; 5] = [
        CleaningType::Routine,
        CleaningType::Emergency,
        CleaningType::CallIn,
        CleaningType::DeepClean,
        CleaningType::UsageBased,
    ];

    /// Call-ins and emergencies are generated reactively from waiting times
    pub fn is_urgent(&self) -> bool {
        matches!(self, CleaningType::CallIn | CleaningType::Emergency)
    }

    /// Multiplier on the per-cleaning supply usage
    pub fn supply_factor(&self) -> f64 {
        match self {
            CleaningType::DeepClean => 2.0,
            CleaningType::Emergency => 1.5,
            _ => 1.0,
        }
    }
}

impl fmt::Display for CleaningType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleaningType::Routine => write!(f, "routine"),
            CleaningType::Emergency => write!(f, "emergency"),
            CleaningType::CallIn => write!(f, "call_in"),
            CleaningType::DeepClean => write!(f, "deep_clean"),
            CleaningType::UsageBased => write!(f, "usage_based"),
        }
    }
}

impl FromStr for CleaningType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "routine" => Ok(CleaningType::Routine),
            "emergency" => Ok(CleaningType::Emergency),
            "call_in" | "callin" => Ok(CleaningType::CallIn),
            "deep_clean" | "deepclean" => Ok(CleaningType::DeepClean),
            "usage_based" | "usage" => Ok(CleaningType::UsageBased),
            _ => Err(format!("Unknown cleaning type: {}", s)),
        }
    }
}

/// Stability classification of a restroom section from its peak utilization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityClass {
    /// Peak arrival rate comfortably below capacity
    Stable,
    /// Peak utilization above the high-utilization threshold
    HighUtilization,
    /// Peak arrival rate at or above the instability ratio of capacity
    Unstable,
}

impl fmt::Display for StabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StabilityClass::Stable => write!(f, "stable"),
            StabilityClass::HighUtilization => write!(f, "high_utilization"),
            StabilityClass::Unstable => write!(f, "unstable"),
        }
    }
}
