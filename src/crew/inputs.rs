//! Optimizer inputs: travel times, facility capacities, cleaning requirements
//! and the demand snapshot produced by a flow simulation run

use crate::queue::SectionSeries;
use crate::simulation::{SimulationError, SimulationResult};
use crate::terminal::TerminalLayout;
use crate::types::config::read_json_file;
use crate::types::{ConfigError, Gender, LocationId, RestroomId, SectionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Crew travel times in seconds between named locations
///
/// Serialized as a nested `{from: {to: seconds}}` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TravelTimeMatrix(BTreeMap<LocationId, BTreeMap<LocationId, f64>>);

impl TravelTimeMatrix {
    /// Create an empty matrix
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a matrix from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = read_json_file(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Parse a matrix from JSON
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the travel time in one direction
    pub fn insert(&mut self, from: impl Into<LocationId>, to: impl Into<LocationId>, seconds: f64) {
        self.0.entry(from.into()).or_default().insert(to.into(), seconds);
    }

    /// Set the travel time in both directions
    pub fn insert_symmetric(&mut self, a: impl Into<LocationId>, b: impl Into<LocationId>, seconds: f64) {
        let (a, b) = (a.into(), b.into());
        self.insert(a.clone(), b.clone(), seconds);
        self.insert(b, a, seconds);
    }

    /// Travel time between two locations, zero when they coincide
    pub fn travel_time(&self, from: &LocationId, to: &LocationId) -> SimulationResult<f64> {
        if from == to {
            return Ok(0.0);
        }
        self.0
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .ok_or_else(|| SimulationError::MissingTravelTime { from: from.clone(), to: to.clone() })
    }

    /// Number of origin rows
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no travel time is known
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Floor and per-gender service capacity of a restroom
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestroomCapacity {
    /// Floor the restroom is on
    pub floor: i32,
    /// Male section capacity, pax/s
    #[serde(rename = "capacity_M", default)]
    pub capacity_m: f64,
    /// Female section capacity, pax/s
    #[serde(rename = "capacity_F", default)]
    pub capacity_f: f64,
}

impl RestroomCapacity {
    /// Combined capacity of both sections
    pub fn total(&self) -> f64 {
        self.capacity_m + self.capacity_f
    }
}

/// Capacities of every restroom in a layout
pub fn restroom_capacities(layout: &TerminalLayout) -> BTreeMap<RestroomId, RestroomCapacity> {
    layout
        .restrooms
        .values()
        .map(|r| {
            (r.id.clone(), RestroomCapacity { floor: r.floor, capacity_m: r.capacity_m, capacity_f: r.capacity_f })
        })
        .collect()
}

/// Number of routine cleanings a restroom needs over the horizon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningRequirement {
    /// Restroom to clean
    pub restroom_id: RestroomId,
    /// Routine cleanings to spread evenly over the horizon
    pub count: u32,
}

impl CleaningRequirement {
    /// Create a requirement
    pub fn new(restroom_id: impl Into<RestroomId>, count: u32) -> Self {
        Self { restroom_id: restroom_id.into(), count }
    }

    /// Parse requirements from a `{restroom_id: count}` JSON object
    pub fn from_json_str(json: &str) -> Result<Vec<Self>, ConfigError> {
        let counts: BTreeMap<RestroomId, u32> = serde_json::from_str(json)?;
        Ok(counts.into_iter().map(|(restroom_id, count)| Self { restroom_id, count }).collect())
    }

    /// Load requirements from a `{restroom_id: count}` JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Self>, ConfigError> {
        let content = read_json_file(path.as_ref())?;
        Self::from_json_str(&content)
    }
}

/// Per-section time series the optimizer reacts to
///
/// Waiting times drive call-ins and emergencies. Arrival rates drive
/// usage-based cleanings and, with queue lengths, the passenger impact score.
/// Series may be missing or shorter than the optimizer horizon; absent values
/// read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemandSnapshot {
    /// Waiting time series in seconds
    #[serde(default)]
    pub waiting_times: BTreeMap<SectionId, Vec<f64>>,
    /// Arrival rate series in pax/s
    #[serde(default)]
    pub arrival_rates: BTreeMap<SectionId, Vec<f64>>,
    /// Queue length series in pax
    #[serde(default)]
    pub queue_lengths: BTreeMap<SectionId, Vec<f64>>,
}

impl DemandSnapshot {
    /// Snapshot with waiting times only
    pub fn from_waiting_times(waiting_times: BTreeMap<SectionId, Vec<f64>>) -> Self {
        Self { waiting_times, ..Self::default() }
    }

    /// Snapshot of simulated section series
    pub fn from_series(series: &BTreeMap<SectionId, SectionSeries>) -> Self {
        let mut snapshot = Self::default();
        for (id, s) in series {
            snapshot.waiting_times.insert(id.clone(), s.waiting_time.clone());
            snapshot.arrival_rates.insert(id.clone(), s.arrival_rate.clone());
            snapshot.queue_lengths.insert(id.clone(), s.queue_length.clone());
        }
        snapshot
    }

    fn value(data: &BTreeMap<SectionId, Vec<f64>>, restroom: &RestroomId, gender: Gender, t: usize) -> f64 {
        data.get(&SectionId::new(restroom.clone(), gender)).and_then(|s| s.get(t)).copied().unwrap_or(0.0)
    }

    /// Worst section waiting time of a restroom at step `t`
    pub fn max_waiting_time(&self, restroom: &RestroomId, t: usize) -> f64 {
        Gender::ALL.iter().map(|&g| Self::value(&self.waiting_times, restroom, g, t)).fold(0.0, f64::max)
    }

    /// Combined arrival rate of a restroom at step `t`
    pub fn arrival_rate(&self, restroom: &RestroomId, t: usize) -> f64 {
        Gender::ALL.iter().map(|&g| Self::value(&self.arrival_rates, restroom, g, t)).sum()
    }

    /// Longest section queue of a restroom at step `t`
    pub fn max_queue_length(&self, restroom: &RestroomId, t: usize) -> f64 {
        Gender::ALL.iter().map(|&g| Self::value(&self.queue_lengths, restroom, g, t)).fold(0.0, f64::max)
    }

    /// True when arrival rates were supplied
    pub fn has_arrival_data(&self) -> bool {
        !self.arrival_rates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travel_time_lookup() {
        let mut travel = TravelTimeMatrix::new();
        travel.insert_symmetric("Base_1", "R1", 120.0);

        let base = LocationId::new("Base_1");
        let r1 = LocationId::new("R1");
        assert_eq!(travel.travel_time(&base, &r1).unwrap(), 120.0);
        assert_eq!(travel.travel_time(&r1, &base).unwrap(), 120.0);
        assert_eq!(travel.travel_time(&r1, &r1).unwrap(), 0.0);

        let err = travel.travel_time(&base, &LocationId::new("R9")).unwrap_err();
        assert!(matches!(err, SimulationError::MissingTravelTime { .. }));
    }

    #[test]
    fn test_travel_matrix_json() {
        let travel = TravelTimeMatrix::from_json_str(r#"{"Base_1": {"R1": 90, "R2": 150}}"#).unwrap();
        assert_eq!(travel.len(), 1);
        assert_eq!(travel.travel_time(&LocationId::new("Base_1"), &LocationId::new("R2")).unwrap(), 150.0);
    }

    #[test]
    fn test_requirements_json() {
        let requirements = CleaningRequirement::from_json_str(r#"{"R2": 3, "R1": 0}"#).unwrap();
        assert_eq!(requirements, vec![CleaningRequirement::new("R1", 0), CleaningRequirement::new("R2", 3)]);
    }

    #[test]
    fn test_snapshot_reads_missing_as_zero() {
        let r1 = RestroomId::new("R1");
        let mut waits = BTreeMap::new();
        waits.insert(SectionId::new(r1.clone(), Gender::Male), vec![0.0, 40.0]);
        waits.insert(SectionId::new(r1.clone(), Gender::Female), vec![10.0, 25.0]);
        let snapshot = DemandSnapshot::from_waiting_times(waits);

        assert_eq!(snapshot.max_waiting_time(&r1, 0), 10.0);
        assert_eq!(snapshot.max_waiting_time(&r1, 1), 40.0);
        assert_eq!(snapshot.max_waiting_time(&r1, 5), 0.0);
        assert_eq!(snapshot.arrival_rate(&r1, 1), 0.0);
        assert!(!snapshot.has_arrival_data());
    }
}
