//! Passenger movement between entry points and restrooms
//!
//! Distances combine a planar walk with a vertical component of
//! `floor_height` per floor crossed. Vertical travel takes whichever of the
//! elevator (including its average wait) or the stairs is faster. All pairs
//! are computed once at construction.

use super::layout::TerminalLayout;
use crate::simulation::{SimulationError, SimulationResult};
use crate::types::{EntryPointId, MovementSpeeds, RestroomId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Geometry and travel time of one entry point to restroom trip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelLeg {
    /// Planar Euclidean distance
    pub horizontal_distance: f64,
    /// Vertical distance, `floor_diff * floor_height`
    pub vertical_distance: f64,
    /// Horizontal plus vertical distance
    pub total_distance: f64,
    /// Number of floors crossed
    pub floor_diff: u32,
    /// Travel time in seconds
    pub travel_time: f64,
}

/// Aggregate statistics over all entry point to restroom pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementSummary {
    /// Number of entry point to restroom pairs
    pub total_pairs: usize,
    /// Pairs that involve a floor change
    pub vertical_pairs: usize,
    /// Share of pairs with a floor change, in percent
    pub vertical_percentage: f64,
    /// Mean planar distance
    pub avg_horizontal_distance: f64,
    /// Largest planar distance
    pub max_horizontal_distance: f64,
    /// Mean vertical distance
    pub avg_vertical_distance: f64,
    /// Largest vertical distance
    pub max_vertical_distance: f64,
    /// Mean travel time in seconds
    pub avg_travel_time: f64,
    /// Largest travel time in seconds
    pub max_travel_time: f64,
    /// Speeds the model was built with
    pub speeds: MovementSpeeds,
}

/// Precomputed travel legs between every entry point and restroom
#[derive(Debug, Clone)]
pub struct MovementModel {
    speeds: MovementSpeeds,
    legs: BTreeMap<(EntryPointId, RestroomId), TravelLeg>,
}

impl MovementModel {
    /// Compute all legs for a layout
    pub fn new(layout: &TerminalLayout, speeds: MovementSpeeds) -> Self {
        let mut legs = BTreeMap::new();
        for entry in layout.entry_points.values() {
            for restroom in layout.restrooms.values() {
                let dx = restroom.x - entry.x;
                let dy = restroom.y - entry.y;
                let horizontal = (dx * dx + dy * dy).sqrt();
                let floor_diff = (restroom.floor - entry.floor).unsigned_abs();
                let vertical = f64::from(floor_diff) * speeds.floor_height;

                let leg = TravelLeg {
                    horizontal_distance: horizontal,
                    vertical_distance: vertical,
                    total_distance: horizontal + vertical,
                    floor_diff,
                    travel_time: Self::leg_time(&speeds, horizontal, vertical, floor_diff),
                };
                legs.insert((entry.id.clone(), restroom.id.clone()), leg);
            }
        }

        Self { speeds, legs }
    }

    fn leg_time(speeds: &MovementSpeeds, horizontal: f64, vertical: f64, floor_diff: u32) -> f64 {
        let walk_time = horizontal / speeds.walking;
        let vertical_time = if floor_diff > 0 {
            let elevator = speeds.elevator_wait + vertical / speeds.elevator;
            let stairs = vertical / speeds.stairs;
            elevator.min(stairs)
        } else {
            0.0
        };
        walk_time + vertical_time
    }

    /// Distance and travel time of one pair
    pub fn leg(&self, entry: &EntryPointId, restroom: &RestroomId) -> SimulationResult<&TravelLeg> {
        self.legs
            .get(&(entry.clone(), restroom.clone()))
            .ok_or_else(|| SimulationError::unknown_location(format!("{} -> {}", entry, restroom)))
    }

    /// Travel time in seconds of one pair
    pub fn travel_time(&self, entry: &EntryPointId, restroom: &RestroomId) -> SimulationResult<f64> {
        Ok(self.leg(entry, restroom)?.travel_time)
    }

    /// All legs keyed by entry point and restroom
    pub fn legs(&self) -> &BTreeMap<(EntryPointId, RestroomId), TravelLeg> {
        &self.legs
    }

    /// Summary statistics over all pairs
    pub fn summary(&self) -> MovementSummary {
        let n = self.legs.len();
        let mean = |f: fn(&TravelLeg) -> f64| {
            if n == 0 {
                0.0
            } else {
                self.legs.values().map(f).sum::<f64>() / n as f64
            }
        };
        let max = |f: fn(&TravelLeg) -> f64| self.legs.values().map(f).fold(0.0, f64::max);
        let vertical_pairs = self.legs.values().filter(|leg| leg.floor_diff > 0).count();

        MovementSummary {
            total_pairs: n,
            vertical_pairs,
            vertical_percentage: if n == 0 { 0.0 } else { vertical_pairs as f64 / n as f64 * 100.0 },
            avg_horizontal_distance: mean(|leg| leg.horizontal_distance),
            max_horizontal_distance: max(|leg| leg.horizontal_distance),
            avg_vertical_distance: mean(|leg| leg.vertical_distance),
            max_vertical_distance: max(|leg| leg.vertical_distance),
            avg_travel_time: mean(|leg| leg.travel_time),
            max_travel_time: max(|leg| leg.travel_time),
            speeds: self.speeds.clone(),
        }
    }
}
