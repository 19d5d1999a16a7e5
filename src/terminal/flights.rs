//! Flight schedule to entry point inflow conversion
//!
//! Each flight becomes one rectangular passenger flow: deplaning flows start at
//! the arrival time and last as long as the aircraft class takes to empty,
//! boarding flows start `boarding_start` seconds before departure (never before
//! zero) and last `boarding_duration` seconds.

use crate::types::{EntryPointId, FlightId, FlowType, TerminalConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A flight's passenger flow at its entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightFlow {
    /// Flight producing the flow
    pub flight_id: FlightId,
    /// Entry point the gate maps to
    pub entry_point: EntryPointId,
    /// Deplaning or boarding
    pub flow_type: FlowType,
    /// Flow start, simulation seconds
    pub start: f64,
    /// Flow end, simulation seconds (inclusive)
    pub end: f64,
    /// Passenger rate while active, pax/s
    pub rate: f64,
    /// Passengers on the flight
    pub passengers: u32,
}

impl FlightFlow {
    /// Whether the flow is active at time `t`
    pub fn is_active(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Aggregate view of the flight schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    /// Number of flights
    pub total_flights: usize,
    /// Passengers across all flights
    pub total_passengers: u64,
    /// Deplaning flights
    pub deplaning_flights: usize,
    /// Boarding flights
    pub boarding_flights: usize,
    /// Flight count per aircraft class
    pub aircraft_types: BTreeMap<String, usize>,
    /// Distinct gates in use
    pub gates_used: Vec<String>,
}

/// Converts the flight schedule into entry point arrival rates over time
#[derive(Debug, Clone)]
pub struct FlightManager {
    flows: Vec<FlightFlow>,
    entry_points: Vec<EntryPointId>,
    alpha_arrival: f64,
    alpha_departure: f64,
    summary: FlightSummary,
}

impl FlightManager {
    /// Build flows for every configured flight
    pub fn new(config: &TerminalConfig) -> Self {
        let entry_points: Vec<EntryPointId> = config.entry_points.keys().cloned().collect();
        let mut flows = Vec::with_capacity(config.flights.len());
        let mut aircraft_types = BTreeMap::new();
        let mut gates_used = Vec::new();

        for (flight_id, flight) in &config.flights {
            let (start, duration) = match flight.flow_type {
                FlowType::Deplaning => (flight.arrival_time, flight.aircraft_type.deplaning_duration()),
                FlowType::Boarding => {
                    ((flight.arrival_time - flight.boarding_start).max(0.0), flight.boarding_duration)
                }
            };

            let entry_point = match config.gate_mappings.get(&flight.gate) {
                Some(entry_point) => entry_point.clone(),
                None => {
                    let fallback = entry_points.first().cloned().unwrap_or_else(|| EntryPointId::new(""));
                    warn!(flight = %flight_id, gate = %flight.gate, entry_point = %fallback,
                        "Gate has no mapping, routing flow to the first entry point");
                    fallback
                }
            };

            *aircraft_types.entry(flight.aircraft_type.to_string()).or_insert(0) += 1;
            if !gates_used.contains(&flight.gate) {
                gates_used.push(flight.gate.clone());
            }

            flows.push(FlightFlow {
                flight_id: flight_id.clone(),
                entry_point,
                flow_type: flight.flow_type,
                start,
                end: start + duration,
                rate: f64::from(flight.passengers) / duration,
                passengers: flight.passengers,
            });
        }
        gates_used.sort();

        let summary = FlightSummary {
            total_flights: flows.len(),
            total_passengers: flows.iter().map(|f| u64::from(f.passengers)).sum(),
            deplaning_flights: flows.iter().filter(|f| f.flow_type == FlowType::Deplaning).count(),
            boarding_flights: flows.iter().filter(|f| f.flow_type == FlowType::Boarding).count(),
            aircraft_types,
            gates_used,
        };
        debug!(flows = flows.len(), "Flight schedule processed");

        Self {
            flows,
            entry_points,
            alpha_arrival: config.simulation.alpha_arrival,
            alpha_departure: config.simulation.alpha_departure,
            summary,
        }
    }

    /// Restroom-bound inflow rate at every entry point at time `t`
    ///
    /// Entry points without an active flow are present with a zero rate.
    pub fn compute_inflows(&self, t: f64) -> BTreeMap<EntryPointId, f64> {
        let mut inflows: BTreeMap<EntryPointId, f64> =
            self.entry_points.iter().map(|id| (id.clone(), 0.0)).collect();

        for flow in self.flows.iter().filter(|flow| flow.is_active(t)) {
            let usage = match flow.flow_type {
                FlowType::Deplaning => self.alpha_arrival,
                FlowType::Boarding => self.alpha_departure,
            };
            if let Some(rate) = inflows.get_mut(&flow.entry_point) {
                *rate += flow.rate * usage;
            }
        }

        inflows
    }

    /// All flight flows in flight id order
    pub fn flows(&self) -> &[FlightFlow] {
        &self.flows
    }

    /// Schedule summary
    pub fn summary(&self) -> &FlightSummary {
        &self.summary
    }
}
