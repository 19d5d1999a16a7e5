//! Passenger-level demand from flight records
//!
//! Every flight record expands into individual passengers with an entry time
//! around the flight time, a restroom-use flag and a gender. Arrival records
//! run from the security node to a gate and spread passengers shortly after
//! the flight; departure records run from a gate to security and spread them
//! well before it.

use super::{DemandError, DemandResult};
use crate::types::{FlightId, FlowType, Gender};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Name of the security checkpoint node in flight records
pub const SECURITY_NODE: &str = "Security";

/// One flight's passenger movement between two terminal nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    /// Flight identifier
    pub flight_id: FlightId,
    /// Actual arrival or departure time
    pub actual_time: DateTime<Utc>,
    /// Node passengers start from
    pub origin: String,
    /// Node passengers head to
    pub destination: String,
    /// Passenger count
    pub passengers: u32,
}

impl FlightRecord {
    /// An arriving flight: passengers move from security to the gate
    pub fn arrival(flight_id: impl Into<FlightId>, actual_time: DateTime<Utc>, gate: &str, passengers: u32) -> Self {
        Self {
            flight_id: flight_id.into(),
            actual_time,
            origin: SECURITY_NODE.to_string(),
            destination: gate.to_string(),
            passengers,
        }
    }

    /// A departing flight: passengers move from the gate to security
    pub fn departure(flight_id: impl Into<FlightId>, actual_time: DateTime<Utc>, gate: &str, passengers: u32) -> Self {
        Self {
            flight_id: flight_id.into(),
            actual_time,
            origin: gate.to_string(),
            destination: SECURITY_NODE.to_string(),
            passengers,
        }
    }

    /// Arrivals start at security, everything else is treated as a departure
    pub fn flow_type(&self) -> FlowType {
        if self.origin == SECURITY_NODE {
            FlowType::Deplaning
        } else {
            FlowType::Boarding
        }
    }
}

/// Clipped normal distribution of entry offsets, in minutes from flight time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryOffset {
    /// Mean offset
    pub mean: f64,
    /// Standard deviation
    pub std_dev: f64,
    /// Lower clip
    pub min: f64,
    /// Upper clip
    pub max: f64,
}

impl EntryOffset {
    fn validate(&self, name: &str) -> DemandResult<()> {
        if !(self.std_dev >= 0.0) || !self.std_dev.is_finite() || !(self.min <= self.max) {
            return Err(DemandError::InvalidParameter(format!(
                "{} offset: std_dev {} must be non-negative and min {} must not exceed max {}",
                name, self.std_dev, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Per-passenger behavior parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassengerBehavior {
    /// Probability that a passenger visits a restroom
    pub restroom_probability: f64,
    /// Share of male passengers
    pub male_share: f64,
    /// Entry offsets of arriving passengers
    pub arrival_offset: EntryOffset,
    /// Entry offsets of departing passengers
    pub departure_offset: EntryOffset,
}

impl Default for PassengerBehavior {
    fn default() -> Self {
        Self {
            restroom_probability: 0.2,
            male_share: 0.5,
            arrival_offset: EntryOffset { mean: 5.0, std_dev: 3.0, min: 0.0, max: 15.0 },
            departure_offset: EntryOffset { mean: -60.0, std_dev: 15.0, min: -90.0, max: -30.0 },
        }
    }
}

impl PassengerBehavior {
    /// Check probabilities and offset distributions
    pub fn validate(&self) -> DemandResult<()> {
        for (name, p) in [("restroom_probability", self.restroom_probability), ("male_share", self.male_share)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(DemandError::InvalidParameter(format!("{} must be within [0, 1], got {}", name, p)));
            }
        }
        self.arrival_offset.validate("arrival")?;
        self.departure_offset.validate("departure")
    }

    fn offset(&self, flow_type: FlowType) -> EntryOffset {
        match flow_type {
            FlowType::Deplaning => self.arrival_offset,
            FlowType::Boarding => self.departure_offset,
        }
    }
}

/// One generated passenger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    /// When the passenger enters the terminal flow
    pub entry_time: DateTime<Utc>,
    /// Node the passenger starts from
    pub origin: String,
    /// Node the passenger heads to
    pub destination: String,
    /// Flight the passenger belongs to
    pub flight_id: FlightId,
    /// Whether the passenger visits a restroom
    pub uses_restroom: bool,
    /// Passenger gender
    pub gender: Gender,
}

/// Expands flight records into passengers with a seedable random source
#[derive(Debug)]
pub struct PassengerGenerator {
    behavior: PassengerBehavior,
    rng: StdRng,
}

impl PassengerGenerator {
    /// Create a generator, seeded for reproducible output
    pub fn new(behavior: PassengerBehavior, seed: Option<u64>) -> DemandResult<Self> {
        behavior.validate()?;
        let rng = match seed {
            Some(seed) => {
                debug!(seed, "Using deterministic seed for passenger generation");
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };
        Ok(Self { behavior, rng })
    }

    /// Behavior parameters
    pub fn behavior(&self) -> &PassengerBehavior {
        &self.behavior
    }

    /// Passengers of one origin-destination pair on one day, by entry time
    pub fn generate_for_od(
        &mut self,
        flights: &[FlightRecord],
        date: NaiveDate,
        origin: &str,
        destination: &str,
    ) -> DemandResult<Vec<Passenger>> {
        let selected: Vec<&FlightRecord> = flights
            .iter()
            .filter(|f| f.actual_time.date_naive() == date && f.origin == origin && f.destination == destination)
            .collect();
        self.generate(&selected)
            .ok_or_else(|| DemandError::empty(format!("no passengers from {} to {} on {}", origin, destination, date)))
    }

    /// Passengers of every flight on one day, by entry time
    pub fn generate_for_day(&mut self, flights: &[FlightRecord], date: NaiveDate) -> DemandResult<Vec<Passenger>> {
        let selected: Vec<&FlightRecord> = flights.iter().filter(|f| f.actual_time.date_naive() == date).collect();
        let passengers = self.generate(&selected).ok_or_else(|| DemandError::empty(format!("no passengers on {}", date)))?;
        info!(
            %date,
            flights = selected.len(),
            passengers = passengers.len(),
            restroom_users = passengers.iter().filter(|p| p.uses_restroom).count(),
            "Generated passenger demand"
        );
        Ok(passengers)
    }

    fn generate(&mut self, flights: &[&FlightRecord]) -> Option<Vec<Passenger>> {
        let mut passengers = Vec::new();
        for flight in flights {
            let offset = self.behavior.offset(flight.flow_type());
            // validated on construction; a zero deviation degenerates to the mean
            let normal = Normal::new(offset.mean, offset.std_dev).ok()?;
            for _ in 0..flight.passengers {
                let minutes = normal.sample(&mut self.rng).clamp(offset.min, offset.max);
                let uses_restroom = self.rng.gen::<f64>() < self.behavior.restroom_probability;
                let gender =
                    if self.rng.gen::<f64>() < self.behavior.male_share { Gender::Male } else { Gender::Female };
                passengers.push(Passenger {
                    entry_time: flight.actual_time + Duration::milliseconds((minutes * 60_000.0).round() as i64),
                    origin: flight.origin.clone(),
                    destination: flight.destination.clone(),
                    flight_id: flight.flight_id.clone(),
                    uses_restroom,
                    gender,
                });
            }
        }

        if passengers.is_empty() {
            return None;
        }
        passengers.sort_by_key(|p| p.entry_time);
        Some(passengers)
    }
}
