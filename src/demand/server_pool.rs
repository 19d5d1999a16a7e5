//! Batch-assigned multi-server restroom simulation
//!
//! Restroom users are released in fixed batches. At each batch start every
//! section predicts its wait as the time until its earliest server frees up,
//! and each user in the batch picks the same-gender section minimizing
//! `walk + wait_weight * predicted_wait`. Users are then served first come
//! first served by the section's `servers` parallel servers with exponential
//! service times.

use super::{DemandError, DemandResult, Passenger};
use crate::terminal::TerminalLayout;
use crate::types::{Gender, SectionId};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Parameters of the batch simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerPoolParams {
    /// Parallel servers per section
    pub servers: usize,
    /// Mean service time in minutes
    pub mean_service_minutes: f64,
    /// Batch length in seconds
    pub batch_seconds: f64,
    /// Walking speed in meters per minute
    pub walk_speed_m_per_min: f64,
    /// Weight of the predicted wait against walking time
    pub wait_weight: f64,
}

impl Default for ServerPoolParams {
    fn default() -> Self {
        Self {
            servers: 15,
            mean_service_minutes: 2.0,
            batch_seconds: 300.0,
            walk_speed_m_per_min: 80.0,
            wait_weight: 30.0,
        }
    }
}

impl ServerPoolParams {
    fn validate(&self) -> DemandResult<()> {
        if self.servers == 0 {
            return Err(DemandError::InvalidParameter("servers must be at least 1".to_string()));
        }
        for (name, value) in [
            ("mean_service_minutes", self.mean_service_minutes),
            ("batch_seconds", self.batch_seconds),
            ("walk_speed_m_per_min", self.walk_speed_m_per_min),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(DemandError::InvalidParameter(format!("{} must be positive, got {}", name, value)));
            }
        }
        if !(self.wait_weight >= 0.0) {
            return Err(DemandError::InvalidParameter(format!("wait_weight must be non-negative, got {}", self.wait_weight)));
        }
        Ok(())
    }
}

/// Location of one restroom section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionLocation {
    /// Section
    pub section: SectionId,
    /// X coordinate in meters
    pub x: f64,
    /// Y coordinate in meters
    pub y: f64,
}

/// One simulated restroom visit, times in seconds from the first entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestroomVisit {
    /// Node the passenger came from
    pub origin: String,
    /// Section used
    pub section: SectionId,
    /// Entry into the terminal flow
    pub entry: f64,
    /// Arrival at the restroom
    pub arrival: f64,
    /// Start of service
    pub service_start: f64,
    /// End of service
    pub service_end: f64,
    /// Time spent queueing
    pub wait: f64,
}

/// Waiting-queue length after an arrival or departure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueueEvent {
    /// Event time in seconds from the first entry
    pub time: f64,
    /// Passengers waiting, excluding those in service
    pub waiting: usize,
}

/// Output of a batch simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerPoolOutput {
    /// Instant of the first passenger entry, second zero of all times
    pub start: DateTime<Utc>,
    /// Visits in service order
    pub visits: Vec<RestroomVisit>,
    /// Waiting-queue trace of every used section
    pub queue_traces: BTreeMap<SectionId, Vec<QueueEvent>>,
}

impl ServerPoolOutput {
    /// Mean wait per `dt`-second bucket of arrival time, over `n_steps` buckets
    ///
    /// Buckets without arrivals read zero. The result plugs into the crew
    /// optimizer as its waiting-time data.
    pub fn waiting_time_series(&self, dt: f64, n_steps: usize) -> BTreeMap<SectionId, Vec<f64>> {
        let mut sums: BTreeMap<SectionId, Vec<(f64, usize)>> = BTreeMap::new();
        for visit in &self.visits {
            let bucket = (visit.arrival / dt).floor();
            if bucket < 0.0 || bucket as usize >= n_steps {
                continue;
            }
            let buckets = sums.entry(visit.section.clone()).or_insert_with(|| vec![(0.0, 0); n_steps]);
            let slot = &mut buckets[bucket as usize];
            slot.0 += visit.wait;
            slot.1 += 1;
        }
        sums.into_iter()
            .map(|(section, buckets)| {
                let means = buckets.into_iter().map(|(sum, n)| if n == 0 { 0.0 } else { sum / n as f64 }).collect();
                (section, means)
            })
            .collect()
    }

    /// Mean wait of every used section
    pub fn average_wait(&self) -> BTreeMap<SectionId, f64> {
        let mut totals: BTreeMap<SectionId, (f64, usize)> = BTreeMap::new();
        for visit in &self.visits {
            let entry = totals.entry(visit.section.clone()).or_insert((0.0, 0));
            entry.0 += visit.wait;
            entry.1 += 1;
        }
        totals.into_iter().map(|(section, (sum, n))| (section, sum / n as f64)).collect()
    }

    /// Absolute time of a simulation second
    pub fn at(&self, seconds: f64) -> DateTime<Utc> {
        self.start + Duration::milliseconds((seconds * 1000.0).round() as i64)
    }
}

/// Multi-server restroom simulation driven by generated passengers
#[derive(Debug)]
pub struct ServerPoolSimulator {
    params: ServerPoolParams,
    sections: Vec<SectionLocation>,
    origins: BTreeMap<String, (f64, f64)>,
    rng: StdRng,
}

impl ServerPoolSimulator {
    /// Create a simulator over explicit section and origin coordinates
    pub fn new(
        params: ServerPoolParams,
        sections: Vec<SectionLocation>,
        origins: BTreeMap<String, (f64, f64)>,
        seed: Option<u64>,
    ) -> DemandResult<Self> {
        params.validate()?;
        if sections.is_empty() {
            return Err(DemandError::empty("no restroom sections to simulate"));
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { params, sections, origins, rng })
    }

    /// Create a simulator from a terminal layout
    ///
    /// Every restroom contributes one section per gender; every entry point
    /// is an origin under its id.
    pub fn from_layout(params: ServerPoolParams, layout: &TerminalLayout, seed: Option<u64>) -> DemandResult<Self> {
        let sections = layout
            .restrooms
            .values()
            .flat_map(|r| {
                Gender::ALL.iter().map(move |&g| SectionLocation { section: r.section_id(g), x: r.x, y: r.y })
            })
            .collect();
        let origins = layout.entry_points.values().map(|e| (e.id.to_string(), (e.x, e.y))).collect();
        Self::new(params, sections, origins, seed)
    }

    /// Add or move an origin node
    pub fn with_origin(mut self, name: impl Into<String>, x: f64, y: f64) -> Self {
        self.origins.insert(name.into(), (x, y));
        self
    }

    fn walk_seconds(&self, origin: (f64, f64), section: &SectionLocation) -> f64 {
        let distance = (origin.0 - section.x).abs() + (origin.1 - section.y).abs();
        distance / self.params.walk_speed_m_per_min * 60.0
    }

    /// Simulate every restroom user among `passengers`
    #[instrument(skip_all, fields(passengers = passengers.len()))]
    pub fn run(&mut self, passengers: &[Passenger]) -> DemandResult<ServerPoolOutput> {
        let start = passengers
            .iter()
            .map(|p| p.entry_time)
            .min()
            .ok_or_else(|| DemandError::empty("no passengers to simulate"))?;
        let offset = |p: &Passenger| (p.entry_time - start).num_milliseconds() as f64 / 1000.0;

        let mut users: Vec<(f64, &Passenger)> =
            passengers.iter().filter(|p| p.uses_restroom).map(|p| (offset(p), p)).collect();
        users.sort_by(|a, b| a.0.total_cmp(&b.0));
        let end = passengers.iter().map(offset).fold(0.0, f64::max);

        let service = Exp::new(1.0 / self.params.mean_service_minutes)
            .map_err(|e| DemandError::InvalidParameter(format!("mean_service_minutes: {}", e)))?;
        let mut free_at: Vec<Vec<f64>> = vec![vec![0.0; self.params.servers]; self.sections.len()];
        let mut visits = Vec::new();

        let mut batch_start = 0.0;
        let mut next_user = 0;
        while batch_start <= end {
            let batch_end = batch_start + self.params.batch_seconds;
            let predicted: Vec<f64> =
                free_at.iter().map(|servers| (earliest(servers).1 - batch_start).max(0.0)).collect();

            while next_user < users.len() && users[next_user].0 < batch_end {
                let (entry, passenger) = users[next_user];
                next_user += 1;

                let origin = *self
                    .origins
                    .get(&passenger.origin)
                    .ok_or_else(|| DemandError::UnknownOrigin(passenger.origin.clone()))?;

                let mut best: Option<(usize, f64, f64)> = None;
                for (i, section) in self.sections.iter().enumerate() {
                    if section.section.gender != passenger.gender {
                        continue;
                    }
                    let walk = self.walk_seconds(origin, section);
                    let cost = walk + self.params.wait_weight * predicted[i];
                    if best.map_or(true, |(_, best_cost, _)| cost < best_cost) {
                        best = Some((i, cost, walk));
                    }
                }
                let (chosen, _, walk) = match best {
                    Some(best) => best,
                    None => continue,
                };

                let arrival = entry + walk;
                let (server, server_free) = earliest(&free_at[chosen]);
                let service_start = arrival.max(server_free);
                let service_end = service_start + service.sample(&mut self.rng) * 60.0;
                free_at[chosen][server] = service_end;

                visits.push(RestroomVisit {
                    origin: passenger.origin.clone(),
                    section: self.sections[chosen].section.clone(),
                    entry,
                    arrival,
                    service_start,
                    service_end,
                    wait: service_start - arrival,
                });
            }
            batch_start = batch_end;
        }

        if visits.is_empty() {
            return Err(DemandError::empty("no restroom users were simulated"));
        }

        let queue_traces = queue_traces(&visits, self.params.servers);
        info!(
            visits = visits.len(),
            sections_used = queue_traces.len(),
            "Restroom batch simulation completed"
        );
        Ok(ServerPoolOutput { start, visits, queue_traces })
    }
}

/// Index and time of the server that frees up first
fn earliest(servers: &[f64]) -> (usize, f64) {
    servers.iter().copied().enumerate().fold((0, f64::INFINITY), |best, (i, t)| if t < best.1 { (i, t) } else { best })
}

fn queue_traces(visits: &[RestroomVisit], servers: usize) -> BTreeMap<SectionId, Vec<QueueEvent>> {
    let mut events: BTreeMap<SectionId, Vec<(f64, i64)>> = BTreeMap::new();
    for visit in visits {
        let section = events.entry(visit.section.clone()).or_default();
        section.push((visit.arrival, 1));
        section.push((visit.service_end, -1));
    }

    events
        .into_iter()
        .map(|(section, mut deltas)| {
            deltas.sort_by(|a, b| a.0.total_cmp(&b.0));
            let mut in_system: i64 = 0;
            let trace = deltas
                .into_iter()
                .map(|(time, delta)| {
                    in_system += delta;
                    QueueEvent { time, waiting: (in_system - servers as i64).max(0) as usize }
                })
                .collect();
            debug!(section = %section, "Queue trace built");
            (section, trace)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FlightId, RestroomId};
    use chrono::TimeZone;

    fn passenger(offset_seconds: i64, gender: Gender) -> Passenger {
        Passenger {
            entry_time: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap() + Duration::seconds(offset_seconds),
            origin: "G1".to_string(),
            destination: "A1".to_string(),
            flight_id: FlightId::new("AA100"),
            uses_restroom: true,
            gender,
        }
    }

    fn simulator(servers: usize) -> ServerPoolSimulator {
        let params = ServerPoolParams { servers, ..ServerPoolParams::default() };
        let near = RestroomId::new("NEAR");
        let far = RestroomId::new("FAR");
        let sections = vec![
            SectionLocation { section: SectionId::new(near.clone(), Gender::Male), x: 80.0, y: 0.0 },
            SectionLocation { section: SectionId::new(near, Gender::Female), x: 80.0, y: 0.0 },
            SectionLocation { section: SectionId::new(far, Gender::Male), x: 800.0, y: 0.0 },
        ];
        let mut origins = BTreeMap::new();
        origins.insert("G1".to_string(), (0.0, 0.0));
        ServerPoolSimulator::new(params, sections, origins, Some(3)).unwrap()
    }

    #[test]
    fn test_users_pick_nearest_same_gender_section() {
        let mut sim = simulator(15);
        let output = sim.run(&[passenger(0, Gender::Male), passenger(10, Gender::Female)]).unwrap();
        assert_eq!(output.visits.len(), 2);
        assert_eq!(output.visits[0].section.to_string(), "NEAR-M");
        assert_eq!(output.visits[1].section.to_string(), "NEAR-F");
        // 80 m at 80 m/min
        assert_eq!(output.visits[0].arrival, 60.0);
        assert!(output.visits.iter().all(|v| v.wait == 0.0));
    }

    #[test]
    fn test_single_server_queues_and_traces() {
        let mut sim = simulator(1);
        let output = sim.run(&[passenger(0, Gender::Female), passenger(0, Gender::Female)]).unwrap();
        let second = &output.visits[1];
        assert_eq!(second.service_start, output.visits[0].service_end);
        assert!(second.wait > 0.0);

        let trace = &output.queue_traces[&SectionId::new(RestroomId::new("NEAR"), Gender::Female)];
        assert_eq!(trace.len(), 4);
        assert_eq!(trace[1].waiting, 1);
        assert_eq!(trace.last().map(|e| e.waiting), Some(0));
    }

    #[test]
    fn test_waiting_time_series_buckets() {
        let mut sim = simulator(1);
        let output = sim.run(&[passenger(0, Gender::Female), passenger(0, Gender::Female)]).unwrap();
        let series = output.waiting_time_series(60.0, 5);
        let female = &series[&SectionId::new(RestroomId::new("NEAR"), Gender::Female)];
        assert_eq!(female.len(), 5);
        assert_eq!(female[0], 0.0);
        assert!(female[1] > 0.0);
    }

    #[test]
    fn test_no_restroom_users() {
        let mut sim = simulator(15);
        let mut p = passenger(0, Gender::Male);
        p.uses_restroom = false;
        assert!(matches!(sim.run(&[p]), Err(DemandError::EmptyDataset { .. })));
        assert!(matches!(sim.run(&[]), Err(DemandError::EmptyDataset { .. })));
    }

    #[test]
    fn test_unknown_origin() {
        let mut sim = simulator(15);
        let mut p = passenger(0, Gender::Male);
        p.origin = "Z9".to_string();
        assert_eq!(sim.run(&[p]), Err(DemandError::UnknownOrigin("Z9".to_string())));
    }
}
