//! Restroom flow simulator
//!
//! This module contains the RestroomSimulator and its time-stepped main loop.
//! Every step turns active flights into entry-point inflows, splits them over
//! same-gender restroom sections with an iterative fixed point (waiting times
//! depend on flows and flows on waiting times), then advances the queues.

use crate::assignment::AssignmentMethods;
use crate::crew::DemandSnapshot;
use crate::queue::{QueueDynamics, SectionSeries, SectionStatistics, StabilityReport};
use crate::simulation::{AssignmentOutcome, ConvergenceReport, SimulationResult, SimulationStatistics};
use crate::terminal::{FlightManager, FlightSummary, MovementModel, MovementSummary, TerminalLayout};
use crate::types::{AssignmentMethod, EntryPointId, Gender, RunId, SectionId, TerminalConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Everything a finished run produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutput {
    /// Run identifier
    pub run_id: RunId,
    /// Assignment policy used
    pub method: AssignmentMethod,
    /// Step length, seconds
    pub time_step: f64,
    /// Horizon, seconds
    pub duration: f64,
    /// Number of steps
    pub n_steps: usize,
    /// Seed recorded in the configuration
    pub seed: Option<u64>,
    /// Arrival, queue and waiting-time series per section
    pub sections: BTreeMap<SectionId, SectionSeries>,
    /// Stability classification per section
    pub stability: StabilityReport,
    /// Summary statistics per section
    pub section_statistics: BTreeMap<SectionId, SectionStatistics>,
    /// Iterations used by the assignment at every step
    pub convergence: ConvergenceReport,
    /// Run-level statistics
    pub statistics: SimulationStatistics,
    /// Entry point to restroom distances and travel times
    pub movement_summary: MovementSummary,
    /// Flight schedule summary
    pub flight_summary: FlightSummary,
}

impl SimulationOutput {
    /// Series of one section
    pub fn series(&self, section: &SectionId) -> Option<&SectionSeries> {
        self.sections.get(section)
    }

    /// Demand in the shape the crew optimizer consumes
    pub fn demand_snapshot(&self) -> DemandSnapshot {
        DemandSnapshot::from_series(&self.sections)
    }
}

/// Time-stepped restroom flow simulator
#[derive(Debug)]
pub struct RestroomSimulator {
    config: TerminalConfig,
    layout: TerminalLayout,
    assignment: AssignmentMethods,
    flights: FlightManager,
    queue: QueueDynamics,
    gender_sections: Vec<(Gender, f64, Vec<SectionId>)>,
    n_steps: usize,
}

impl RestroomSimulator {
    /// Create a simulator from a validated configuration
    #[instrument(skip(config), fields(
        restrooms = config.restrooms.len(),
        entry_points = config.entry_points.len(),
        flights = config.flights.len()
    ))]
    pub fn new(config: TerminalConfig) -> SimulationResult<Self> {
        config.validate()?;

        let layout = TerminalLayout::from_config(&config);
        let movement = MovementModel::new(&layout, config.movement_speeds.clone());
        let assignment = AssignmentMethods::new(config.choice_params.clone(), movement);
        let flights = FlightManager::new(&config);
        let n_steps = config.n_steps();
        let queue = QueueDynamics::new(&layout.sections(), n_steps, config.queue.clone());

        let male_share = config.simulation.male_share;
        let gender_sections = Gender::ALL
            .iter()
            .map(|&gender| {
                let share = match gender {
                    Gender::Male => male_share,
                    Gender::Female => 1.0 - male_share,
                };
                let sections = layout.sections_for(gender).into_iter().map(|s| s.id).collect();
                (gender, share, sections)
            })
            .collect();

        info!(
            sections = layout.sections().len(),
            n_steps,
            method = %config.simulation.method,
            "Restroom simulator initialized"
        );

        Ok(Self { config, layout, assignment, flights, queue, gender_sections, n_steps })
    }

    /// Configuration in force
    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    /// Terminal layout
    pub fn layout(&self) -> &TerminalLayout {
        &self.layout
    }

    /// Cost model and assignment policies
    pub fn assignment(&self) -> &AssignmentMethods {
        &self.assignment
    }

    /// Flight flows
    pub fn flights(&self) -> &FlightManager {
        &self.flights
    }

    /// Queue state
    pub fn queue(&self) -> &QueueDynamics {
        &self.queue
    }

    /// Number of steps in the horizon
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    fn dt(&self) -> f64 {
        self.config.simulation.time_step
    }

    /// Run the whole horizon from empty queues
    #[instrument(skip(self), fields(method = %self.config.simulation.method, n_steps = self.n_steps))]
    pub fn run(&mut self) -> SimulationResult<SimulationOutput> {
        let started = Instant::now();
        let run_id = RunId::new();
        let dt = self.dt();
        self.queue = QueueDynamics::new(&self.layout.sections(), self.n_steps, self.config.queue.clone());

        let mut convergence = ConvergenceReport::new(self.config.simulation.max_assignment_iterations);
        let mut statistics = SimulationStatistics::new(
            self.n_steps,
            self.layout.sections().len(),
            self.layout.entry_points.len(),
            self.flights.flows().len(),
        );

        let progress_interval = (self.n_steps / 10).max(1);
        for t in 0..self.n_steps {
            let outcome = self.step(t)?;
            convergence.record(t, &outcome);
            statistics.record_assignment(&outcome);

            if t % progress_interval == 0 {
                debug!(step = t, time = t as f64 * dt, iterations = outcome.iterations, "Simulation progress");
            }
        }

        let section_statistics = self.queue.all_statistics(dt);
        for (section, stats) in &section_statistics {
            statistics.record_section(section, stats);
        }
        let stability = self.queue.stability_report();
        statistics.record_stability(&stability);
        statistics.set_simulation_duration(started.elapsed());

        if !convergence.all_converged() {
            warn!(
                steps = convergence.non_converged_steps.len(),
                max_iterations = convergence.max_iterations,
                "Flow assignment hit the iteration cap"
            );
        }
        info!(
            %run_id,
            passengers = statistics.total_passengers,
            peak_queue = statistics.peak_queue_length,
            max_wait = statistics.max_waiting_time,
            stable = stability.overall_stable,
            "Simulation complete"
        );

        Ok(SimulationOutput {
            run_id,
            method: self.config.simulation.method,
            time_step: dt,
            duration: self.config.simulation.duration,
            n_steps: self.n_steps,
            seed: self.config.simulation.seed,
            sections: self.queue.all_series().clone(),
            stability,
            section_statistics,
            convergence,
            statistics,
            movement_summary: self.assignment.movement().summary(),
            flight_summary: self.flights.summary().clone(),
        })
    }

    /// Advance one step: inflows, assignment, queue update, waiting times
    pub fn step(&mut self, t: usize) -> SimulationResult<AssignmentOutcome> {
        let dt = self.dt();
        let inflows = self.flights.compute_inflows(t as f64 * dt);
        let outcome = self.assign_flows(t, &inflows)?;
        self.queue.update_queue_states(t, dt);
        self.queue.update_waiting_times(t);
        Ok(outcome)
    }

    /// Split entry-point inflows over sections until the flows stop moving
    ///
    /// Each iteration prices every section with the waiting times implied by
    /// the previous iteration's flows. Stops once the largest per-section
    /// change is below the convergence threshold or after the iteration cap.
    pub fn assign_flows(
        &mut self,
        t: usize,
        inflows: &BTreeMap<EntryPointId, f64>,
    ) -> SimulationResult<AssignmentOutcome> {
        let max_iterations = self.config.simulation.max_assignment_iterations.max(1);
        let threshold = self.config.simulation.convergence_threshold;
        let method = self.config.simulation.method;

        self.queue.reset_arrival_rates(t);
        let mut previous: BTreeMap<SectionId, f64> = self.queue.section_ids().map(|id| (id.clone(), 0.0)).collect();
        let mut max_change = 0.0;

        for iteration in 1..=max_iterations {
            let waits = self.queue.current_waiting_times(t);
            let mut flows: BTreeMap<SectionId, f64> = previous.keys().map(|id| (id.clone(), 0.0)).collect();

            for (entry, &inflow) in inflows.iter().filter(|(_, rate)| **rate > 0.0) {
                for (_, share, sections) in &self.gender_sections {
                    let costs = sections
                        .iter()
                        .map(|section| -> SimulationResult<(SectionId, f64)> {
                            let wait = waits.get(section).copied().unwrap_or(0.0);
                            Ok((section.clone(), self.assignment.generalized_cost(entry, section, wait)?))
                        })
                        .collect::<SimulationResult<Vec<_>>>()?;

                    for (section, flow) in self.assignment.assign(method, inflow * share, &costs) {
                        *flows.entry(section).or_insert(0.0) += flow;
                    }
                }
            }

            for (section, &rate) in &flows {
                self.queue.set_arrival_rate(section, t, rate)?;
            }

            max_change = flows
                .iter()
                .map(|(id, rate)| (rate - previous.get(id).copied().unwrap_or(0.0)).abs())
                .fold(0.0, f64::max);
            previous = flows;

            if max_change < threshold {
                return Ok(AssignmentOutcome { iterations: iteration, converged: true, max_change });
            }
        }

        debug!(step = t, max_change, "Flow assignment did not converge");
        Ok(AssignmentOutcome { iterations: max_iterations, converged: false, max_change })
    }
}
