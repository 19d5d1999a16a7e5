//! Statistics collection and reporting
//!
//! Run-level counters of the restroom flow simulation: how the per-step
//! assignment fixed point behaved, how much flow reached the restrooms and
//! where the worst queues formed.

use crate::queue::{SectionStatistics, StabilityReport};
use crate::types::{SectionId, StabilityClass};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Result of the iterative flow assignment at one time step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    /// Iterations used, at least one
    pub iterations: usize,
    /// Whether the largest flow change fell below the threshold
    pub converged: bool,
    /// Largest per-section flow change of the last iteration
    pub max_change: f64,
}

/// Per-step iteration counts of the assignment fixed point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceReport {
    /// Iteration cap in force
    pub max_iterations: usize,
    /// Iterations used at each step
    pub iterations_per_step: Vec<usize>,
    /// Steps that hit the cap without converging
    pub non_converged_steps: Vec<usize>,
}

impl ConvergenceReport {
    /// Create an empty report for the given iteration cap
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations, ..Self::default() }
    }

    /// Record the outcome of one step
    pub fn record(&mut self, step: usize, outcome: &AssignmentOutcome) {
        self.iterations_per_step.push(outcome.iterations);
        if !outcome.converged {
            self.non_converged_steps.push(step);
        }
    }

    /// Number of recorded steps
    pub fn steps(&self) -> usize {
        self.iterations_per_step.len()
    }

    /// Mean iterations per step
    pub fn average_iterations(&self) -> f64 {
        if self.iterations_per_step.is_empty() {
            0.0
        } else {
            self.iterations_per_step.iter().sum::<usize>() as f64 / self.iterations_per_step.len() as f64
        }
    }

    /// Whether every step converged
    pub fn all_converged(&self) -> bool {
        self.non_converged_steps.is_empty()
    }
}

/// Statistics of one simulation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationStatistics {
    // Model size
    /// Number of time steps
    pub time_steps: usize,
    /// Number of restroom sections
    pub total_sections: usize,
    /// Number of entry points
    pub total_entry_points: usize,
    /// Number of flights
    pub total_flights: usize,

    // Assignment
    /// Steps whose assignment converged
    pub converged_steps: usize,
    /// Steps that hit the iteration cap
    pub non_converged_steps: usize,
    /// Iterations summed over all steps
    pub total_iterations: usize,

    // Queues
    /// Passengers assigned to restrooms over the horizon
    pub total_passengers: f64,
    /// Longest queue of any section
    pub peak_queue_length: f64,
    /// Section holding the longest queue
    pub peak_queue_section: Option<SectionId>,
    /// Longest waiting time of any section
    pub max_waiting_time: f64,
    /// Section holding the longest waiting time
    pub max_waiting_section: Option<SectionId>,
    /// Sections per stability class
    pub sections_by_stability: BTreeMap<StabilityClass, usize>,

    /// Wall-clock duration of the run
    pub simulation_duration: Duration,
}

impl SimulationStatistics {
    /// Create statistics for a model of the given size
    pub fn new(time_steps: usize, total_sections: usize, total_entry_points: usize, total_flights: usize) -> Self {
        Self { time_steps, total_sections, total_entry_points, total_flights, ..Self::default() }
    }

    /// Count one step's assignment outcome
    pub fn record_assignment(&mut self, outcome: &AssignmentOutcome) {
        self.total_iterations += outcome.iterations;
        if outcome.converged {
            self.converged_steps += 1;
        } else {
            self.non_converged_steps += 1;
        }
    }

    /// Fold one section's summary into the run totals
    pub fn record_section(&mut self, section: &SectionId, stats: &SectionStatistics) {
        self.total_passengers += stats.total_passengers;
        if self.peak_queue_section.is_none() || stats.max_queue_length > self.peak_queue_length {
            self.peak_queue_length = stats.max_queue_length;
            self.peak_queue_section = Some(section.clone());
        }
        if self.max_waiting_section.is_none() || stats.max_waiting_time > self.max_waiting_time {
            self.max_waiting_time = stats.max_waiting_time;
            self.max_waiting_section = Some(section.clone());
        }
    }

    /// Count sections per stability class
    pub fn record_stability(&mut self, report: &StabilityReport) {
        self.sections_by_stability.clear();
        for section in report.sections.values() {
            *self.sections_by_stability.entry(section.class).or_insert(0) += 1;
        }
    }

    /// Set the wall-clock duration of the run
    pub fn set_simulation_duration(&mut self, duration: Duration) {
        self.simulation_duration = duration;
    }

    /// Number of sections in a stability class
    pub fn sections_in(&self, class: StabilityClass) -> usize {
        self.sections_by_stability.get(&class).copied().unwrap_or(0)
    }

    /// Percentage of steps whose assignment converged
    pub fn converged_percentage(&self) -> f64 {
        let steps = self.converged_steps + self.non_converged_steps;
        if steps == 0 {
            0.0
        } else {
            (self.converged_steps as f64 / steps as f64) * 100.0
        }
    }

    /// Mean assignment iterations per step
    pub fn average_iterations(&self) -> f64 {
        let steps = self.converged_steps + self.non_converged_steps;
        if steps == 0 {
            0.0
        } else {
            self.total_iterations as f64 / steps as f64
        }
    }

    /// Percentage of sections classified unstable
    pub fn unstable_percentage(&self) -> f64 {
        if self.total_sections == 0 {
            0.0
        } else {
            (self.sections_in(StabilityClass::Unstable) as f64 / self.total_sections as f64) * 100.0
        }
    }

    /// Generate a summary report
    pub fn generate_summary_report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Restroom Simulation Summary ===\n\n");
        report.push_str(&format!("Run Duration: {:.2} seconds\n", self.simulation_duration.as_secs_f64()));
        report.push_str(&format!("Time Steps: {}\n\n", self.time_steps));

        report.push_str("Terminal:\n");
        report.push_str(&format!("  • Sections: {}\n", self.total_sections));
        report.push_str(&format!("  • Entry Points: {}\n", self.total_entry_points));
        report.push_str(&format!("  • Flights: {}\n\n", self.total_flights));

        report.push_str("Flow Assignment:\n");
        report.push_str(&format!(
            "  • Converged Steps: {} ({:.1}%)\n",
            self.converged_steps,
            self.converged_percentage()
        ));
        report.push_str(&format!("  • Iteration Cap Reached: {}\n", self.non_converged_steps));
        report.push_str(&format!("  • Average Iterations: {:.2}\n\n", self.average_iterations()));

        report.push_str("Queues:\n");
        report.push_str(&format!("  • Passengers Assigned: {:.1}\n", self.total_passengers));
        if let Some(section) = &self.peak_queue_section {
            report.push_str(&format!("  • Peak Queue: {:.2} at {}\n", self.peak_queue_length, section));
        }
        if let Some(section) = &self.max_waiting_section {
            report.push_str(&format!("  • Max Wait: {:.1} s at {}\n", self.max_waiting_time, section));
        }
        report.push_str(&format!(
            "  • Stable / High Utilization / Unstable: {} / {} / {}\n",
            self.sections_in(StabilityClass::Stable),
            self.sections_in(StabilityClass::HighUtilization),
            self.sections_in(StabilityClass::Unstable)
        ));

        report
    }
}

impl fmt::Display for SimulationStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.generate_summary_report())
    }
}
