//! Continuous-flow queue state per restroom section
//!
//! Every section carries three series over the whole horizon: arrival rate
//! `lambda[t]`, queue length `L[t]` and expected waiting time `w[t]`. The
//! series are allocated once, zero-filled, and written in place by the
//! simulator. Within a step the order is fixed: arrival rates are written
//! first, then `L[t + 1]` is advanced from `L[t]`, then `w[t]` is recomputed.

use super::stability::{classify_section, StabilityReport};
use crate::simulation::{SimulationError, SimulationResult};
use crate::terminal::RestroomSection;
use crate::types::{QueueParams, SectionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Time series of one section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSeries {
    /// Service rate, pax/s
    pub capacity: f64,
    /// Arrival rate per step, pax/s
    pub arrival_rate: Vec<f64>,
    /// Queue length per step, pax
    pub queue_length: Vec<f64>,
    /// Expected waiting time per step, seconds
    pub waiting_time: Vec<f64>,
}

impl SectionSeries {
    fn new(capacity: f64, n_steps: usize) -> Self {
        Self {
            capacity,
            arrival_rate: vec![0.0; n_steps],
            queue_length: vec![0.0; n_steps],
            waiting_time: vec![0.0; n_steps],
        }
    }
}

/// Summary statistics of one section over the horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionStatistics {
    /// Longest queue, pax
    pub max_queue_length: f64,
    /// Mean queue, pax
    pub avg_queue_length: f64,
    /// Mean expected wait, seconds
    pub avg_waiting_time: f64,
    /// Longest expected wait, seconds
    pub max_waiting_time: f64,
    /// Highest arrival rate, pax/s
    pub peak_arrival_rate: f64,
    /// Mean arrival rate, pax/s
    pub avg_arrival_rate: f64,
    /// Arrivals integrated over the horizon, pax
    pub total_passengers: f64,
    /// Service rate, pax/s
    pub capacity: f64,
}

/// Queue state of every restroom section
#[derive(Debug, Clone)]
pub struct QueueDynamics {
    params: QueueParams,
    n_steps: usize,
    sections: BTreeMap<SectionId, SectionSeries>,
}

impl QueueDynamics {
    /// Allocate zeroed series for every section
    pub fn new(sections: &[RestroomSection], n_steps: usize, params: QueueParams) -> Self {
        let sections = sections
            .iter()
            .map(|section| (section.id.clone(), SectionSeries::new(section.capacity, n_steps)))
            .collect();
        Self { params, n_steps, sections }
    }

    /// Number of steps in the horizon
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Tuning constants
    pub fn params(&self) -> &QueueParams {
        &self.params
    }

    /// Section ids in order
    pub fn section_ids(&self) -> impl Iterator<Item = &SectionId> {
        self.sections.keys()
    }

    /// Series of one section
    pub fn series(&self, section: &SectionId) -> Option<&SectionSeries> {
        self.sections.get(section)
    }

    /// All series
    pub fn all_series(&self) -> &BTreeMap<SectionId, SectionSeries> {
        &self.sections
    }

    /// Consume the dynamics and keep the series
    pub fn into_series(self) -> BTreeMap<SectionId, SectionSeries> {
        self.sections
    }

    /// Expected waiting time for an arrival rate, capacity and existing queue
    ///
    /// Non-decreasing in both `arrival_rate` and `current_queue` for a fixed
    /// capacity. Arrival rates at or above `saturation_ratio * capacity` are
    /// held at that level.
    pub fn compute_waiting_time(&self, arrival_rate: f64, capacity: f64, current_queue: f64) -> f64 {
        if capacity <= 0.0 {
            return 0.0;
        }
        if arrival_rate <= 0.0 {
            return if current_queue > 0.0 { current_queue / capacity } else { 0.0 };
        }

        let saturated = capacity * self.params.saturation_ratio;
        let lambda = arrival_rate.min(saturated);
        let rho = lambda / capacity;
        let stable = rho < self.params.instability_ratio;

        if current_queue > 0.0 {
            let drain = current_queue / capacity;
            let steady_state = if stable { rho / (capacity * (1.0 - rho)) } else { current_queue / capacity };
            drain + steady_state
        } else if stable {
            let p_wait = rho / (1.0 + rho);
            (p_wait / (capacity - lambda)).max(0.0)
        } else {
            lambda / (capacity * capacity) * 10.0
        }
    }

    /// Replace the arrival rate of a section at step `t`
    pub fn set_arrival_rate(&mut self, section: &SectionId, t: usize, rate: f64) -> SimulationResult<()> {
        *self.arrival_slot(section, t)? = rate;
        Ok(())
    }

    /// Add to the arrival rate of a section at step `t`
    pub fn add_arrivals(&mut self, section: &SectionId, t: usize, rate: f64) -> SimulationResult<()> {
        *self.arrival_slot(section, t)? += rate;
        Ok(())
    }

    fn arrival_slot(&mut self, section: &SectionId, t: usize) -> SimulationResult<&mut f64> {
        let n_steps = self.n_steps;
        let series = self
            .sections
            .get_mut(section)
            .ok_or_else(|| SimulationError::UnknownSection(section.clone()))?;
        series.arrival_rate.get_mut(t).ok_or_else(|| {
            SimulationError::assignment_error(format!("step {} is outside the {}-step horizon", t, n_steps))
        })
    }

    /// Zero every section's arrival rate at step `t`
    pub fn reset_arrival_rates(&mut self, t: usize) {
        for series in self.sections.values_mut() {
            if let Some(rate) = series.arrival_rate.get_mut(t) {
                *rate = 0.0;
            }
        }
    }

    /// Advance every queue from `L[t]` to `L[t + 1]`
    ///
    /// Service ramps up with the queue, `capacity * min(1, L / service_ramp_queue)`,
    /// and results below `idle_snap_threshold` snap to zero. The last step has
    /// no successor and is left untouched.
    pub fn update_queue_states(&mut self, t: usize, dt: f64) {
        if t + 1 >= self.n_steps {
            return;
        }
        let ramp = self.params.service_ramp_queue;
        let snap = self.params.idle_snap_threshold;

        for series in self.sections.values_mut() {
            let queue = series.queue_length[t];
            let service_rate = if queue <= 0.0 { 0.0 } else { series.capacity * (queue / ramp).min(1.0) };
            let next = queue + dt * (series.arrival_rate[t] - service_rate);
            series.queue_length[t + 1] = if next < snap { 0.0 } else { next };
        }
    }

    /// Recompute and store `w[t]` for every section from `lambda[t]` and `L[t]`
    pub fn update_waiting_times(&mut self, t: usize) -> BTreeMap<SectionId, f64> {
        let waits = self.current_waiting_times(t);
        for (section, wait) in &waits {
            if let Some(series) = self.sections.get_mut(section) {
                series.waiting_time[t] = *wait;
            }
        }
        waits
    }

    /// Waiting times implied by the state at step `t`, without storing them
    pub fn current_waiting_times(&self, t: usize) -> BTreeMap<SectionId, f64> {
        if t >= self.n_steps {
            return BTreeMap::new();
        }
        self.sections
            .iter()
            .map(|(id, series)| {
                let wait = self.compute_waiting_time(series.arrival_rate[t], series.capacity, series.queue_length[t]);
                (id.clone(), wait)
            })
            .collect()
    }

    /// Summary statistics of one section
    pub fn section_statistics(&self, section: &SectionId, dt: f64) -> SimulationResult<SectionStatistics> {
        let series = self.series(section).ok_or_else(|| SimulationError::UnknownSection(section.clone()))?;
        Ok(SectionStatistics {
            max_queue_length: max(&series.queue_length),
            avg_queue_length: mean(&series.queue_length),
            avg_waiting_time: mean(&series.waiting_time),
            max_waiting_time: max(&series.waiting_time),
            peak_arrival_rate: max(&series.arrival_rate),
            avg_arrival_rate: mean(&series.arrival_rate),
            total_passengers: series.arrival_rate.iter().sum::<f64>() * dt,
            capacity: series.capacity,
        })
    }

    /// Summary statistics of every section
    pub fn all_statistics(&self, dt: f64) -> BTreeMap<SectionId, SectionStatistics> {
        self.sections
            .keys()
            .filter_map(|id| self.section_statistics(id, dt).ok().map(|stats| (id.clone(), stats)))
            .collect()
    }

    /// Utilization in percent, at step `t` or at the peak arrival rate when `t` is `None`
    pub fn capacity_utilization(&self, t: Option<usize>) -> BTreeMap<SectionId, f64> {
        self.sections
            .iter()
            .map(|(id, series)| {
                let rate = match t {
                    Some(t) => series.arrival_rate.get(t).copied().unwrap_or(0.0),
                    None => max(&series.arrival_rate),
                };
                let utilization = if series.capacity > 0.0 { rate / series.capacity * 100.0 } else { 0.0 };
                (id.clone(), utilization)
            })
            .collect()
    }

    /// Classify every section by its peak utilization
    pub fn stability_report(&self) -> StabilityReport {
        let mut report = StabilityReport::default();
        for (id, series) in &self.sections {
            report.insert(id.clone(), classify_section(&self.params, max(&series.arrival_rate), series.capacity));
        }
        report
    }
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::max)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gender, RestroomId, StabilityClass};

    fn section(name: &str, gender: Gender) -> SectionId {
        SectionId::new(RestroomId::new(name), gender)
    }

    fn dynamics(n_steps: usize) -> QueueDynamics {
        let sections = vec![
            RestroomSection { id: section("R1", Gender::Male), capacity: 0.2 },
            RestroomSection { id: section("R1", Gender::Female), capacity: 0.2 },
        ];
        QueueDynamics::new(&sections, n_steps, QueueParams::default())
    }

    #[test]
    fn test_waiting_time_without_arrivals() {
        let queue = dynamics(4);
        assert_eq!(queue.compute_waiting_time(0.0, 0.2, 0.0), 0.0);
        assert!((queue.compute_waiting_time(0.0, 0.2, 3.0) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_waiting_time_empty_queue_formula() {
        let queue = dynamics(4);
        // rho = 0.5, P_wait = 1/3, wait = (1/3) / 0.1
        let wait = queue.compute_waiting_time(0.1, 0.2, 0.0);
        assert!((wait - 10.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_waiting_time_with_queue() {
        let queue = dynamics(4);
        // drain 2 / 0.2 = 10, steady state 0.5 / (0.2 * 0.5) = 5
        let wait = queue.compute_waiting_time(0.1, 0.2, 2.0);
        assert!((wait - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_waiting_time_saturates_near_capacity() {
        let queue = dynamics(4);
        let at_saturation = queue.compute_waiting_time(0.19, 0.2, 0.0);
        let over_capacity = queue.compute_waiting_time(0.5, 0.2, 0.0);
        assert!(at_saturation.is_finite());
        assert!((at_saturation - over_capacity).abs() < 1e-9);
    }

    #[test]
    fn test_waiting_time_monotone() {
        let queue = dynamics(4);
        let capacity = 0.2;
        for &q in &[0.0, 0.5, 3.0] {
            let mut previous = 0.0;
            for i in 0..=60 {
                let lambda = i as f64 * 0.005;
                let wait = queue.compute_waiting_time(lambda, capacity, q);
                assert!(wait + 1e-12 >= previous, "lambda {} q {}: {} < {}", lambda, q, wait, previous);
                previous = wait;
            }
        }
        for &lambda in &[0.0, 0.05, 0.15, 0.3] {
            let mut previous = 0.0;
            for i in 0..=40 {
                let q = i as f64 * 0.25;
                let wait = queue.compute_waiting_time(lambda, capacity, q);
                assert!(wait + 1e-12 >= previous, "lambda {} q {}: {} < {}", lambda, q, wait, previous);
                previous = wait;
            }
        }
    }

    #[test]
    fn test_update_queue_states_integrates_and_snaps() {
        let mut queue = dynamics(4);
        let men = section("R1", Gender::Male);
        queue.set_arrival_rate(&men, 0, 0.5).unwrap();
        queue.update_queue_states(0, 10.0);
        // empty queue serves nothing: 0 + 10 * 0.5
        assert!((queue.series(&men).unwrap().queue_length[1] - 5.0).abs() < 1e-12);

        // at L = 5 service runs at full capacity: 5 + 10 * (0 - 0.2) = 3
        queue.update_queue_states(1, 10.0);
        assert!((queue.series(&men).unwrap().queue_length[2] - 3.0).abs() < 1e-12);

        // 3 - 10 * 0.2 * 1 = 1
        queue.update_queue_states(2, 10.0);
        assert!((queue.series(&men).unwrap().queue_length[3] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_last_step_not_advanced() {
        let mut queue = dynamics(2);
        let men = section("R1", Gender::Male);
        queue.set_arrival_rate(&men, 1, 1.0).unwrap();
        queue.update_queue_states(1, 10.0);
        assert_eq!(queue.series(&men).unwrap().queue_length, vec![0.0, 0.0]);
    }

    #[test]
    fn test_small_residual_snaps_to_zero() {
        let mut queue = dynamics(3);
        let women = section("R1", Gender::Female);
        queue.set_arrival_rate(&women, 0, 0.0009).unwrap();
        queue.update_queue_states(0, 10.0);
        assert_eq!(queue.series(&women).unwrap().queue_length[1], 0.0);
    }

    #[test]
    fn test_set_and_add_arrivals() {
        let mut queue = dynamics(3);
        let men = section("R1", Gender::Male);
        queue.set_arrival_rate(&men, 1, 0.1).unwrap();
        queue.add_arrivals(&men, 1, 0.05).unwrap();
        assert!((queue.series(&men).unwrap().arrival_rate[1] - 0.15).abs() < 1e-12);
        queue.set_arrival_rate(&men, 1, 0.02).unwrap();
        assert_eq!(queue.series(&men).unwrap().arrival_rate[1], 0.02);

        queue.reset_arrival_rates(1);
        assert_eq!(queue.series(&men).unwrap().arrival_rate[1], 0.0);

        let unknown = section("R9", Gender::Male);
        assert!(matches!(queue.set_arrival_rate(&unknown, 0, 1.0), Err(SimulationError::UnknownSection(_))));
        assert!(queue.add_arrivals(&men, 3, 1.0).is_err());
    }

    #[test]
    fn test_update_waiting_times_stores_series() {
        let mut queue = dynamics(3);
        let men = section("R1", Gender::Male);
        queue.set_arrival_rate(&men, 0, 0.1).unwrap();
        let waits = queue.update_waiting_times(0);
        assert!((waits[&men] - 10.0 / 3.0).abs() < 1e-9);
        assert_eq!(queue.series(&men).unwrap().waiting_time[0], waits[&men]);
        assert_eq!(waits[&section("R1", Gender::Female)], 0.0);
    }

    #[test]
    fn test_statistics_and_utilization() {
        let mut queue = dynamics(4);
        let men = section("R1", Gender::Male);
        queue.set_arrival_rate(&men, 0, 0.1).unwrap();
        queue.set_arrival_rate(&men, 1, 0.19).unwrap();

        let stats = queue.section_statistics(&men, 10.0).unwrap();
        assert!((stats.peak_arrival_rate - 0.19).abs() < 1e-12);
        assert!((stats.total_passengers - 2.9).abs() < 1e-9);
        assert_eq!(stats.capacity, 0.2);

        let utilization = queue.capacity_utilization(None);
        assert!((utilization[&men] - 95.0).abs() < 1e-9);
        assert!((queue.capacity_utilization(Some(0))[&men] - 50.0).abs() < 1e-9);

        let report = queue.stability_report();
        assert_eq!(report.sections[&men].class, StabilityClass::HighUtilization);
        assert_eq!(report.sections[&section("R1", Gender::Female)].class, StabilityClass::Stable);
        assert!(report.overall_stable);
    }
}
