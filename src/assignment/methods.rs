//! Generalized cost and flow-splitting policies
//!
//! A passenger's disutility of a restroom section is
//! `beta_walk * travel + beta_wait * wait + beta_vertical * floor_diff * scale`.
//! A total flow is then split over the candidate sections by one of three
//! policies. Candidates are passed as ordered `(key, cost)` slices and results
//! come back in the same order, which keeps tie-breaking deterministic.

use crate::simulation::SimulationResult;
use crate::terminal::MovementModel;
use crate::types::{AssignmentMethod, ChoiceParams, EntryPointId, SectionId};
use serde::{Deserialize, Serialize};

/// Cost and choice analysis of one candidate set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentSummary<K> {
    /// Number of candidates
    pub candidates: usize,
    /// Cheapest candidate, which the deterministic policy picks
    pub min_cost_key: K,
    /// Lowest cost
    pub min_cost: f64,
    /// Highest cost
    pub max_cost: f64,
    /// Logit choice probabilities in candidate order
    pub logit_probabilities: Vec<(K, f64)>,
    /// Shannon entropy of the logit probabilities, in nats
    pub logit_entropy: f64,
}

/// Choice model over restroom sections
#[derive(Debug, Clone)]
pub struct AssignmentMethods {
    params: ChoiceParams,
    movement: MovementModel,
}

impl AssignmentMethods {
    /// Create the choice model
    pub fn new(params: ChoiceParams, movement: MovementModel) -> Self {
        Self { params, movement }
    }

    /// Choice coefficients
    pub fn params(&self) -> &ChoiceParams {
        &self.params
    }

    /// Movement model used for travel times
    pub fn movement(&self) -> &MovementModel {
        &self.movement
    }

    /// Generalized cost of reaching a section from an entry point
    pub fn generalized_cost(
        &self,
        entry: &EntryPointId,
        section: &SectionId,
        waiting_time: f64,
    ) -> SimulationResult<f64> {
        let leg = self.movement.leg(entry, &section.restroom)?;
        Ok(self.cost_from_components(leg.travel_time, waiting_time, leg.floor_diff))
    }

    /// Generalized cost from its components
    pub fn cost_from_components(&self, travel_time: f64, waiting_time: f64, floor_diff: u32) -> f64 {
        self.params.beta_walk * travel_time
            + self.params.beta_wait * waiting_time
            + self.params.beta_vertical * f64::from(floor_diff) * self.params.vertical_penalty_scale
    }

    /// Split `total_flow` over the candidates with the given policy
    pub fn assign<K: Clone>(&self, method: AssignmentMethod, total_flow: f64, costs: &[(K, f64)]) -> Vec<(K, f64)> {
        match method {
            AssignmentMethod::Logit => self.assign_logit(total_flow, costs),
            AssignmentMethod::Deterministic => assign_deterministic(total_flow, costs),
            AssignmentMethod::Proportional => assign_proportional(total_flow, costs),
        }
    }

    /// Multinomial logit split, flow proportional to `exp(-theta * cost)`
    pub fn assign_logit<K: Clone>(&self, total_flow: f64, costs: &[(K, f64)]) -> Vec<(K, f64)> {
        if costs.is_empty() || total_flow <= 0.0 {
            return zero_flows(costs);
        }
        self.choice_probabilities(costs)
            .into_iter()
            .map(|(key, probability)| (key, total_flow * probability))
            .collect()
    }

    /// Logit choice probabilities without assigning any flow
    ///
    /// Utilities are shifted by their maximum before exponentiating. When the
    /// exponentials still sum to zero or overflow, every candidate gets an
    /// equal share.
    pub fn choice_probabilities<K: Clone>(&self, costs: &[(K, f64)]) -> Vec<(K, f64)> {
        if costs.is_empty() {
            return Vec::new();
        }
        let utilities: Vec<f64> = costs.iter().map(|(_, cost)| -self.params.theta * cost).collect();
        let max_utility = utilities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = utilities.iter().map(|u| (u - max_utility).exp()).collect();
        let sum: f64 = weights.iter().sum();

        if sum == 0.0 || !sum.is_finite() {
            return equal_split(1.0, costs);
        }
        costs.iter().zip(weights).map(|((key, _), weight)| (key.clone(), weight / sum)).collect()
    }

    /// Cost and choice analysis of a candidate set, `None` when it is empty
    pub fn summary<K: Clone>(&self, costs: &[(K, f64)]) -> Option<AssignmentSummary<K>> {
        let (min_index, _) = min_cost_index(costs)?;
        let max_cost = costs.iter().map(|(_, cost)| *cost).fold(f64::NEG_INFINITY, f64::max);
        let logit_probabilities = self.choice_probabilities(costs);
        let logit_entropy = -logit_probabilities
            .iter()
            .filter(|(_, p)| *p > 0.0)
            .map(|(_, p)| p * p.ln())
            .sum::<f64>();

        Some(AssignmentSummary {
            candidates: costs.len(),
            min_cost_key: costs[min_index].0.clone(),
            min_cost: costs[min_index].1,
            max_cost,
            logit_probabilities,
            logit_entropy,
        })
    }
}

/// All flow to the cheapest candidate, the first one on ties
pub fn assign_deterministic<K: Clone>(total_flow: f64, costs: &[(K, f64)]) -> Vec<(K, f64)> {
    if costs.is_empty() || total_flow <= 0.0 {
        return zero_flows(costs);
    }
    let winner = min_cost_index(costs).map(|(index, _)| index);
    costs
        .iter()
        .enumerate()
        .map(|(index, (key, _))| (key.clone(), if Some(index) == winner { total_flow } else { 0.0 }))
        .collect()
}

/// Flow proportional to `max_cost - cost + 1`
pub fn assign_proportional<K: Clone>(total_flow: f64, costs: &[(K, f64)]) -> Vec<(K, f64)> {
    if costs.is_empty() || total_flow <= 0.0 {
        return zero_flows(costs);
    }
    let max_cost = costs.iter().map(|(_, cost)| *cost).fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = costs.iter().map(|(_, cost)| max_cost - cost + 1.0).collect();
    let total: f64 = weights.iter().sum();

    if total <= 0.0 || !total.is_finite() {
        return equal_split(total_flow, costs);
    }
    costs.iter().zip(weights).map(|((key, _), weight)| (key.clone(), total_flow * weight / total)).collect()
}

fn min_cost_index<K>(costs: &[(K, f64)]) -> Option<(usize, f64)> {
    costs.iter().enumerate().fold(None, |best, (index, (_, cost))| match best {
        Some((_, best_cost)) if *cost >= best_cost => best,
        _ => Some((index, *cost)),
    })
}

fn zero_flows<K: Clone>(costs: &[(K, f64)]) -> Vec<(K, f64)> {
    costs.iter().map(|(key, _)| (key.clone(), 0.0)).collect()
}

fn equal_split<K: Clone>(total: f64, costs: &[(K, f64)]) -> Vec<(K, f64)> {
    let share = total / costs.len() as f64;
    costs.iter().map(|(key, _)| (key.clone(), share)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::TerminalLayout;
    use crate::types::{Gender, RestroomId, TerminalConfig};

    fn methods(theta: f64) -> AssignmentMethods {
        let mut config = TerminalConfig::default();
        config.choice_params.theta = theta;
        let movement = MovementModel::new(&TerminalLayout::from_config(&config), config.movement_speeds.clone());
        AssignmentMethods::new(config.choice_params, movement)
    }

    fn sum(flows: &[(&str, f64)]) -> f64 {
        flows.iter().map(|(_, f)| f).sum()
    }

    #[test]
    fn test_generalized_cost() {
        let methods = methods(0.1);
        let section = SectionId::new(RestroomId::new("R2"), Gender::Male);
        let cost = methods.generalized_cost(&EntryPointId::new("G1"), &section, 12.0).unwrap();
        let travel = 6500f64.sqrt() / 1.3 + 8.0;
        // One floor change at beta_vertical 2 and scale 10 adds 20
        assert!((cost - (travel + 12.0 + 20.0)).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic_takes_cheapest() {
        let costs = [("a", 1.0), ("b", 5.0), ("c", 3.0)];
        let flows = assign_deterministic(2.5, &costs);
        assert_eq!(flows, vec![("a", 2.5), ("b", 0.0), ("c", 0.0)]);

        let tied = assign_deterministic(1.0, &[("x", 2.0), ("y", 2.0)]);
        assert_eq!(tied, vec![("x", 1.0), ("y", 0.0)]);
    }

    #[test]
    fn test_logit_conserves_flow_and_prefers_cheaper() {
        let methods = methods(0.1);
        let costs = [("a", 10.0), ("b", 20.0), ("c", 40.0)];
        let flows = methods.assign_logit(3.0, &costs);
        assert!((sum(&flows) - 3.0).abs() < 1e-9);
        assert!(flows[0].1 > flows[1].1 && flows[1].1 > flows[2].1);
    }

    #[test]
    fn test_logit_equal_split_as_theta_vanishes() {
        let methods = methods(0.0);
        let flows = methods.assign_logit(1.0, &[("a", 1.0), ("b", 500.0), ("c", 9000.0)]);
        for (_, flow) in flows {
            assert!((flow - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_logit_survives_extreme_costs() {
        let methods = methods(50.0);
        let flows = methods.assign_logit(1.0, &[("a", 1e6), ("b", 1e6 + 1.0)]);
        assert!((sum(&flows) - 1.0).abs() < 1e-12);
        assert!(flows[0].1 > 0.99);
    }

    #[test]
    fn test_proportional() {
        let flows = assign_proportional(6.0, &[("a", 1.0), ("b", 3.0)]);
        // weights 3 and 1
        assert!((flows[0].1 - 4.5).abs() < 1e-12);
        assert!((flows[1].1 - 1.5).abs() < 1e-12);

        let equal = assign_proportional(2.0, &[("a", 7.0), ("b", 7.0)]);
        assert_eq!(equal, vec![("a", 1.0), ("b", 1.0)]);
    }

    #[test]
    fn test_empty_or_non_positive_flow() {
        let methods = methods(0.1);
        let empty: [(&str, f64); 0] = [];
        assert!(methods.assign(AssignmentMethod::Logit, 1.0, &empty).is_empty());

        for method in [AssignmentMethod::Logit, AssignmentMethod::Deterministic, AssignmentMethod::Proportional] {
            let flows = methods.assign(method, 0.0, &[("a", 1.0), ("b", 2.0)]);
            assert_eq!(flows, vec![("a", 0.0), ("b", 0.0)]);
        }
    }

    #[test]
    fn test_summary_entropy() {
        let methods = methods(0.0);
        let summary = methods.summary(&[("a", 3.0), ("b", 1.0)]).unwrap();
        assert_eq!(summary.min_cost_key, "b");
        assert_eq!(summary.max_cost, 3.0);
        assert!((summary.logit_entropy - 2f64.ln()).abs() < 1e-12);
        assert!(methods.summary::<&str>(&[]).is_none());
    }
}
