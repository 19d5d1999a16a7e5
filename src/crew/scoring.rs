//! Crew assignment scoring and team selection

use super::{CleaningTask, CrewMember};
use crate::types::CleaningType;

/// Score of one crew member for one task, higher is better
///
/// Rewards skill on deep cleans and high-priority work, penalizes travel
/// (2 points per second) and labor cost, adds a flat bonus when the deadline
/// is closer than `urgency_window`, and favors high passenger impact.
pub fn individual_score(
    crew: &CrewMember,
    task: &CleaningTask,
    travel_time: f64,
    now: f64,
    urgency_window: f64,
) -> f64 {
    let mut score = 0.0;

    if task.cleaning_type == CleaningType::DeepClean {
        score += crew.skill_level * 20.0;
    } else if task.is_high_priority() {
        score += crew.skill_level * 15.0;
    }

    score -= travel_time * 2.0;

    if let Some(deadline) = task.deadline {
        if deadline - now < urgency_window {
            score += 30.0;
        }
    }

    score -= crew.hourly_rate * task.estimated_duration / 60.0 * 0.5;
    score += task.passenger_impact * 0.3;
    score
}

/// Score of a team from its members' individual scores and skills
///
/// The mean individual score plus 10 per member and 5 per point of average
/// skill.
pub fn team_score(individual_scores: &[f64], skill_levels: &[f64]) -> f64 {
    if individual_scores.is_empty() {
        return f64::NEG_INFINITY;
    }
    let n = individual_scores.len() as f64;
    let mean = individual_scores.iter().sum::<f64>() / n;
    let avg_skill = if skill_levels.is_empty() { 0.0 } else { skill_levels.iter().sum::<f64>() / skill_levels.len() as f64 };
    mean + n * 10.0 + avg_skill * 5.0
}

/// Maximum simultaneous cleaners a restroom admits, by total capacity
pub fn max_cleaners(total_capacity: f64) -> usize {
    if total_capacity > 0.5 {
        3
    } else if total_capacity > 0.35 {
        2
    } else {
        1
    }
}

/// Team size to aim for given task priority and free cleaner slots
pub fn target_team_size(priority: u8, available_slots: usize) -> usize {
    if priority >= 4 {
        available_slots.min(2)
    } else {
        available_slots.min(1)
    }
}

/// All `k`-element index combinations of `0..n` in lexicographic order
pub fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    if k == 0 || k > n {
        return result;
    }
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        result.push(indices.clone());
        let mut i = k;
        loop {
            if i == 0 {
                return result;
            }
            i -= 1;
            if indices[i] != i + n - k {
                break;
            }
        }
        indices[i] += 1;
        for j in i + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}

/// A crew member eligible for a task together with their score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<K> {
    /// Crew key
    pub key: K,
    /// Individual score for the task
    pub score: f64,
    /// Skill level
    pub skill: f64,
}

/// Pick the best team of at most `target` members
///
/// A target of one takes the best individual. Larger targets compare every
/// combination of every size up to the target by [`team_score`]. Ties keep
/// the earliest candidate order.
pub fn best_team<K: Copy>(candidates: &[Candidate<K>], target: usize) -> Option<Vec<K>> {
    if candidates.is_empty() || target == 0 {
        return None;
    }

    if target == 1 {
        let mut best = &candidates[0];
        for candidate in &candidates[1..] {
            if candidate.score > best.score {
                best = candidate;
            }
        }
        return Some(vec![best.key]);
    }

    let mut best: Option<(f64, Vec<usize>)> = None;
    for size in 1..=target.min(candidates.len()) {
        for combo in combinations(candidates.len(), size) {
            let scores: Vec<f64> = combo.iter().map(|&i| candidates[i].score).collect();
            let skills: Vec<f64> = combo.iter().map(|&i| candidates[i].skill).collect();
            let score = team_score(&scores, &skills);
            if best.as_ref().map_or(true, |(s, _)| score > *s) {
                best = Some((score, combo));
            }
        }
    }

    best.map(|(_, combo)| combo.into_iter().map(|i| candidates[i].key).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CrewConfig, CrewId, RestroomId, TaskId};

    fn crew(index: usize) -> CrewMember {
        let config = CrewConfig::default();
        CrewMember::from_spec(CrewId(index as u32 + 1), &config.crew_members[index])
    }

    #[test]
    fn test_individual_score_components() {
        let alice = crew(0);
        let task = CleaningTask::new(TaskId(1), RestroomId::new("R1"), CleaningType::Routine, 2, 15.0, 0.0)
            .with_deadline(10_000.0);
        // labor only: 22 * 15 / 60 * 0.5
        assert!((individual_score(&alice, &task, 0.0, 0.0, 1800.0) + 2.75).abs() < 1e-9);
        // travel costs 2 per second
        assert!((individual_score(&alice, &task, 10.0, 0.0, 1800.0) + 22.75).abs() < 1e-9);
        // close deadline earns the bonus
        assert!((individual_score(&alice, &task, 0.0, 9_000.0, 1800.0) - 27.25).abs() < 1e-9);
    }

    #[test]
    fn test_skill_weight_for_urgent_and_deep_cleans() {
        let henry = crew(2);
        let urgent = CleaningTask::new(TaskId(1), RestroomId::new("R1"), CleaningType::CallIn, 4, 20.0, 0.0);
        let deep = CleaningTask::new(TaskId(2), RestroomId::new("R1"), CleaningType::DeepClean, 2, 20.0, 0.0);
        let labor = 25.0 * 20.0 / 60.0 * 0.5;
        assert!((individual_score(&henry, &urgent, 0.0, 0.0, 1800.0) - (30.0 - labor)).abs() < 1e-9);
        assert!((individual_score(&henry, &deep, 0.0, 0.0, 1800.0) - (40.0 - labor)).abs() < 1e-9);
    }

    #[test]
    fn test_cleaner_limits() {
        assert_eq!(max_cleaners(0.6), 3);
        assert_eq!(max_cleaners(0.4), 2);
        assert_eq!(max_cleaners(0.3), 1);
        assert_eq!(target_team_size(5, 3), 2);
        assert_eq!(target_team_size(3, 3), 1);
        assert_eq!(target_team_size(4, 1), 1);
    }

    #[test]
    fn test_combinations() {
        assert_eq!(combinations(3, 2), vec![vec![0, 1], vec![0, 2], vec![1, 2]]);
        assert_eq!(combinations(2, 3), Vec::<Vec<usize>>::new());
        assert_eq!(combinations(4, 1).len(), 4);
        assert_eq!(combinations(5, 3).len(), 10);
    }

    #[test]
    fn test_best_team() {
        let candidates = vec![
            Candidate { key: 1, score: 5.0, skill: 1.0 },
            Candidate { key: 2, score: 8.0, skill: 2.0 },
            Candidate { key: 3, score: 8.0, skill: 1.0 },
        ];
        assert_eq!(best_team(&candidates, 1), Some(vec![2]));
        // pair bonus outweighs the drop in mean score
        assert_eq!(best_team(&candidates, 2), Some(vec![2, 3]));
        assert_eq!(best_team::<u32>(&[], 2), None);
    }
}
