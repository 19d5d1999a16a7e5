//! Stability classification of restroom sections

use crate::types::{QueueParams, SectionId, StabilityClass};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Peak load and classification of one section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionStability {
    /// Stability class
    pub class: StabilityClass,
    /// Highest arrival rate over the horizon, pax/s
    pub peak_arrival: f64,
    /// Service rate, pax/s
    pub capacity: f64,
    /// Peak utilization in percent
    pub utilization_percent: f64,
}

/// Stability of every section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StabilityReport {
    /// Per-section classification
    pub sections: BTreeMap<SectionId, SectionStability>,
    /// One line per unstable section
    pub warnings: Vec<String>,
    /// True when no section is unstable
    pub overall_stable: bool,
}

impl StabilityReport {
    pub(crate) fn insert(&mut self, id: SectionId, stability: SectionStability) {
        if stability.class == StabilityClass::Unstable {
            self.warnings.push(format!(
                "{}: arrival rate {:.3} exceeds capacity {:.3}",
                id, stability.peak_arrival, stability.capacity
            ));
        }
        self.sections.insert(id, stability);
        self.overall_stable = self.sections.values().all(|s| s.class != StabilityClass::Unstable);
    }

    /// Sections in one class
    pub fn sections_in(&self, class: StabilityClass) -> Vec<&SectionId> {
        self.sections.iter().filter(|(_, s)| s.class == class).map(|(id, _)| id).collect()
    }
}

/// Classify a section from its peak arrival rate
///
/// Peaks at or above `instability_ratio * capacity` are unstable, peaks above
/// `high_utilization_percent` are highly utilized, everything else is stable.
pub fn classify_section(params: &QueueParams, peak_arrival: f64, capacity: f64) -> SectionStability {
    let utilization_percent = if capacity > 0.0 { peak_arrival / capacity * 100.0 } else { 0.0 };
    let class = if peak_arrival >= capacity * params.instability_ratio {
        warn!(peak_arrival, capacity, "Section peak arrival rate reaches capacity");
        StabilityClass::Unstable
    } else if utilization_percent > params.high_utilization_percent {
        StabilityClass::HighUtilization
    } else {
        StabilityClass::Stable
    };

    SectionStability { class, peak_arrival, capacity, utilization_percent }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gender, RestroomId};

    #[test]
    fn test_classification_bands() {
        let params = QueueParams::default();
        assert_eq!(classify_section(&params, 0.1, 0.2).class, StabilityClass::Stable);
        assert_eq!(classify_section(&params, 0.17, 0.2).class, StabilityClass::Stable);
        assert_eq!(classify_section(&params, 0.185, 0.2).class, StabilityClass::HighUtilization);
        assert_eq!(classify_section(&params, 0.199, 0.2).class, StabilityClass::Unstable);
        assert_eq!(classify_section(&params, 0.3, 0.2).class, StabilityClass::Unstable);
    }

    #[test]
    fn test_report_tracks_unstable_sections() {
        let params = QueueParams::default();
        let mut report = StabilityReport::default();
        let calm = SectionId::new(RestroomId::new("R1"), Gender::Male);
        let busy = SectionId::new(RestroomId::new("R1"), Gender::Female);

        report.insert(calm.clone(), classify_section(&params, 0.05, 0.2));
        assert!(report.overall_stable);

        report.insert(busy.clone(), classify_section(&params, 0.25, 0.2));
        assert!(!report.overall_stable);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("R1-F"));
        assert_eq!(report.sections_in(StabilityClass::Unstable), vec![&busy]);
        assert_eq!(report.sections_in(StabilityClass::Stable), vec![&calm]);
    }
}
