//! Cleaning crew scheduling
//!
//! # Overview
//!
//! - **CleaningCrewOptimizer**: steps a crew through the horizon, reacting to
//!   waiting-time spikes and accumulated usage on top of routine cleanings
//! - **CrewMember** / **CleaningTask**: the mutable crew and task state
//! - **Scoring**: individual and team scores, cleaner limits per restroom
//! - **KPIs**: cost, responsiveness and quality indicators
//! - **OptimizationResults**: timelines, schedules and summaries, exportable
//!   with absolute timestamps
//!
//! # Usage Example
//!
//! ```rust
//! use airport_facility_sim::crew::*;
//! use airport_facility_sim::types::*;
//! use std::collections::BTreeMap;
//!
//! let mut restrooms = BTreeMap::new();
//! restrooms.insert(RestroomId::new("R1"), RestroomCapacity { floor: 1, capacity_m: 0.2, capacity_f: 0.2 });
//!
//! let mut travel = TravelTimeMatrix::new();
//! travel.insert_symmetric("Base_1", "R1", 60.0);
//! travel.insert_symmetric("Base_2", "R1", 90.0);
//!
//! let optimizer = CleaningCrewOptimizer::new(restrooms, travel, 3600.0, 60.0, CrewConfig::default()).unwrap();
//! let results = optimizer
//!     .run_optimization(&DemandSnapshot::default(), &[CleaningRequirement::new("R1", 1)])
//!     .unwrap();
//! assert_eq!(results.task_summary.total_tasks, 1);
//! ```

pub mod inputs;
pub mod kpi;
pub mod member;
pub mod optimizer;
pub mod results;
pub mod scoring;
pub mod task;

// Re-export all public types for convenience
pub use inputs::*;
pub use kpi::*;
pub use member::*;
pub use optimizer::*;
pub use results::*;
pub use scoring::*;
pub use task::*;
