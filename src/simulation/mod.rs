//! Restroom flow simulation runs and their supporting services
//!
//! This module contains the restroom flow simulator, time conversion,
//! statistics collection, logging setup and error handling.
//!
//! # Overview
//!
//! - **RestroomSimulator**: steps flights through iterative flow assignment
//!   into the section queues and collects a `SimulationOutput`
//! - **TimeManager**: converts simulation seconds to UTC timestamps
//! - **SimulationStatistics**: run-level counters and a printable summary
//! - **SimulationError**: error taxonomy with recovery strategies
//! - **LoggingConfig**: `tracing` subscriber setup
//!
//! # Usage Example
//!
//! ```rust
//! use airport_facility_sim::simulation::*;
//! use airport_facility_sim::types::*;
//!
//! let mut config = TerminalConfig::default();
//! config.simulation.duration = 1200.0;
//!
//! let mut simulator = RestroomSimulator::new(config).unwrap();
//! let output = simulator.run().unwrap();
//! assert_eq!(output.n_steps, 120);
//!
//! let clock = TimeManager::new(DEFAULT_BASE_EPOCH).unwrap();
//! assert_eq!(clock.to_iso8601(3600.0), "2024-01-01T01:00:00Z");
//! ```

pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod statistics;
pub mod time_manager;

// Re-export all public types for convenience
pub use error::*;
pub use logging::*;
pub use orchestrator::*;
pub use statistics::*;
pub use time_manager::*;
