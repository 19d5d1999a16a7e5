//! Terminal geometry, passenger movement and flight-driven demand
//!
//! This module turns the static parts of a terminal configuration into the
//! models the simulator queries every time step.
//!
//! # Overview
//!
//! - **TerminalLayout**: entry points, restrooms and their gender sections
//! - **MovementModel**: precomputed 3D distances and travel times between
//!   every entry point and restroom
//! - **FlightManager**: rectangular per-flight passenger flows mapped to entry points
//!
//! # Usage Example
//!
//! ```rust
//! use airport_facility_sim::terminal::*;
//! use airport_facility_sim::types::*;
//!
//! let config = TerminalConfig::default();
//! let layout = TerminalLayout::from_config(&config);
//! let movement = MovementModel::new(&layout, config.movement_speeds.clone());
//! let travel = movement.travel_time(&EntryPointId::new("G1"), &RestroomId::new("R1")).unwrap();
//! assert!(travel > 0.0);
//!
//! let flights = FlightManager::new(&config);
//! let inflows = flights.compute_inflows(900.0);
//! assert!(inflows[&EntryPointId::new("G1")] > 0.0);
//! ```

pub mod flights;
pub mod layout;
pub mod movement;

// Re-export all public types for convenience
pub use flights::*;
pub use layout::*;
pub use movement::*;
