//! Core types and identifiers for the terminal facility simulator
//!
//! Identifiers, enums and configuration shared by the restroom simulator
//! and the cleaning crew optimizer.
//!
//! # Overview
//!
//! - **Identifiers**: configured names for restrooms, entry points, flights and
//!   locations, composite section ids, numbered crew and task ids, UUID run ids
//! - **Enums**: genders, flow types, aircraft classes, assignment policies,
//!   crew statuses, cleaning types and stability classes
//! - **Configuration**: terminal and crew configuration with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use airport_facility_sim::types::*;
//!
//! let section = SectionId::new(RestroomId::new("R1"), Gender::Male);
//! assert_eq!(section.to_string(), "R1-M");
//!
//! let method: AssignmentMethod = "logit".parse().unwrap();
//! assert_eq!(method, AssignmentMethod::Logit);
//!
//! let config = TerminalConfig::default();
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod crew_config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use crew_config::*;
pub use enums::*;
pub use identifiers::*;
