//! Passenger choice and flow assignment
//!
//! # Overview
//!
//! - **AssignmentMethods**: generalized cost of reaching a restroom section and
//!   the logit policy, which depends on the choice coefficients
//! - **assign_deterministic** / **assign_proportional**: coefficient-free policies
//!
//! # Usage Example
//!
//! ```rust
//! use airport_facility_sim::assignment::*;
//!
//! let flows = assign_deterministic(2.0, &[("R1-M", 4.0), ("R2-M", 1.0)]);
//! assert_eq!(flows, vec![("R1-M", 0.0), ("R2-M", 2.0)]);
//! ```

pub mod methods;

pub use methods::*;
