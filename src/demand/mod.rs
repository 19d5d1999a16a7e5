//! Passenger-level demand
//!
//! # Overview
//!
//! - **PassengerGenerator**: expands flight records into individual
//!   passengers with entry times, restroom use and gender
//! - **ServerPoolSimulator**: batch-assigns restroom users to sections and
//!   serves them with parallel exponential servers, producing waiting-time
//!   series the crew optimizer can react to
//!
//! # Usage Example
//!
//! ```rust
//! use airport_facility_sim::demand::*;
//! use chrono::{NaiveDate, TimeZone, Utc};
//!
//! let noon = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
//! let flights = vec![FlightRecord::arrival("AA100", noon, "A1", 120)];
//!
//! let mut generator = PassengerGenerator::new(PassengerBehavior::default(), Some(42)).unwrap();
//! let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let passengers = generator.generate_for_day(&flights, day).unwrap();
//! assert_eq!(passengers.len(), 120);
//! ```

pub mod error;
pub mod passengers;
pub mod server_pool;

// Re-export all public types for convenience
pub use error::*;
pub use passengers::*;
pub use server_pool::*;
