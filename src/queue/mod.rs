//! Restroom section queueing
//!
//! # Overview
//!
//! - **QueueDynamics**: per-section arrival, queue length and waiting time
//!   series advanced one step at a time
//! - **StabilityReport**: stable, highly utilized and unstable sections by
//!   peak arrival rate
//!
//! # Usage Example
//!
//! ```rust
//! use airport_facility_sim::queue::*;
//! use airport_facility_sim::terminal::RestroomSection;
//! use airport_facility_sim::types::*;
//!
//! let id = SectionId::new(RestroomId::new("R1"), Gender::Male);
//! let sections = vec![RestroomSection { id: id.clone(), capacity: 0.2 }];
//! let mut queue = QueueDynamics::new(&sections, 10, QueueParams::default());
//!
//! queue.set_arrival_rate(&id, 0, 0.1).unwrap();
//! queue.update_queue_states(0, 10.0);
//! queue.update_waiting_times(0);
//! assert!(queue.series(&id).unwrap().queue_length[1] > 0.0);
//! ```

pub mod dynamics;
pub mod stability;

pub use dynamics::*;
pub use stability::*;
