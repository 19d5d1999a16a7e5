//! Airport Facility Simulator
//!
//! Passenger flow through airport terminal restrooms and the cleaning crew
//! that keeps them open.
//!
//! # Overview
//!
//! This library couples two discrete-time models. The restroom simulator turns
//! a flight schedule into passenger flows at terminal entry points, lets
//! passengers choose restroom sections by a generalized cost of walking,
//! vertical movement and expected waiting, and tracks a fluid queue per
//! section. The cleaning crew optimizer consumes the resulting waiting-time
//! series and schedules routine, usage-based and urgent cleanings for a crew
//! with shifts, skills, supplies and labor costs.
//!
//! ## Key Features
//!
//! - **Terminal Modeling**: multi-floor layouts with elevator or stairs travel
//! - **Choice Policies**: logit, deterministic and proportional flow splitting
//! - **Queue Dynamics**: per-section arrival, queue and waiting-time series
//!   with stability classification
//! - **Crew Scheduling**: urgency detection, preemption, team sizing and KPIs
//! - **Passenger Demand**: per-passenger generation and M/M/k batch simulation
//!
//! ## Quick Start
//!
//! ```rust
//! use airport_facility_sim::*;
//!
//! let mut config = TerminalConfig::default();
//! config.simulation.duration = 1800.0;
//!
//! let mut simulator = RestroomSimulator::new(config)?;
//! let output = simulator.run()?;
//! println!("{}", output.statistics);
//!
//! let restrooms = restroom_capacities(simulator.layout());
//! let mut locations = vec!["Base_1".to_string(), "Base_2".to_string()];
//! locations.extend(restrooms.keys().map(|r| r.to_string()));
//! let mut travel = TravelTimeMatrix::new();
//! for from in &locations {
//!     for to in &locations {
//!         travel.insert(from.as_str(), to.as_str(), 120.0);
//!     }
//! }
//! let optimizer = CleaningCrewOptimizer::new(restrooms, travel, 1800.0, 60.0, CrewConfig::default())?;
//! let results = optimizer.run_optimization(&output.demand_snapshot(), &[])?;
//! println!("{} tasks", results.task_summary.total_tasks);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Core types, identifiers, and configuration
//! - [`terminal`]: Layout, movement and flight flows
//! - [`assignment`]: Generalized cost and flow-splitting policies
//! - [`queue`]: Section queue dynamics and stability
//! - [`simulation`]: Simulator orchestration, time, statistics, logging, errors
//! - [`crew`]: Cleaning crew optimizer and KPIs
//! - [`demand`]: Passenger-level demand generation and batch simulation
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │  Terminal   │    │ Assignment  │
//! │             │    │             │    │             │
//! │ Identifiers │◄───┤ Layout      │◄───┤ Cost        │
//! │ Enums       │    │ Movement    │    │ Policies    │
//! │ Config      │    │ Flights     │    │             │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        ▲                   ▲                   ▲
//!        │                   │                   │
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Demand    │    │    Queue    │    │ Simulation  │
//! │             │    │             │    │             │
//! │ Passengers  │    │ Dynamics    │◄───┤ Simulator   │
//! │ Server Pool │    │ Stability   │    │ Statistics  │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        │                                       │
//!        │          waiting times                ▼
//!        │                               ┌─────────────┐
//!        └──────────────────────────────►│    Crew     │
//!                                        │ Optimizer   │
//!                                        │ KPIs        │
//!                                        └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod assignment;
pub mod crew;
pub mod demand;
pub mod queue;
pub mod simulation;
pub mod terminal;

pub mod types;

// Core types and identifiers
pub use types::{
    // Enums
    AircraftType,
    AssignmentMethod,
    CleaningType,
    // Configuration
    CliArgs,
    ConfigError,
    ConfigValidationError,
    CrewConfig,
    // Identifiers
    CrewId,
    CrewStatus,
    EntryPointId,
    FlightId,
    FlowType,
    Gender,
    LocationId,
    RestroomId,
    RunId,
    SectionId,
    StabilityClass,
    TaskId,
    TerminalConfig,
    DEFAULT_BASE_EPOCH,
};

// Terminal model
pub use terminal::{FlightManager, MovementModel, Restroom, RestroomSection, TerminalLayout};

// Assignment policies
pub use assignment::{assign_deterministic, assign_proportional, AssignmentMethods};

// Queueing
pub use queue::{QueueDynamics, SectionSeries, SectionStatistics, StabilityReport};

// Simulation types and functionality
pub use simulation::{
    LoggingConfig, RestroomSimulator, SimulationError, SimulationOutput, SimulationResult, SimulationStatistics,
    TimeManager,
};

// Crew scheduling
pub use crew::{
    restroom_capacities, CleaningCrewOptimizer, CleaningRequirement, CleaningTask, CrewMember, DemandSnapshot,
    OptimizationResults, RestroomCapacity, TravelTimeMatrix,
};

// Passenger demand
pub use demand::{
    DemandError, FlightRecord, Passenger, PassengerBehavior, PassengerGenerator, ServerPoolParams,
    ServerPoolSimulator,
};
