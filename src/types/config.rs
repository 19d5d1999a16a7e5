//! Configuration structures for the terminal facility simulator
//!
//! This module contains the terminal configuration (floors, flights, restrooms,
//! entry points, movement speeds, choice parameters and simulation settings),
//! the command line interface, and the validation logic applied before a run.

use super::{AircraftType, AssignmentMethod, EntryPointId, FlightId, FlowType, RestroomId};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "airport-facility-sim",
    version = "0.1.0",
    about = "Airport Facility Simulator - Restroom flow simulation and cleaning crew scheduling",
    long_about = "Simulates passenger flow through terminal restrooms under flight-driven demand, \
choosing facilities with discrete-choice models and continuous queue dynamics, and optionally \
schedules a cleaning crew against the resulting waiting times.

EXAMPLES:
    # Run the built-in sample terminal
    airport-facility-sim

    # Use a terminal configuration file
    airport-facility-sim --config terminal.json

    # Compare assignment policies
    airport-facility-sim --config terminal.json --method deterministic

    # Schedule the cleaning crew against the simulated waiting times
    airport-facility-sim --config terminal.json --travel-times travel.json \\
        --cleaning-requirements requirements.json --output results.json

    # Generate a configuration template
    airport-facility-sim --print-config > my-terminal.json

    # Validate configuration without running
    airport-facility-sim --config my-terminal.json --dry-run

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Terminal configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Terminal configuration file path (JSON format)",
        long_help = "Path to a JSON terminal configuration with floors, flights, restrooms, entry_points, movement_speeds, choice_params and simulation sections. CLI arguments override file settings."
    )]
    pub config: Option<String>,

    /// Assignment policy
    #[arg(
        short,
        long,
        help = "Assignment method (logit, deterministic, proportional)",
        long_help = "Flow-splitting policy used to distribute passengers among candidate restroom sections. Default: logit"
    )]
    pub method: Option<String>,

    /// Simulation time step in seconds
    #[arg(long, help = "Simulation time step in seconds")]
    pub time_step: Option<f64>,

    /// Simulation duration in seconds
    #[arg(long, help = "Simulation duration in seconds")]
    pub duration: Option<f64>,

    /// Random seed for reproducible results
    #[arg(long, help = "Random seed for reproducible results")]
    pub seed: Option<u64>,

    /// Crew configuration file path (JSON format)
    #[arg(long, help = "Crew configuration file path (JSON format)")]
    pub crew_config: Option<String>,

    /// Travel time matrix file path (JSON format)
    #[arg(
        long,
        help = "Travel time matrix file path (JSON format)",
        long_help = "Directed travel times in seconds as {\"from\": {\"to\": seconds}}. Required to run the cleaning crew optimizer; every crew base, restroom and the supply depot must be covered."
    )]
    pub travel_times: Option<String>,

    /// Routine cleaning requirements file path (JSON format)
    #[arg(
        long,
        help = "Routine cleaning requirements file path (JSON format)",
        long_help = "Map of restroom id to the number of routine cleanings to spread evenly across the horizon, e.g. {\"R1\": 4}."
    )]
    pub cleaning_requirements: Option<String>,

    /// Output path for JSON results
    #[arg(short, long, help = "Output path for JSON results (stdout if omitted)")]
    pub output: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Directory for daily rolling JSON log files
    #[arg(long, value_name = "DIR", help = "Also write JSON logs to daily files in DIR")]
    pub log_dir: Option<String>,

    /// Dry run mode - validate configuration without running simulation
    #[arg(long, help = "Validate configuration without running simulation")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

fn default_elevator_wait() -> f64 {
    30.0
}

fn default_floor_height() -> f64 {
    4.0
}

fn default_beta_vertical() -> f64 {
    2.0
}

fn default_vertical_penalty_scale() -> f64 {
    10.0
}

fn default_alpha_arrival() -> f64 {
    0.5
}

fn default_alpha_departure() -> f64 {
    0.3
}

fn default_max_assignment_iterations() -> usize {
    5
}

fn default_convergence_threshold() -> f64 {
    0.001
}

fn default_male_share() -> f64 {
    0.5
}

fn default_boarding_start() -> f64 {
    3600.0
}

fn default_boarding_duration() -> f64 {
    2700.0
}

/// A scheduled flight as it appears in the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSpec {
    /// Arrival time (deplaning) or departure time (boarding), simulation seconds
    pub arrival_time: f64,
    /// Number of passengers on board
    pub passengers: u32,
    /// Aircraft class, drives the deplaning duration
    pub aircraft_type: AircraftType,
    /// Gate the flight is parked at
    pub gate: String,
    /// Whether passengers leave or board the aircraft
    pub flow_type: FlowType,
    /// Seconds before departure that boarding flow starts
    #[serde(default = "default_boarding_start")]
    pub boarding_start: f64,
    /// Length of the boarding flow window in seconds
    #[serde(default = "default_boarding_duration")]
    pub boarding_duration: f64,
}

/// A restroom as it appears in the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestroomSpec {
    /// Floor the restroom is on
    pub floor: i32,
    /// Planar x coordinate
    pub x: f64,
    /// Planar y coordinate
    pub y: f64,
    /// Men's section service rate, passengers per second
    #[serde(rename = "capacity_M")]
    pub capacity_m: f64,
    /// Women's section service rate, passengers per second
    #[serde(rename = "capacity_F")]
    pub capacity_f: f64,
}

/// An entry point as it appears in the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPointSpec {
    /// Floor the entry point is on
    pub floor: i32,
    /// Planar x coordinate
    pub x: f64,
    /// Planar y coordinate
    pub y: f64,
}

/// Walking and vertical movement speeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementSpeeds {
    /// Walking speed in length units per second
    pub walking: f64,
    /// Elevator vertical speed in length units per second
    pub elevator: f64,
    /// Stairs vertical speed in length units per second
    pub stairs: f64,
    /// Average wait for an elevator in seconds
    #[serde(default = "default_elevator_wait")]
    pub elevator_wait: f64,
    /// Vertical distance between consecutive floors
    #[serde(default = "default_floor_height")]
    pub floor_height: f64,
}

/// Coefficients of the generalized cost and the logit model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceParams {
    /// Weight on travel time
    pub beta_walk: f64,
    /// Weight on expected waiting time
    pub beta_wait: f64,
    /// Weight on the floor-change penalty
    #[serde(default = "default_beta_vertical")]
    pub beta_vertical: f64,
    /// Logit scale parameter
    pub theta: f64,
    /// Scaling applied to the floor difference inside the vertical penalty
    #[serde(default = "default_vertical_penalty_scale")]
    pub vertical_penalty_scale: f64,
}

/// Time horizon and demand settings of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Length of one discrete step in seconds
    pub time_step: f64,
    /// Simulated horizon in seconds
    pub duration: f64,
    /// Share of deplaning passengers who visit a restroom
    #[serde(default = "default_alpha_arrival")]
    pub alpha_arrival: f64,
    /// Share of boarding passengers who visit a restroom
    #[serde(default = "default_alpha_departure")]
    pub alpha_departure: f64,
    /// Upper bound on fixed-point iterations per time step
    #[serde(default = "default_max_assignment_iterations")]
    pub max_assignment_iterations: usize,
    /// Largest per-section flow change that still counts as converged
    #[serde(default = "default_convergence_threshold")]
    pub convergence_threshold: f64,
    /// Share of each entry flow sent to men's sections
    #[serde(default = "default_male_share")]
    pub male_share: f64,
    /// Flow-splitting policy
    #[serde(default)]
    pub method: AssignmentMethod,
    /// Random seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Empirical tuning constants of the continuous queue approximation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueParams {
    /// Arrival rates at or above this share of capacity are held at it
    pub saturation_ratio: f64,
    /// Utilization at which the closed-form wait switches to its fallback terms
    pub instability_ratio: f64,
    /// Queue lengths below this value snap to zero
    pub idle_snap_threshold: f64,
    /// Queue length at which service reaches full capacity
    pub service_ramp_queue: f64,
    /// Peak utilization percentage above which a section is flagged as highly utilized
    pub high_utilization_percent: f64,
}

impl Default for QueueParams {
    fn default() -> Self {
        Self {
            saturation_ratio: 0.95,
            instability_ratio: 0.99,
            idle_snap_threshold: 0.01,
            service_ramp_queue: 2.0,
            high_utilization_percent: 90.0,
        }
    }
}

/// Complete terminal configuration consumed by the restroom simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Floors of the terminal
    pub floors: Vec<i32>,
    /// Flight schedule
    pub flights: BTreeMap<FlightId, FlightSpec>,
    /// Restroom facilities
    pub restrooms: BTreeMap<RestroomId, RestroomSpec>,
    /// Gates and checkpoints where passenger flow originates
    pub entry_points: BTreeMap<EntryPointId, EntryPointSpec>,
    /// Movement speeds
    pub movement_speeds: MovementSpeeds,
    /// Cost and choice coefficients
    pub choice_params: ChoiceParams,
    /// Time horizon and demand settings
    pub simulation: SimulationParams,
    /// Queue approximation constants
    #[serde(default)]
    pub queue: QueueParams,
    /// Gate to entry point mapping
    #[serde(default)]
    pub gate_mappings: BTreeMap<String, EntryPointId>,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error, including missing required keys
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),

    /// A command line override could not be parsed
    #[error("Invalid command line value for {field}: {message}")]
    InvalidOverride {
        /// Name of the overridden setting
        field: String,
        /// Parse failure description
        message: String,
    },
}

/// Validation errors for terminal and crew configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// Time step is not positive
    #[error("Time step must be greater than 0, got {0}")]
    InvalidTimeStep(f64),

    /// Duration shorter than one step
    #[error("Duration ({duration}) must be at least one time step ({time_step})")]
    InvalidDuration {
        /// Configured duration
        duration: f64,
        /// Configured time step
        time_step: f64,
    },

    /// A speed or rate that must be positive is not
    #[error("{field} must be greater than 0, got {value}")]
    NonPositive {
        /// Name of the offending field
        field: String,
        /// The invalid value
        value: f64,
    },

    /// A value that must be non-negative is negative
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Name of the offending field
        field: String,
        /// The invalid value
        value: f64,
    },

    /// A share or probability outside [0, 1]
    #[error("Invalid share for {field}: {value} (must be between 0.0 and 1.0)")]
    InvalidShare {
        /// Name of the field with the invalid share
        field: String,
        /// The invalid value
        value: f64,
    },

    /// A required collection is empty
    #[error("Configuration must define at least one {0}")]
    Empty(&'static str),

    /// An entity refers to a floor that is not declared
    #[error("{entity} is on floor {floor}, which is not listed in floors")]
    UnknownFloor {
        /// The entity on the undeclared floor
        entity: String,
        /// The undeclared floor
        floor: i32,
    },

    /// A gate mapping points at an entry point that does not exist
    #[error("Gate '{gate}' maps to unknown entry point '{entry_point}'")]
    UnknownGateTarget {
        /// The mapped gate
        gate: String,
        /// The missing entry point
        entry_point: EntryPointId,
    },

    /// Queue tuning constants are inconsistent
    #[error("Queue saturation ratio ({saturation}) must be in (0, instability ratio {instability}) and instability ratio below 1")]
    InvalidQueueRatios {
        /// Configured saturation ratio
        saturation: f64,
        /// Configured instability ratio
        instability: f64,
    },

    /// Crew shift is empty or reversed
    #[error("Crew member '{name}' has an invalid shift: {start}h to {end}h")]
    InvalidShift {
        /// Crew member name
        name: String,
        /// Shift start in hours
        start: f64,
        /// Shift end in hours
        end: f64,
    },

    /// Urgency thresholds are not strictly ascending
    #[error("Urgency thresholds must be ascending: call-in {call_in}s < high-priority call-in {high_priority}s < emergency {emergency}s")]
    UnorderedThresholds {
        /// Call-in threshold
        call_in: f64,
        /// High-priority call-in threshold
        high_priority: f64,
        /// Emergency threshold
        emergency: f64,
    },
}

impl Default for TerminalConfig {
    fn default() -> Self {
        let mut flights = BTreeMap::new();
        flights.insert(
            FlightId::new("AA100"),
            FlightSpec {
                arrival_time: 600.0,
                passengers: 150,
                aircraft_type: AircraftType::Medium,
                gate: "A1".to_string(),
                flow_type: FlowType::Deplaning,
                boarding_start: default_boarding_start(),
                boarding_duration: default_boarding_duration(),
            },
        );
        flights.insert(
            FlightId::new("UA200"),
            FlightSpec {
                arrival_time: 5400.0,
                passengers: 180,
                aircraft_type: AircraftType::Large,
                gate: "B2".to_string(),
                flow_type: FlowType::Boarding,
                boarding_start: default_boarding_start(),
                boarding_duration: default_boarding_duration(),
            },
        );

        let mut restrooms = BTreeMap::new();
        restrooms.insert(
            RestroomId::new("R1"),
            RestroomSpec { floor: 1, x: 20.0, y: 10.0, capacity_m: 0.2, capacity_f: 0.2 },
        );
        restrooms.insert(
            RestroomId::new("R2"),
            RestroomSpec { floor: 2, x: 80.0, y: 10.0, capacity_m: 0.3, capacity_f: 0.3 },
        );
        restrooms.insert(
            RestroomId::new("R3"),
            RestroomSpec { floor: 1, x: 150.0, y: 0.0, capacity_m: 0.15, capacity_f: 0.15 },
        );

        let mut entry_points = BTreeMap::new();
        entry_points.insert(EntryPointId::new("G1"), EntryPointSpec { floor: 1, x: 0.0, y: 0.0 });
        entry_points.insert(EntryPointId::new("G2"), EntryPointSpec { floor: 2, x: 100.0, y: 0.0 });
        entry_points
            .insert(EntryPointId::new("SEC"), EntryPointSpec { floor: 1, x: 50.0, y: -50.0 });

        let mut gate_mappings = BTreeMap::new();
        gate_mappings.insert("A1".to_string(), EntryPointId::new("G1"));
        gate_mappings.insert("B2".to_string(), EntryPointId::new("G2"));

        Self {
            floors: vec![1, 2],
            flights,
            restrooms,
            entry_points,
            movement_speeds: MovementSpeeds {
                walking: 1.3,
                elevator: 1.0,
                stairs: 0.5,
                elevator_wait: default_elevator_wait(),
                floor_height: default_floor_height(),
            },
            choice_params: ChoiceParams {
                beta_walk: 1.0,
                beta_wait: 1.0,
                beta_vertical: default_beta_vertical(),
                theta: 0.1,
                vertical_penalty_scale: default_vertical_penalty_scale(),
            },
            simulation: SimulationParams {
                time_step: 10.0,
                duration: 7200.0,
                alpha_arrival: default_alpha_arrival(),
                alpha_departure: default_alpha_departure(),
                max_assignment_iterations: default_max_assignment_iterations(),
                convergence_threshold: default_convergence_threshold(),
                male_share: default_male_share(),
                method: AssignmentMethod::default(),
                seed: None,
            },
            queue: QueueParams::default(),
            gate_mappings,
        }
    }
}

impl TerminalConfig {
    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        Self::apply_cli_overrides(&mut config, args)?;

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = read_json_file(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from JSON text
    ///
    /// Floors are sorted so that the declared order never matters.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(content)?;
        config.floors.sort_unstable();
        config.floors.dedup();
        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: &CliArgs) -> Result<(), ConfigError> {
        if let Some(method) = &args.method {
            config.simulation.method = method.parse().map_err(|message| {
                ConfigError::InvalidOverride { field: "method".to_string(), message }
            })?;
        }
        if let Some(value) = args.time_step {
            config.simulation.time_step = value;
        }
        if let Some(value) = args.duration {
            config.simulation.duration = value;
        }
        if let Some(value) = args.seed {
            config.simulation.seed = Some(value);
        }
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of discrete steps in the horizon
    pub fn n_steps(&self) -> usize {
        (self.simulation.duration / self.simulation.time_step).floor() as usize
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let sim = &self.simulation;
        if !(sim.time_step > 0.0) {
            return Err(ConfigValidationError::InvalidTimeStep(sim.time_step));
        }
        if !(sim.duration >= sim.time_step) {
            return Err(ConfigValidationError::InvalidDuration {
                duration: sim.duration,
                time_step: sim.time_step,
            });
        }
        if sim.max_assignment_iterations == 0 {
            return Err(ConfigValidationError::NonPositive {
                field: "simulation.max_assignment_iterations".to_string(),
                value: 0.0,
            });
        }
        validate_positive("simulation.convergence_threshold", sim.convergence_threshold)?;
        validate_share("simulation.alpha_arrival", sim.alpha_arrival)?;
        validate_share("simulation.alpha_departure", sim.alpha_departure)?;
        validate_share("simulation.male_share", sim.male_share)?;

        let speeds = &self.movement_speeds;
        validate_positive("movement_speeds.walking", speeds.walking)?;
        validate_positive("movement_speeds.elevator", speeds.elevator)?;
        validate_positive("movement_speeds.stairs", speeds.stairs)?;
        validate_positive("movement_speeds.floor_height", speeds.floor_height)?;
        validate_non_negative("movement_speeds.elevator_wait", speeds.elevator_wait)?;
        validate_non_negative("choice_params.theta", self.choice_params.theta)?;

        let queue = &self.queue;
        if !(queue.saturation_ratio > 0.0
            && queue.saturation_ratio < queue.instability_ratio
            && queue.instability_ratio < 1.0)
        {
            return Err(ConfigValidationError::InvalidQueueRatios {
                saturation: queue.saturation_ratio,
                instability: queue.instability_ratio,
            });
        }
        validate_positive("queue.service_ramp_queue", queue.service_ramp_queue)?;
        validate_non_negative("queue.idle_snap_threshold", queue.idle_snap_threshold)?;

        if self.floors.is_empty() {
            return Err(ConfigValidationError::Empty("floor"));
        }
        if self.entry_points.is_empty() {
            return Err(ConfigValidationError::Empty("entry point"));
        }
        if self.restrooms.is_empty() {
            return Err(ConfigValidationError::Empty("restroom"));
        }

        for (id, entry) in &self.entry_points {
            self.validate_floor(format!("Entry point {}", id), entry.floor)?;
        }
        for (id, restroom) in &self.restrooms {
            self.validate_floor(format!("Restroom {}", id), restroom.floor)?;
            validate_positive(&format!("restrooms.{}.capacity_M", id), restroom.capacity_m)?;
            validate_positive(&format!("restrooms.{}.capacity_F", id), restroom.capacity_f)?;
        }
        for (id, flight) in &self.flights {
            if flight.flow_type == FlowType::Boarding {
                validate_positive(&format!("flights.{}.boarding_duration", id), flight.boarding_duration)?;
            }
        }
        for (gate, entry_point) in &self.gate_mappings {
            if !self.entry_points.contains_key(entry_point) {
                return Err(ConfigValidationError::UnknownGateTarget {
                    gate: gate.clone(),
                    entry_point: entry_point.clone(),
                });
            }
        }

        Ok(())
    }

    fn validate_floor(&self, entity: String, floor: i32) -> Result<(), ConfigValidationError> {
        if self.floors.contains(&floor) {
            Ok(())
        } else {
            Err(ConfigValidationError::UnknownFloor { entity, floor })
        }
    }
}

/// Read a JSON configuration file, checking existence and extension first
pub fn read_json_file(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(fs::read_to_string(path)?),
        Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
    }
}

pub(crate) fn validate_positive(field: &str, value: f64) -> Result<(), ConfigValidationError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigValidationError::NonPositive { field: field.to_string(), value })
    }
}

pub(crate) fn validate_non_negative(field: &str, value: f64) -> Result<(), ConfigValidationError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigValidationError::Negative { field: field.to_string(), value })
    }
}

pub(crate) fn validate_share(field: &str, value: f64) -> Result<(), ConfigValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigValidationError::InvalidShare { field: field.to_string(), value })
    }
}
