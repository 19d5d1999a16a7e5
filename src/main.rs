// Airport Facility Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/airport-facility-sim
// ```
//
// Or with a terminal configuration and the cleaning crew optimizer:
//
// ```console
// $ ./target/release/airport-facility-sim --config terminal.json --travel-times travel.json --verbose
// ```

use airport_facility_sim::crew::{
    restroom_capacities, CleaningCrewOptimizer, CleaningRequirement, OptimizationResults, TravelTimeMatrix,
};
use airport_facility_sim::simulation::{
    ErrorHandler, LoggingConfig, RecoveryContext, RestroomSimulator, SimulationOutput, SimulationResult,
};
use airport_facility_sim::types::{CliArgs, CrewConfig, TerminalConfig};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::process;
use tracing::{error, info};

/// Everything written to the output
#[derive(Debug, Serialize)]
struct RunReport {
    simulation: SimulationOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    crew: Option<OptimizationResults<DateTime<Utc>>>,
}

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    // Handle special CLI flags that don't require full initialization
    if args.print_config {
        match TerminalConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    let mut logging = LoggingConfig::for_cli(args.verbose, args.debug);
    if let Some(directory) = &args.log_dir {
        logging = logging.with_file_logging(directory.clone());
    }
    if let Err(e) = logging.init() {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Starting Airport Facility Simulator");

    if let Err(e) = run(&args) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }

    info!("Airport Facility Simulator completed successfully");
}

fn run(args: &CliArgs) -> Result<()> {
    let config = TerminalConfig::from_cli_args(args).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;
    info!("Configuration loaded and validated successfully");

    // Handle dry run mode
    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - simulation will not be executed.");
        print_configuration_summary(&config);
        return Ok(());
    }

    print_startup_banner(&config);

    let mut simulator = RestroomSimulator::new(config.clone()).context("Failed to initialize simulator")?;
    let simulation = simulator.run().context("Simulation failed")?;
    eprintln!("{}", simulation.statistics);

    let crew = match &args.travel_times {
        Some(path) => run_crew_optimizer(args, path, &config, &simulator, &simulation)?,
        None => None,
    };

    let report = RunReport { simulation, crew };
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize results")?;
    write_output(args.output.as_deref(), &json)
}

/// Schedule the cleaning crew against the simulated waiting times
///
/// Scheduling problems skip the crew stage; missing travel times abort.
fn run_crew_optimizer(
    args: &CliArgs,
    travel_path: &str,
    config: &TerminalConfig,
    simulator: &RestroomSimulator,
    simulation: &SimulationOutput,
) -> Result<Option<OptimizationResults<DateTime<Utc>>>> {
    let crew_config = match &args.crew_config {
        Some(path) => CrewConfig::from_file(path).with_context(|| format!("Failed to load crew config {}", path))?,
        None => CrewConfig::default(),
    };
    let travel = TravelTimeMatrix::from_file(travel_path)
        .with_context(|| format!("Failed to load travel times {}", travel_path))?;
    let requirements = match &args.cleaning_requirements {
        Some(path) => CleaningRequirement::from_file(path)
            .with_context(|| format!("Failed to load cleaning requirements {}", path))?,
        None => Vec::new(),
    };

    let optimizer = CleaningCrewOptimizer::new(
        restroom_capacities(simulator.layout()),
        travel,
        config.simulation.duration,
        config.simulation.time_step,
        crew_config,
    )
    .context("Failed to initialize crew optimizer")?;
    let clock = optimizer.time_manager().context("Invalid base epoch")?;

    eprintln!("Scheduling {} crew members...", optimizer.config().crew_members.len());
    let demand = simulation.demand_snapshot();
    let results = ErrorHandler::new()
        .execute_with_recovery(
            || optimizer.run_optimization(&demand, &requirements),
            RecoveryContext::skip().with_context("crew optimization"),
        )
        .context("Crew optimization failed")?;

    match &results {
        Some(results) => eprintln!(
            "Crew: {}/{} tasks completed, total cost {:.2}",
            results.task_summary.completed_tasks, results.task_summary.total_tasks, results.final_kpis.total_cost
        ),
        None => eprintln!("Crew optimization skipped"),
    }
    Ok(results.map(|r| r.export(&clock)))
}

fn write_output(path: Option<&str>, json: &str) -> Result<()> {
    match path {
        Some(path) => {
            let written = ErrorHandler::new()
                .execute_with_recovery(
                    || -> SimulationResult<()> { Ok(fs::write(path, json)?) },
                    RecoveryContext::retry(2).with_context(format!("writing {}", path)),
                )
                .with_context(|| format!("Failed to write {}", path))?;
            if written.is_none() {
                anyhow::bail!("Could not write results to {}", path);
            }
            info!(path, "Results written");
            eprintln!("Results written to: {}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Print startup banner and configuration summary
fn print_startup_banner(config: &TerminalConfig) {
    eprintln!("Airport Facility Simulator");
    eprintln!("==========================");
    eprintln!("Restroom flow simulation and cleaning crew scheduling");
    eprintln!();

    print_configuration_summary(config);
}

/// Print configuration summary
fn print_configuration_summary(config: &TerminalConfig) {
    let sim = &config.simulation;
    eprintln!("Configuration:");
    eprintln!("  Floors: {:?}", config.floors);
    eprintln!("  Restrooms: {}", config.restrooms.len());
    eprintln!("  Entry Points: {}", config.entry_points.len());
    eprintln!("  Flights: {}", config.flights.len());
    eprintln!("  Assignment Method: {}", sim.method);
    eprintln!("  Time Step: {} s", sim.time_step);
    eprintln!("  Duration: {} s ({} steps)", sim.duration, config.n_steps());
    eprintln!("  Restroom Use: {:.0}% arriving, {:.0}% departing", sim.alpha_arrival * 100.0, sim.alpha_departure * 100.0);
    if let Some(seed) = sim.seed {
        eprintln!("  Random Seed: {}", seed);
    }
    eprintln!();
}
