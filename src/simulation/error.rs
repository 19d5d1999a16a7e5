//! Errors of the simulator, the crew optimizer and demand generation
//!
//! This module contains error types and error handling for the restroom
//! simulator, the cleaning crew optimizer and demand generation.

use crate::demand::DemandError;
use crate::types::{ConfigError, ConfigValidationError, LocationId, SectionId};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that can occur during simulation and crew optimization
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The terminal or crew setup is inconsistent
    #[error("Inconsistent configuration: {0}")]
    ConfigurationError(String),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// Configuration could not be loaded
    #[error("Configuration loading failed: {0}")]
    ConfigLoad(#[from] ConfigError),

    /// A referenced location, entry point or restroom does not exist
    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    /// A referenced restroom section does not exist
    #[error("Unknown restroom section: {0}")]
    UnknownSection(SectionId),

    /// The travel-time matrix has no entry for a required pair
    #[error("No travel time from {from} to {to}")]
    MissingTravelTime {
        /// Origin location
        from: LocationId,
        /// Destination location
        to: LocationId,
    },

    /// Flow assignment failed
    #[error("Assignment error: {0}")]
    AssignmentError(String),

    /// Crew scheduling failed
    #[error("Scheduling error: {0}")]
    SchedulingError(String),

    /// Passenger demand could not be produced
    #[error("Demand generation failed: {0}")]
    NoData(#[from] DemandError),

    /// Reading inputs or writing results failed
    #[error("I/O failure: {0}")]
    IoError(#[from] std::io::Error),

    /// Results could not be encoded as JSON
    #[error("JSON encoding failed: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl SimulationError {
    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create an unknown location error
    pub fn unknown_location(name: impl Into<String>) -> Self {
        Self::UnknownLocation(name.into())
    }

    /// Create an assignment error
    pub fn assignment_error(msg: impl Into<String>) -> Self {
        Self::AssignmentError(msg.into())
    }

    /// Create a scheduling error
    pub fn scheduling_error(msg: impl Into<String>) -> Self {
        Self::SchedulingError(msg.into())
    }

    /// Check if this is a recoverable error
    ///
    /// Broken configuration and incomplete travel data invalidate the whole
    /// run. Demand and output problems only affect the stage that hit them.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimulationError::ConfigurationError(_) => false,
            SimulationError::InvalidConfig(_) => false,
            SimulationError::ConfigLoad(_) => false,
            SimulationError::UnknownLocation(_) => false,
            SimulationError::UnknownSection(_) => false,
            SimulationError::MissingTravelTime { .. } => false,
            SimulationError::AssignmentError(_) => true,
            SimulationError::SchedulingError(_) => true,
            SimulationError::NoData(_) => true,
            SimulationError::IoError(_) => true,
            SimulationError::SerializationError(_) => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::ConfigurationError(_)
            | SimulationError::InvalidConfig(_)
            | SimulationError::ConfigLoad(_) => "Configuration",
            SimulationError::UnknownLocation(_) | SimulationError::UnknownSection(_) => "Layout",
            SimulationError::MissingTravelTime { .. } => "Travel Data",
            SimulationError::AssignmentError(_) => "Assignment",
            SimulationError::SchedulingError(_) => "Scheduling",
            SimulationError::NoData(_) => "Demand",
            SimulationError::IoError(_) => "IO",
            SimulationError::SerializationError(_) => "Serialization",
        }
    }
}

/// Result type for simulation and crew optimization
pub type SimulationResult<T> = Result<T, SimulationError>;

/// Reaction to a failed stage of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// Run the stage again
    Retry,
    /// Give up on the stage and continue with the rest of the run
    Skip,
    /// Stop the run
    Abort,
}

/// Recovery policy for one named stage (crew optimization, writing results, ...)
#[derive(Debug, Clone)]
pub struct RecoveryContext {
    /// Reaction to recoverable errors
    pub strategy: RecoveryStrategy,
    /// Retries allowed before a retrying stage is skipped
    pub max_retries: usize,
    /// Retries used so far
    pub retry_count: usize,
    /// Stage description used in log events
    pub context: String,
}

impl Default for RecoveryContext {
    fn default() -> Self {
        Self::skip()
    }
}

impl RecoveryContext {
    /// Retry a stage up to `max_retries` times, then skip it
    pub fn retry(max_retries: usize) -> Self {
        Self { strategy: RecoveryStrategy::Retry, max_retries, retry_count: 0, context: String::new() }
    }

    /// Skip a stage on its first recoverable error
    pub fn skip() -> Self {
        Self { strategy: RecoveryStrategy::Skip, max_retries: 0, retry_count: 0, context: String::new() }
    }

    /// Stop the run on any error
    pub fn abort() -> Self {
        Self { strategy: RecoveryStrategy::Abort, max_retries: 0, retry_count: 0, context: String::new() }
    }

    /// Name the stage
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Whether another attempt is allowed
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }

    fn stage(&self) -> &str {
        if self.context.is_empty() {
            "unnamed stage"
        } else {
            &self.context
        }
    }
}

/// Applies [`RecoveryContext`] policies to stage failures in the command line runner
#[derive(Debug, Default)]
pub struct ErrorHandler;

impl ErrorHandler {
    /// Create a handler
    pub fn new() -> Self {
        Self
    }

    /// Pick the reaction to `error`; unrecoverable errors always abort
    pub fn handle_error(&self, error: &SimulationError, context: &RecoveryContext) -> RecoveryStrategy {
        if !error.is_recoverable() {
            error!(stage = context.stage(), category = error.category(), "Fatal error: {}", error);
            return RecoveryStrategy::Abort;
        }
        warn!(stage = context.stage(), category = error.category(), "Stage failed: {}", error);

        match context.strategy {
            RecoveryStrategy::Retry if context.can_retry() => {
                info!(stage = context.stage(), attempt = context.retry_count + 1, max = context.max_retries, "Retrying");
                RecoveryStrategy::Retry
            }
            RecoveryStrategy::Retry => {
                debug!(stage = context.stage(), "Retries exhausted");
                RecoveryStrategy::Skip
            }
            strategy => strategy,
        }
    }

    /// Run `operation` under the recovery policy
    ///
    /// Returns `Ok(None)` when the stage was skipped.
    pub fn execute_with_recovery<T, F>(&self, mut operation: F, mut context: RecoveryContext) -> SimulationResult<Option<T>>
    where
        F: FnMut() -> SimulationResult<T>,
    {
        loop {
            let error = match operation() {
                Ok(value) => return Ok(Some(value)),
                Err(error) => error,
            };
            match self.handle_error(&error, &context) {
                RecoveryStrategy::Retry => context.retry_count += 1,
                RecoveryStrategy::Skip => {
                    warn!(stage = context.stage(), "Skipping stage");
                    return Ok(None);
                }
                RecoveryStrategy::Abort => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gender, RestroomId};
    use std::io;

    #[test]
    fn test_error_display() {
        let error = SimulationError::MissingTravelTime {
            from: LocationId::new("Base_1"),
            to: LocationId::new("R9"),
        };
        assert_eq!(error.to_string(), "No travel time from Base_1 to R9");

        let error = SimulationError::UnknownSection(SectionId::new(RestroomId::new("R1"), Gender::Female));
        assert_eq!(error.to_string(), "Unknown restroom section: R1-F");
    }

    #[test]
    fn test_error_conversions() {
        let written: SimulationError = io::Error::new(io::ErrorKind::PermissionDenied, "results.json").into();
        assert!(matches!(written, SimulationError::IoError(_)));
        assert_eq!(written.category(), "IO");

        let demand: SimulationError = DemandError::UnknownOrigin("XXX".to_string()).into();
        assert_eq!(demand.category(), "Demand");
        assert!(demand.is_recoverable());

        let invalid: SimulationError = ConfigValidationError::InvalidTimeStep(0.0).into();
        assert_eq!(invalid.category(), "Configuration");
        assert!(!invalid.is_recoverable());
    }

    #[test]
    fn test_non_recoverable_aborts() {
        let handler = ErrorHandler::new();
        let error = SimulationError::MissingTravelTime {
            from: LocationId::new("A"),
            to: LocationId::new("B"),
        };
        assert_eq!(handler.handle_error(&error, &RecoveryContext::skip()), RecoveryStrategy::Abort);
    }

    #[test]
    fn test_retry_then_success() {
        let handler = ErrorHandler::new();
        let mut attempts = 0;
        let result = handler.execute_with_recovery(
            || {
                attempts += 1;
                if attempts < 3 {
                    Err(SimulationError::IoError(io::Error::new(io::ErrorKind::Interrupted, "busy")))
                } else {
                    Ok(7)
                }
            },
            RecoveryContext::retry(3),
        );
        assert_eq!(result.unwrap(), Some(7));
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_skip_after_retries_exhausted() {
        let handler = ErrorHandler::new();
        let mut attempts = 0;
        let result: SimulationResult<Option<u8>> = handler.execute_with_recovery(
            || {
                attempts += 1;
                Err(SimulationError::scheduling_error("no crew"))
            },
            RecoveryContext::retry(2).with_context("crew optimization"),
        );
        assert_eq!(result.unwrap(), None);
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_abort_propagates_error() {
        let handler = ErrorHandler::new();
        let result: SimulationResult<Option<u8>> = handler.execute_with_recovery(
            || Err(SimulationError::configuration_error("broken")),
            RecoveryContext::retry(3),
        );
        assert!(matches!(result, Err(SimulationError::ConfigurationError(_))));
    }
}
