//! Demand generation errors

use thiserror::Error;

/// Errors raised while producing passenger demand
///
/// An empty dataset is not a bug: the caller decides whether to skip the day
/// or abort.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DemandError {
    /// Filtering or simulation left nothing to work with
    #[error("No data: {context}")]
    EmptyDataset {
        /// What was being produced
        context: String,
    },

    /// A passenger origin has no coordinates
    #[error("Unknown origin: {0}")]
    UnknownOrigin(String),

    /// A behavior or simulation parameter is out of range
    #[error("Invalid demand parameter: {0}")]
    InvalidParameter(String),
}

impl DemandError {
    /// Create an empty dataset error
    pub fn empty(context: impl Into<String>) -> Self {
        Self::EmptyDataset { context: context.into() }
    }
}

/// Result type for demand generation
pub type DemandResult<T> = Result<T, DemandError>;
