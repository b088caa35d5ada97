//! Error types for reparto
//!
//! Every variant is a rejected operation on a single experiment; nothing here
//! is fatal to the host process.

use thiserror::Error;

use crate::experiment::ExperimentStatus;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Reparto error types
#[derive(Error, Debug)]
pub enum Error {
    /// Experiment configuration cannot route traffic
    #[error("Invalid experiment configuration: {0}\nFix the variant list before routing traffic.")]
    InvalidConfig(String),

    /// A variant with zero exposures was passed to the significance calculator
    #[error("Insufficient sample: {0}\nWait for more traffic before evaluating significance.")]
    InsufficientSample(String),

    /// Lifecycle transition attempted from an incompatible state
    #[error("Invalid transition: cannot {action} an experiment in {status} state")]
    InvalidTransition {
        /// The transition that was attempted
        action: &'static str,
        /// The experiment's status at the time of the attempt
        status: ExperimentStatus,
    },

    /// Unknown experiment ID
    #[error("Experiment not found: {0}")]
    ExperimentNotFound(String),

    /// Unknown variant ID within an experiment
    #[error("Variant not found: {0}")]
    VariantNotFound(String),
}
