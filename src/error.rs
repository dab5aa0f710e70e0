//! Error types for generation and analysis

use thiserror::Error;

/// Errors surfaced by samplers, correlators, and the analyzer
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing required parameter
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced column header does not exist in the input table
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// An `${NAME}` parameter could not be resolved from the environment
    #[error("environment variable {0} is not set or not parsable")]
    EnvVar(String),

    /// Failure inside a statistical primitive (degenerate input, bad fit)
    #[error("statistical computation failed: {0}")]
    Statistical(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Shorthand for the most common failure mode
pub fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidArgument(msg.into())
}
