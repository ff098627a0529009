//! Error types for the ripple MCP server.

use thiserror::Error;

/// Errors that can occur in the ripple MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid argument value provided.
    #[error("Invalid {field}: '{value}'. Valid values: {valid_values}")]
    InvalidArgument {
        /// The field name that had an invalid value.
        field: &'static str,
        /// The invalid value that was provided.
        value: String,
        /// Description of valid values.
        valid_values: &'static str,
    },

    /// A required argument was missing for the requested combination.
    #[error("Missing {field}: {reason}")]
    MissingArgument {
        /// The field name that was required.
        field: &'static str,
        /// Why the field is required here.
        reason: &'static str,
    },

    /// An error from the core analysis layer.
    #[error(transparent)]
    Core(#[from] ripple::Error),
}

/// Result type alias for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;
