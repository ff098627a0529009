//! Error types for ripple operations.
//!
//! Two failure modes deliberately do NOT appear here:
//!
//! - A node search that times out or errors is recovered into an empty
//!   result list so callers can render an "unable to analyze" report
//!   instead of crashing. See [`crate::client::GraphClient::find_method_nodes`].
//! - Impact fetch failures for one entity in a batch are logged and
//!   skipped by the caller; the rest of the batch still renders.

use thiserror::Error;

/// The error type for ripple operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Credential exchange with the graph server was rejected or unreachable.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A workspace or view lookup on the graph server failed.
    #[error("Remote lookup failed for {context} (HTTP {status})")]
    Lookup {
        /// What was being looked up (workspace definition, latest view).
        context: String,
        /// HTTP status code returned by the server.
        status: u16,
    },

    /// A class name was supplied but no candidate node's identity contains it.
    ///
    /// Distinct from an empty search: the method exists, the disambiguating
    /// class does not.
    #[error("No matching class found for {0}")]
    ClassNotFound(String),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An HTTP transport error occurred.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse a JSON payload from the server.
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred (debug artifact dumps).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for ripple operations.
pub type Result<T> = std::result::Result<T, Error>;
