//! Core change-impact analysis library.
//!
//! Ripple talks to a remote code-intelligence graph server: it
//! authenticates, resolves a workspace to its latest materialized view,
//! searches the view for methods or database entities, fetches their
//! transitive impact graphs, and classifies what it finds (dependents,
//! application boundaries, REST surface, complexity) into deterministic
//! markdown reports.
//!
//! The [`client::GraphClient`] owns the network surface and the TTL
//! caches; [`graph`] holds the data model and classification passes;
//! [`report`] renders the analysis results. The MCP-facing binary lives
//! in a separate crate and depends on all three.

pub mod cache;
pub mod client;
pub mod config;
mod debug;
pub mod error;
pub mod graph;
pub mod report;

pub use client::{DatabaseEntityType, GraphClient};
pub use config::Config;
pub use error::{Error, Result};
