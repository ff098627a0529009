//! MCP server for ripple change-impact analysis.
//!
//! This crate provides an MCP (Model Context Protocol) server that lets
//! AI assistants query a code-intelligence graph server before making
//! changes.
//!
//! # Architecture
//!
//! The server uses the `rmcp` crate for MCP protocol handling and wraps
//! the `GraphClient` from the ripple crate. All tool output is markdown
//! text so it can be passed straight into a model's context.
//!
//! # Tools
//!
//! ## Impact Analysis
//! - `method_impact` - Blast radius of modifying a method
//! - `database_impact` - Blast radius of modifying a column, table, or view
//!
//! ## CI/CD Integration
//! - `docker_agent` - Docker agent scan snippet for a pipeline
//! - `build_info` - Build-metadata capture snippet
//! - `pipeline_helper` - Complete per-platform pipeline guide

pub mod error;
pub mod models;
pub mod server;
pub mod templates;
pub mod tools;

pub use error::{Error, Result};
pub use server::RippleMcpServer;
