//! Environment-derived configuration.
//!
//! All knobs come from `RIPPLE_*` environment variables. Every optional
//! value has a documented default; malformed numeric values fall back to
//! the default with a warning rather than aborting startup.

use crate::error::{Error, Result};
use std::time::Duration;

/// Default TTL for the cached authentication token, in seconds.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Default TTL for cached node-search results, in seconds.
pub const DEFAULT_SEARCH_TTL_SECS: u64 = 300;

/// Default TTL for cached impact graphs, in seconds.
pub const DEFAULT_IMPACT_TTL_SECS: u64 = 300;

/// Default total request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Default connect timeout, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Workspace used when `RIPPLE_WORKSPACE_NAME` is unset.
pub const DEFAULT_WORKSPACE_NAME: &str = "default-workspace";

/// Configuration for the graph-server client.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the graph server (no trailing slash).
    pub server_url: String,

    /// Username for the credential exchange.
    pub username: String,

    /// Password for the credential exchange.
    pub password: String,

    /// Workspace whose materialized view is queried.
    pub workspace_name: String,

    /// When true, impact payloads are dumped to a temp directory.
    pub debug: bool,

    /// How long an authentication token stays cached.
    pub token_cache_ttl: Duration,

    /// How long node-search results stay cached.
    pub search_cache_ttl: Duration,

    /// How long impact graphs stay cached.
    pub impact_cache_ttl: Duration,

    /// Total timeout for a single request.
    pub request_timeout: Duration,

    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
}

impl Config {
    /// Load configuration from `RIPPLE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `RIPPLE_SERVER_URL`, `RIPPLE_USERNAME`,
    /// or `RIPPLE_PASSWORD` is missing or empty.
    pub fn from_env() -> Result<Self> {
        let server_url = required_var("RIPPLE_SERVER_URL")?
            .trim_end_matches('/')
            .to_string();
        let username = required_var("RIPPLE_USERNAME")?;
        let password = required_var("RIPPLE_PASSWORD")?;

        let workspace_name = match std::env::var("RIPPLE_WORKSPACE_NAME") {
            Ok(name) if !name.trim().is_empty() => name,
            _ => {
                tracing::warn!(
                    "RIPPLE_WORKSPACE_NAME not set, using '{DEFAULT_WORKSPACE_NAME}'"
                );
                DEFAULT_WORKSPACE_NAME.to_string()
            }
        };

        let debug = std::env::var("RIPPLE_DEBUG")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            server_url,
            username,
            password,
            workspace_name,
            debug,
            token_cache_ttl: secs_var("RIPPLE_TOKEN_CACHE_TTL", DEFAULT_TOKEN_TTL_SECS),
            search_cache_ttl: secs_var("RIPPLE_SEARCH_CACHE_TTL", DEFAULT_SEARCH_TTL_SECS),
            impact_cache_ttl: secs_var("RIPPLE_IMPACT_CACHE_TTL", DEFAULT_IMPACT_TTL_SECS),
            request_timeout: secs_var("RIPPLE_REQUEST_TIMEOUT", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: secs_var("RIPPLE_CONNECT_TIMEOUT", DEFAULT_CONNECT_TIMEOUT_SECS),
        })
    }
}

fn required_var(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!("{name} must be set"))),
    }
}

/// Read a duration (in seconds) from the environment, falling back to
/// `default` on absence or parse failure.
fn secs_var(name: &'static str, default: u64) -> Duration {
    let secs = match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("{name} is not a valid number of seconds, using default {default}");
            default
        }),
        Err(_) => default,
    };
    Duration::from_secs(secs)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a config without touching the process environment.
    ///
    /// Integration tests construct `Config` directly; env-var handling is
    /// covered by the helper tests below.
    pub(crate) fn test_config(server_url: &str) -> Config {
        Config {
            server_url: server_url.trim_end_matches('/').to_string(),
            username: "tester".to_string(),
            password: "secret".to_string(),
            workspace_name: "test-workspace".to_string(),
            debug: false,
            token_cache_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
            search_cache_ttl: Duration::from_secs(DEFAULT_SEARCH_TTL_SECS),
            impact_cache_ttl: Duration::from_secs(DEFAULT_IMPACT_TTL_SECS),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_secs_var_default_when_absent() {
        assert_eq!(
            secs_var("RIPPLE_TEST_UNSET_VARIABLE", 42),
            Duration::from_secs(42)
        );
    }

    #[test]
    fn test_config_defaults() {
        let config = test_config("https://graph.example.com/");
        assert_eq!(config.server_url, "https://graph.example.com");
        assert_eq!(config.token_cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.search_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.impact_cache_ttl, Duration::from_secs(300));
    }
}
