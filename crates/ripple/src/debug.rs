//! Debug artifact dumps for raw server payloads.

use serde::Serialize;
use std::path::PathBuf;

/// Directory under the system temp dir where artifacts land.
const ARTIFACT_DIR: &str = "ripple-mcp";

/// Write a pretty-printed JSON artifact when debug dumps are enabled.
///
/// Failures are logged and swallowed: debug output must never take a
/// tool invocation down with it.
pub(crate) fn dump_json<T: Serialize>(enabled: bool, name: &str, value: &T) {
    if !enabled {
        return;
    }
    match write_artifact(name, value) {
        Ok(path) => tracing::debug!(path = %path.display(), "debug artifact written"),
        Err(err) => tracing::warn!(name, error = %err, "failed to write debug artifact"),
    }
}

fn write_artifact<T: Serialize>(name: &str, value: &T) -> crate::error::Result<PathBuf> {
    let dir = std::env::temp_dir().join(ARTIFACT_DIR);
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value)?)?;
    Ok(path)
}
