//! Shared setup for the replay, fuzz and level-dump binaries.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use game_core::SessionConfig;
use tracing_subscriber::EnvFilter;

const LOG_FILTER: &str = "warn,zeta_core=info";

/// Installs the fmt subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// Reads a TOML session config, or the defaults when no path is given.
pub fn load_session_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}
