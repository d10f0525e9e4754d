//! Shared utilities for CLI commands

use anyhow::Result;
use std::path::Path;
use throttle::{DispatchMode, ThrottleConfig};

/// Load the config file (or defaults) and apply command-line overrides
pub fn resolve_config(
    path: Option<&Path>,
    delay_ms: Option<u64>,
    tokio: bool,
) -> Result<ThrottleConfig> {
    let mut config = match path {
        Some(path) => ThrottleConfig::load(path)?,
        None => ThrottleConfig::default(),
    };

    if let Some(delay_ms) = delay_ms {
        config.delay_ms = delay_ms;
    }
    if tokio {
        config.dispatch = DispatchMode::Tokio;
    }

    tracing::debug!(?config, "Resolved throttle config");
    Ok(config)
}
