//! Throttle configuration
//!
//! Loaded from TOML:
//! ```toml
//! delay_ms = 250
//! dispatch = "tokio"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default quiescence window
pub const DEFAULT_DELAY_MS: u64 = 200;

/// Where batch callbacks run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// One OS thread per batch
    #[default]
    Thread,
    /// Blocking task on the ambient Tokio runtime
    Tokio,
}

/// Throttle settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Quiescence window in milliseconds (0 delivers on the next loop turn)
    pub delay_ms: u64,

    /// Batch dispatch strategy
    pub dispatch: DispatchMode,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            dispatch: DispatchMode::Thread,
        }
    }
}

impl ThrottleConfig {
    /// Parse configuration from TOML text; missing fields take defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse throttle config")
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Render configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize throttle config")
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}
