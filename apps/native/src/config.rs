use connectors::constants::{serial, watchdog};
use core_types::DeviceProfile;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid framing: {0}")]
    Framing(String),
}

/// Monitor settings, loaded from an optional JSON file.
///
/// ```json
/// { "poll_interval_ms": 250, "profile": { "baud_rate": 9600 } }
/// ```
///
/// `framing` is a shorthand like `"7E1"` that overrides the profile's line
/// settings while keeping its baud rate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    pub poll_interval_ms: u64,
    pub profile: DeviceProfile,
    pub framing: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let profile = DeviceProfile::from_framing(serial::DEFAULT_FRAMING, serial::DEFAULT_BAUD)
            .unwrap_or_else(|_| DeviceProfile::new_8n1(serial::DEFAULT_BAUD));
        Self {
            poll_interval_ms: watchdog::POLL_INTERVAL_MS,
            profile,
            framing: None,
        }
    }
}

impl MonitorConfig {
    /// Defaults when `path` is `None`, otherwise the parsed file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        config.resolve()
    }

    fn resolve(mut self) -> Result<Self, ConfigError> {
        if let Some(framing) = &self.framing {
            let parsed = DeviceProfile::from_framing(framing, self.profile.baud_rate)
                .map_err(ConfigError::Framing)?;
            self.profile = DeviceProfile {
                read_timeout_ms: self.profile.read_timeout_ms,
                ..parsed.with_flow_control(self.profile.flow_control)
            };
        }
        Ok(self)
    }

    /// Poll interval, never below the configured floor
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(watchdog::MIN_POLL_INTERVAL_MS))
    }
}
