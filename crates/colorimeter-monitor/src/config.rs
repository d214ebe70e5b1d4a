//! Monitor configuration.
//!
//! Settings come from an optional YAML file, then command-line overrides (see
//! [`crate::cli`]). Every field has a default, so an empty file is valid.
//!
//! ```yaml
//! link:
//!   type: serial
//!   path: /dev/ttyACM0
//!   baud_rate: 115200
//! plot:
//!   x_max: 0.8
//!   y_max: 0.9
//! read_timeout_ms: 100
//! startup_commands: []
//! output: text
//! ```

use crate::error::ConfigError;
use crate::session::{SessionOptions, DEFAULT_READ_BUFFER_SIZE};
use crate::simulate::DEFAULT_INTERVAL_MS;
use crate::transport::DEFAULT_BAUD_RATE;
use colorimeter_color::PlotBounds;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default read timeout; bounds how long a stop request waits.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 100;

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

/// Which link to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LinkConfig {
    /// A local serial device.
    Serial {
        /// Device path, e.g. `/dev/ttyACM0` or `COM3`.
        path: String,
        /// Baud rate.
        #[serde(default = "default_baud_rate")]
        baud_rate: u32,
    },
    /// A TCP endpoint exposing the board's UART.
    Tcp {
        /// `host:port`.
        address: String,
    },
    /// A simulated board.
    Simulate {
        /// Milliseconds between measurements.
        #[serde(default = "default_interval_ms")]
        interval_ms: u64,
        /// Channel codes to cycle through; built-in scenes when empty.
        #[serde(default)]
        scenes: Vec<[u32; 4]>,
    },
}

/// How the display is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Complete monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// The link to open. Required before connecting.
    pub link: Option<LinkConfig>,
    /// Chromaticity diagram bounds.
    pub plot: PlotBounds,
    /// Read timeout in milliseconds.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Commands sent right after connecting.
    pub startup_commands: Vec<String>,
    /// Display format.
    pub output: OutputFormat,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            link: None,
            plot: PlotBounds::default(),
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            startup_commands: Vec::new(),
            output: OutputFormat::Text,
        }
    }
}

impl MonitorConfig {
    /// Parse configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Check every value, including that a link is configured.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.plot.validate()?;

        if self.read_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "read_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }

        match &self.link {
            None => return Err(ConfigError::MissingLink),
            Some(LinkConfig::Serial { path, baud_rate }) => {
                if path.trim().is_empty() {
                    return Err(ConfigError::Invalid {
                        field: "link.path",
                        reason: "must not be empty".to_string(),
                    });
                }
                if *baud_rate == 0 {
                    return Err(ConfigError::Invalid {
                        field: "link.baud_rate",
                        reason: "must be greater than zero".to_string(),
                    });
                }
            }
            Some(LinkConfig::Tcp { address }) => {
                if !address.contains(':') {
                    return Err(ConfigError::Invalid {
                        field: "link.address",
                        reason: format!("expected host:port, got {:?}", address),
                    });
                }
            }
            Some(LinkConfig::Simulate { interval_ms, .. }) => {
                if *interval_ms == 0 {
                    return Err(ConfigError::Invalid {
                        field: "link.interval_ms",
                        reason: "must be greater than zero".to_string(),
                    });
                }
            }
        }

        for command in &self.startup_commands {
            if command.contains(['\n', '\r']) {
                return Err(ConfigError::Invalid {
                    field: "startup_commands",
                    reason: format!("command {:?} contains a line break", command),
                });
            }
        }

        Ok(())
    }

    /// The read timeout as a [`Duration`].
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Settings for a [`crate::Session`] built from this configuration.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            plot: self.plot,
            startup_commands: self.startup_commands.clone(),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}
