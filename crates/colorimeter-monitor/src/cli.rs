//! Command-line arguments.

use crate::config::{LinkConfig, MonitorConfig, OutputFormat};
use crate::error::ConfigError;
use crate::simulate::DEFAULT_INTERVAL_MS;
use crate::transport::DEFAULT_BAUD_RATE;
use clap::Parser;
use std::path::PathBuf;

/// Monitor an OPT4048 colorimeter board over a serial link.
///
/// Decoded readings and chromaticity markers are written to stdout; diagnostics go to
/// stderr. Lines typed on stdin are sent to the board as commands.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "colorimeter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// YAML configuration file. Command-line flags override its values.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Serial device the board is attached to.
    #[arg(short, long, conflicts_with_all = ["tcp", "simulate"])]
    pub port: Option<String>,

    /// Serial baud rate [default: 115200].
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Connect to a TCP endpoint exposing the board's UART (host:port).
    #[arg(long, conflicts_with = "simulate")]
    pub tcp: Option<String>,

    /// Use a simulated board instead of hardware.
    #[arg(long)]
    pub simulate: bool,

    /// Milliseconds between simulated measurements.
    #[arg(long, requires = "simulate")]
    pub interval_ms: Option<u64>,

    /// Write one JSON object per event instead of text.
    #[arg(short, long)]
    pub json: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to send after connecting (repeatable).
    #[arg(long = "command", value_name = "TEXT")]
    pub commands: Vec<String>,

    /// List serial ports and exit.
    #[arg(long)]
    pub list_ports: bool,
}

impl Cli {
    /// Build the effective configuration: file values, then flag overrides.
    pub fn resolve(&self) -> Result<MonitorConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => MonitorConfig::load(path)?,
            None => MonitorConfig::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut MonitorConfig) {
        if let Some(path) = &self.port {
            config.link = Some(LinkConfig::Serial {
                path: path.clone(),
                baud_rate: self.baud.unwrap_or(DEFAULT_BAUD_RATE),
            });
        } else if let Some(address) = &self.tcp {
            config.link = Some(LinkConfig::Tcp {
                address: address.clone(),
            });
        } else if self.simulate {
            config.link = Some(LinkConfig::Simulate {
                interval_ms: self.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS),
                scenes: match &config.link {
                    Some(LinkConfig::Simulate { scenes, .. }) => scenes.clone(),
                    _ => Vec::new(),
                },
            });
        } else if let (Some(baud), Some(LinkConfig::Serial { baud_rate, .. })) =
            (self.baud, config.link.as_mut())
        {
            *baud_rate = baud;
        }

        if self.json {
            config.output = OutputFormat::Json;
        }
        config.startup_commands.extend(self.commands.iter().cloned());
    }
}
