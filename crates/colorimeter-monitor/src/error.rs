//! Error types for the monitor.

use colorimeter_color::ColorError;
use colorimeter_protocol::ProtocolError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when opening a link.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The serial device could not be opened or configured.
    #[error("Failed to open serial port {path}: {source}")]
    Serial {
        /// Device path.
        path: String,
        /// Underlying error.
        #[source]
        source: serialport::Error,
    },

    /// The TCP endpoint could not be reached.
    #[error("Failed to connect to {address}: {source}")]
    Tcp {
        /// Endpoint address.
        address: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Serial port enumeration failed.
    #[error("Failed to list serial ports: {0}")]
    Enumerate(#[source] serialport::Error),

    /// The simulated sensor rejected its configuration.
    #[error("Simulated sensor error: {0}")]
    Simulation(#[from] opt4048::Opt4048Error),
}

/// Errors that can occur during a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The link could not be opened.
    #[error("Connection failed: {0}")]
    Connect(#[from] TransportError),

    /// The session has already been disconnected.
    #[error("Not connected")]
    NotConnected,

    /// The command text cannot be framed.
    #[error(transparent)]
    Command(#[from] ProtocolError),

    /// Writing to the link failed.
    #[error("Write failed: {0}")]
    Write(#[source] io::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid YAML for this schema.
    #[error("Invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Diagram bounds are unusable.
    #[error(transparent)]
    Plot(#[from] ColorError),

    /// No link was configured in the file or on the command line.
    #[error("No link configured: use --port, --tcp, or --simulate, or set `link` in the config file")]
    MissingLink,

    /// A value is out of range.
    #[error("Invalid {field}: {reason}")]
    Invalid {
        /// Setting name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}
