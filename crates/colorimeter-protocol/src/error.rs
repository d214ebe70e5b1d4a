//! Error types for the telemetry protocol.

use thiserror::Error;

/// Errors that can occur when working with the telemetry protocol.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// Command text would not survive line framing.
    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

/// Result type alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
