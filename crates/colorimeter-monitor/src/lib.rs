//! # colorimeter-monitor
//!
//! Host-side monitor for a colorimeter board built around the OPT4048 sensor.
//!
//! The board prints telemetry lines over a serial link. A [`Session`] owns that link
//! for the lifetime of one connection: it reads chunks, assembles lines, decodes
//! readings, converts chromaticity to a display color and diagram position, and hands
//! everything to a [`DisplaySink`]. Commands typed by the operator are written to the
//! same link between reads.
//!
//! ## Components
//!
//! - [`transport`]: the [`Transport`] trait plus serial, TCP, and simulated links
//! - [`session`]: connection lifecycle and the read loop
//! - [`display`]: terminal and JSON display sinks
//! - [`config`]: YAML configuration and command-line overrides
//! - [`metric_defs`]: metric declarations

pub mod cli;
pub mod config;
pub mod display;
mod error;
pub mod metric_defs;
pub mod session;
pub mod simulate;
pub mod transport;

pub use cli::Cli;
pub use config::{LinkConfig, MonitorConfig, OutputFormat};
pub use display::{DisplaySink, DisplayState, JsonDisplay, LogKind, TerminalDisplay};
pub use error::{ConfigError, SessionError, TransportError};
pub use session::{Session, SessionEnd, SessionOptions, SessionStats, StopSignal};
pub use simulate::SimulatedTransport;
pub use transport::{open_transport, SerialTransport, TcpTransport, Transport};
