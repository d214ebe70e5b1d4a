//! Colorimeter Telemetry Protocol
//!
//! This crate provides types and utilities for talking to a colorimeter sensor board
//! over a serial link. The board speaks a simple line-based text protocol.
//!
//! # Protocol Overview
//!
//! - **Telemetry** (board → host): newline-terminated text lines. A line may carry any
//!   subset of four labeled values, in any order, mixed with free-form log text:
//!   `CIE x: <float>`, `CIE y: <float>`, `Lux: <float>`, `Color Temperature: <float>`.
//! - **Commands** (host → board): arbitrary text terminated with `\n`. No
//!   acknowledgement is expected.
//!
//! Chunks from the transport arrive at arbitrary boundaries, so bytes are first
//! decoded incrementally as UTF-8 and then assembled into complete lines.
//!
//! # Example
//!
//! ```rust
//! use colorimeter_protocol::{decode, Field, LineCodec};
//!
//! let mut codec = LineCodec::new();
//! assert!(codec.push(b"CIE x: 0.3127 CIE").is_empty());
//! let lines = codec.push(b" y: 0.3290\n");
//! assert_eq!(lines, vec!["CIE x: 0.3127 CIE y: 0.3290".to_string()]);
//!
//! let reading = decode(&lines[0]);
//! assert_eq!(reading.chromaticity(), Some((0.3127, 0.3290)));
//! assert_eq!(reading.format(Field::Lux), "-");
//! ```

mod codec;
mod commands;
mod error;
mod telemetry;

pub use codec::*;
pub use commands::*;
pub use error::*;
pub use telemetry::*;
