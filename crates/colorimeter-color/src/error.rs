//! Error types for the color crate.

use thiserror::Error;

/// Errors that can occur when configuring color or plot parameters.
#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    /// Diagram bounds must be finite and strictly positive.
    #[error("Invalid plot bounds: x_max={x_max}, y_max={y_max} (both must be finite and > 0)")]
    InvalidBounds {
        /// Requested maximum x chromaticity.
        x_max: f64,
        /// Requested maximum y chromaticity.
        y_max: f64,
    },
}
