//! # colorimeter-color
//!
//! Color math for the colorimeter monitor.
//!
//! A tristimulus sensor reports chromaticity as CIE 1931 `(x, y)` coordinates. This
//! crate turns such a coordinate pair into:
//!
//! - an approximate display color ([`DisplayColor`]), by assuming relative luminance
//!   `Y = 1` and running the standard xyY → XYZ → linear sRGB → gamma-encoded sRGB
//!   pipeline, and
//! - a marker position on a chromaticity diagram ([`PlotPosition`]), given the visible
//!   axis ranges of that diagram ([`PlotBounds`]).
//!
//! ## Example
//!
//! ```
//! use colorimeter_color::{to_display_color, PlotBounds};
//!
//! // D65 white point
//! let color = to_display_color(0.3127, 0.3290).unwrap();
//! assert_eq!(color.to_hex(), "#FFFFFF");
//!
//! let pos = PlotBounds::default().position(0.4, 0.45);
//! assert!((pos.percent_x - 50.0).abs() < 1e-9);
//! assert!((pos.percent_y - 50.0).abs() < 1e-9);
//! ```

mod error;
mod plot;
mod srgb;

pub use error::ColorError;
pub use plot::{PlotBounds, PlotPoint, PlotPosition, DEFAULT_X_MAX, DEFAULT_Y_MAX};
pub use srgb::{
    gamma_encode, to_display_color, xy_to_xyz, xyz_to_linear_srgb, DisplayColor, Xyz,
};

/// Result type for color operations.
pub type Result<T> = std::result::Result<T, ColorError>;
