//! Chromaticity diagram coordinate mapping.
//!
//! The diagram is drawn with its origin at the top-left corner of the image, so the
//! y axis is inverted relative to chromaticity space.

use crate::error::ColorError;
use crate::srgb::DisplayColor;
use serde::{Deserialize, Serialize};

/// Default upper bound of the diagram's x axis.
pub const DEFAULT_X_MAX: f64 = 0.8;

/// Default upper bound of the diagram's y axis.
pub const DEFAULT_Y_MAX: f64 = 0.9;

/// Visible chromaticity range of a diagram: `x ∈ [0, x_max]`, `y ∈ [0, y_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotBounds {
    /// Chromaticity x at the right edge of the diagram.
    pub x_max: f64,
    /// Chromaticity y at the top edge of the diagram.
    pub y_max: f64,
}

impl Default for PlotBounds {
    fn default() -> Self {
        PlotBounds {
            x_max: DEFAULT_X_MAX,
            y_max: DEFAULT_Y_MAX,
        }
    }
}

impl PlotBounds {
    /// Create validated bounds.
    pub fn new(x_max: f64, y_max: f64) -> Result<Self, ColorError> {
        let bounds = PlotBounds { x_max, y_max };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Check that both bounds are finite and strictly positive.
    pub fn validate(&self) -> Result<(), ColorError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.x_max) && ok(self.y_max) {
            Ok(())
        } else {
            Err(ColorError::InvalidBounds {
                x_max: self.x_max,
                y_max: self.y_max,
            })
        }
    }

    /// Map a chromaticity coordinate to a percentage position within the diagram.
    ///
    /// Points outside the bounds map outside `[0, 100]`; placement policy for those is
    /// left to the display.
    pub fn position(&self, x: f64, y: f64) -> PlotPosition {
        PlotPosition {
            percent_x: (x / self.x_max) * 100.0,
            percent_y: (1.0 - y / self.y_max) * 100.0,
        }
    }
}

/// Marker position as percentages of the diagram width and height, measured from the
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotPosition {
    /// Horizontal offset, percent of width.
    pub percent_x: f64,
    /// Vertical offset, percent of height.
    pub percent_y: f64,
}

impl PlotPosition {
    /// Whether the marker lands inside the visible diagram.
    pub fn is_visible(&self) -> bool {
        (0.0..=100.0).contains(&self.percent_x) && (0.0..=100.0).contains(&self.percent_y)
    }
}

/// A plotted measurement: where the marker goes and what color the swatch shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    /// Chromaticity x.
    pub x: f64,
    /// Chromaticity y.
    pub y: f64,
    /// Marker position on the diagram.
    pub position: PlotPosition,
    /// Swatch color.
    pub color: DisplayColor,
}
