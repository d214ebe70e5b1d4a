//! CIE xyY to sRGB conversion.
//!
//! The conversion fixes relative luminance at `Y = 1`, so the resulting color shows
//! the hue and saturation of the measured light, not its brightness.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Linear-to-sRGB threshold below which the transfer function is linear.
const SRGB_LINEAR_THRESHOLD: f64 = 0.003_130_8;

/// Slope of the linear segment of the sRGB transfer function.
const SRGB_LINEAR_SLOPE: f64 = 12.92;

/// Exponent of the power segment of the sRGB transfer function.
const SRGB_GAMMA: f64 = 2.4;

/// XYZ → linear sRGB matrix (D65 reference white), row-major.
const XYZ_TO_SRGB: [[f64; 3]; 3] = [
    [3.2406, -1.5372, -0.4986],
    [-0.9689, 1.8758, 0.0415],
    [0.0557, -0.2040, 1.0570],
];

/// CIE 1931 XYZ tristimulus values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Xyz {
    /// X tristimulus value.
    pub x: f64,
    /// Y tristimulus value (luminance).
    pub y: f64,
    /// Z tristimulus value.
    pub z: f64,
}

/// An 8-bit sRGB color derived from a chromaticity coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayColor {
    /// Red channel (0-255).
    pub r: u8,
    /// Green channel (0-255).
    pub g: u8,
    /// Blue channel (0-255).
    pub b: u8,
}

impl DisplayColor {
    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        DisplayColor { r, g, b }
    }

    /// Format as `#RRGGBB`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Format as a CSS `rgb(r, g, b)` function.
    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    /// The channels as an array.
    pub fn to_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for DisplayColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Convert a chromaticity coordinate to XYZ with `Y = 1`.
///
/// Returns `None` when `y` is zero, where the conversion is undefined.
pub fn xy_to_xyz(x: f64, y: f64) -> Option<Xyz> {
    if y == 0.0 {
        return None;
    }
    Some(Xyz {
        x: x / y,
        y: 1.0,
        z: (1.0 - x - y) / y,
    })
}

/// Convert XYZ to linear (not yet gamma-encoded) sRGB channels.
pub fn xyz_to_linear_srgb(xyz: Xyz) -> [f64; 3] {
    let v = [xyz.x, xyz.y, xyz.z];
    let mut out = [0.0; 3];
    for (channel, row) in out.iter_mut().zip(XYZ_TO_SRGB.iter()) {
        *channel = row[0] * v[0] + row[1] * v[1] + row[2] * v[2];
    }
    out
}

/// Apply the sRGB transfer function to one linear channel value.
///
/// The result is not clamped; negative and above-one inputs pass through the
/// respective segment of the curve.
pub fn gamma_encode(v: f64) -> f64 {
    if v <= SRGB_LINEAR_THRESHOLD {
        SRGB_LINEAR_SLOPE * v
    } else {
        1.055 * v.powf(1.0 / SRGB_GAMMA) - 0.055
    }
}

fn to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn in_unit_range(v: f64) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

/// Derive an approximate display color for a chromaticity coordinate.
///
/// Returns `None` when either coordinate is non-finite or outside `[0, 1]`, or when
/// `y` is zero. Out-of-gamut colors are clamped channel-wise.
pub fn to_display_color(x: f64, y: f64) -> Option<DisplayColor> {
    if !in_unit_range(x) || !in_unit_range(y) {
        return None;
    }
    let xyz = xy_to_xyz(x, y)?;
    let [r, g, b] = xyz_to_linear_srgb(xyz).map(gamma_encode);
    Some(DisplayColor::new(to_u8(r), to_u8(g), to_u8(b)))
}
