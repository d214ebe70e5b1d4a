//! Telemetry line decoding.
//!
//! Each of the four measured quantities is reported as `<Label>: <number>`. Labels are
//! matched independently, so a line may carry any subset of them in any order, and
//! unrelated text around them is ignored.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Text shown for a field that has no value.
pub const PLACEHOLDER: &str = "-";

static CIE_X: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CIE x: ([0-9.]+)").expect("valid telemetry pattern"));
static CIE_Y: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CIE y: ([0-9.]+)").expect("valid telemetry pattern"));
static LUX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Lux: ([0-9.]+)").expect("valid telemetry pattern"));
static COLOR_TEMPERATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Color Temperature: ([0-9.]+)").expect("valid telemetry pattern")
});

/// A labeled quantity in the telemetry protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// CIE 1931 chromaticity x (`CIE x`)
    CieX,
    /// CIE 1931 chromaticity y (`CIE y`)
    CieY,
    /// Illuminance in lux (`Lux`)
    Lux,
    /// Correlated color temperature in kelvin (`Color Temperature`)
    ColorTemperature,
}

impl Field {
    /// All fields, in display order.
    pub const ALL: [Field; 4] = [Field::CieX, Field::CieY, Field::Lux, Field::ColorTemperature];

    /// The label as it appears on the wire.
    pub fn label(&self) -> &'static str {
        match self {
            Field::CieX => "CIE x",
            Field::CieY => "CIE y",
            Field::Lux => "Lux",
            Field::ColorTemperature => "Color Temperature",
        }
    }

    /// Number of decimal digits used when displaying this field.
    pub fn precision(&self) -> usize {
        match self {
            Field::CieX | Field::CieY => 6,
            Field::Lux => 2,
            Field::ColorTemperature => 0,
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            Field::CieX => &CIE_X,
            Field::CieY => &CIE_Y,
            Field::Lux => &LUX,
            Field::ColorTemperature => &COLOR_TEMPERATURE,
        }
    }

    /// Extract this field's value from a line.
    ///
    /// Returns `None` if the label is absent or its number does not parse.
    pub fn extract(&self, line: &str) -> Option<f64> {
        self.pattern()
            .captures(line)?
            .get(1)?
            .as_str()
            .parse()
            .ok()
    }

    /// Format a value with this field's display precision.
    ///
    /// Ties round away from zero (`6504.5` shows as `6505`), not to even.
    pub fn format_value(&self, value: f64) -> String {
        let precision = self.precision();
        let scale = 10f64.powi(precision as i32);
        let rounded = (value * scale).round() / scale;
        format!("{:.*}", precision, rounded)
    }
}

/// Values decoded from one telemetry line.
///
/// A field is `None` when the line did not carry it, which is distinct from a
/// reported value of zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Reading {
    /// CIE 1931 chromaticity x.
    pub cie_x: Option<f64>,
    /// CIE 1931 chromaticity y.
    pub cie_y: Option<f64>,
    /// Illuminance in lux.
    pub lux: Option<f64>,
    /// Correlated color temperature in kelvin.
    pub color_temp_k: Option<f64>,
}

impl Reading {
    /// Get a field's value.
    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::CieX => self.cie_x,
            Field::CieY => self.cie_y,
            Field::Lux => self.lux,
            Field::ColorTemperature => self.color_temp_k,
        }
    }

    /// Whether no field was present.
    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// Both chromaticity coordinates, if the line carried both.
    pub fn chromaticity(&self) -> Option<(f64, f64)> {
        Some((self.cie_x?, self.cie_y?))
    }

    /// Format a field for display, or the placeholder when absent.
    pub fn format(&self, field: Field) -> String {
        match self.get(field) {
            Some(value) => field.format_value(value),
            None => PLACEHOLDER.to_string(),
        }
    }

    /// The fields present in this reading, in display order.
    pub fn present_fields(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        Field::ALL
            .into_iter()
            .filter_map(move |f| self.get(f).map(|v| (f, v)))
    }
}

/// Decode one telemetry line.
pub fn decode(line: &str) -> Reading {
    Reading {
        cie_x: Field::CieX.extract(line),
        cie_y: Field::CieY.extract(line),
        lux: Field::Lux.extract(line),
        color_temp_k: Field::ColorTemperature.extract(line),
    }
}
