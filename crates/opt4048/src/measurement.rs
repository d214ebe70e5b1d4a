//! Conversion from channel codes to colorimetric quantities.

use crate::channel::ChannelSample;
use crate::registers::CHANNEL_COUNT;
use serde::{Deserialize, Serialize};

/// Channel code → CIE XYZ conversion coefficients from the sensor datasheet.
///
/// Row `i` holds the contribution of channel `i` to X, Y, and Z.
pub const XYZ_MATRIX: [[f64; 3]; CHANNEL_COUNT] = [
    [2.348_929_92e-4, -1.896_523_90e-5, 1.208_116_84e-5],
    [4.074_674_41e-5, 1.989_582_02e-4, -1.588_481_15e-5],
    [9.286_194_04e-5, -1.697_395_53e-5, 6.740_215_20e-4],
    [0.0, 0.0, 0.0],
];

/// Lux per code on channel 1.
pub const LUX_PER_CODE: f64 = 2.15e-3;

/// Correlated color temperature by McCamy's cubic approximation.
///
/// Returns `None` on the singular line `y = 0.1858`.
pub fn mccamy_cct(x: f64, y: f64) -> Option<f64> {
    let denom = 0.1858 - y;
    if denom == 0.0 {
        return None;
    }
    let n = (x - 0.3320) / denom;
    let cct = 437.0 * n.powi(3) + 3601.0 * n.powi(2) + 6861.0 * n + 5517.0;
    cct.is_finite().then_some(cct)
}

/// Colorimetric values computed from one set of channel codes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// CIE X tristimulus value.
    pub x_tristimulus: f64,
    /// CIE Y tristimulus value.
    pub y_tristimulus: f64,
    /// CIE Z tristimulus value.
    pub z_tristimulus: f64,
    /// Chromaticity `(x, y)`; absent when the tristimulus sum is not positive.
    pub chromaticity: Option<(f64, f64)>,
    /// Illuminance in lux.
    pub lux: f64,
    /// Correlated color temperature in kelvin.
    pub color_temp_k: Option<f64>,
}

impl Measurement {
    /// Compute from raw channel codes.
    pub fn from_codes(codes: [u32; CHANNEL_COUNT]) -> Measurement {
        let mut xyz = [0.0f64; 3];
        for (code, row) in codes.iter().zip(XYZ_MATRIX.iter()) {
            for (acc, coeff) in xyz.iter_mut().zip(row.iter()) {
                *acc += *code as f64 * coeff;
            }
        }
        let [x_t, y_t, z_t] = xyz;

        let sum = x_t + y_t + z_t;
        let chromaticity = (sum > 0.0).then(|| (x_t / sum, y_t / sum));
        let color_temp_k = chromaticity.and_then(|(x, y)| mccamy_cct(x, y));

        Measurement {
            x_tristimulus: x_t,
            y_tristimulus: y_t,
            z_tristimulus: z_t,
            chromaticity,
            lux: codes[1] as f64 * LUX_PER_CODE,
            color_temp_k,
        }
    }

    /// Compute from decoded channel samples.
    pub fn from_samples(samples: &[ChannelSample; CHANNEL_COUNT]) -> Measurement {
        Measurement::from_codes((*samples).map(|s| s.code()))
    }

    /// The telemetry line the board prints for this measurement.
    ///
    /// Chromaticity and color temperature are omitted when undefined.
    pub fn telemetry_line(&self) -> String {
        let mut parts = Vec::with_capacity(4);
        if let Some((x, y)) = self.chromaticity {
            parts.push(format!("CIE x: {:.6}", x));
            parts.push(format!("CIE y: {:.6}", y));
        }
        parts.push(format!("Lux: {:.2}", self.lux));
        if let Some(cct) = self.color_temp_k {
            // Negative values would not match the unsigned number pattern on the host.
            parts.push(format!("Color Temperature: {:.0}", cct.max(0.0)));
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_equal_channels() {
        let m = Measurement::from_codes([1000, 1000, 1000, 0]);
        assert_relative_eq!(m.x_tristimulus, 0.368_501_676, epsilon = 1e-9);
        assert_relative_eq!(m.y_tristimulus, 0.163_019_008, epsilon = 1e-9);
        assert_relative_eq!(m.z_tristimulus, 0.670_217_877, epsilon = 1e-9);
        let (x, y) = m.chromaticity.unwrap();
        assert_relative_eq!(x, 0.306_640, epsilon = 1e-5);
        assert_relative_eq!(y, 0.135_651, epsilon = 1e-5);
        assert_relative_eq!(m.lux, 2.15, epsilon = 1e-12);
    }

    #[test]
    fn test_dark_sensor_has_no_chromaticity() {
        let m = Measurement::from_codes([0, 0, 0, 0]);
        assert_eq!(m.chromaticity, None);
        assert_eq!(m.color_temp_k, None);
        assert_eq!(m.telemetry_line(), "Lux: 0.00");
    }

    #[test]
    fn test_wide_band_channel_does_not_affect_color() {
        let a = Measurement::from_codes([5000, 6000, 4000, 0]);
        let b = Measurement::from_codes([5000, 6000, 4000, 900_000]);
        assert_eq!(a.chromaticity, b.chromaticity);
    }

    #[test]
    fn test_mccamy_d65() {
        let cct = mccamy_cct(0.3127, 0.3290).unwrap();
        assert!((6500.0..6515.0).contains(&cct), "cct = {}", cct);
    }

    #[test]
    fn test_mccamy_illuminant_a() {
        let cct = mccamy_cct(0.44757, 0.40745).unwrap();
        assert!((2840.0..2870.0).contains(&cct), "cct = {}", cct);
    }

    #[test]
    fn test_mccamy_singular() {
        assert_eq!(mccamy_cct(0.3, 0.1858), None);
    }

    #[test]
    fn test_telemetry_line_format() {
        let m = Measurement {
            x_tristimulus: 0.0,
            y_tristimulus: 0.0,
            z_tristimulus: 0.0,
            chromaticity: Some((0.3127, 0.329)),
            lux: 123.456,
            color_temp_k: Some(6504.2),
        };
        assert_eq!(
            m.telemetry_line(),
            "CIE x: 0.312700 CIE y: 0.329000 Lux: 123.46 Color Temperature: 6504"
        );
    }
}
