//! # opt4048
//!
//! Host-side model of the TI OPT4048 tristimulus color sensor.
//!
//! The sensor exposes four ADC channels over I2C. Each channel is reported as a pair
//! of 16-bit registers holding a 4-bit exponent, a 20-bit mantissa, a 4-bit sample
//! counter, and a 4-bit CRC. This crate decodes and verifies those register bursts,
//! converts channel codes to CIE XYZ, chromaticity, illuminance, and correlated color
//! temperature, and formats the telemetry line the board firmware prints.
//!
//! The bus itself is not modeled: callers supply the 16 bytes read from
//! [`registers::CH0_MSB`] onward.
//!
//! ## Example
//!
//! ```
//! use opt4048::{decode_channels, ChannelSample, Measurement};
//!
//! let mut burst = [0u8; 16];
//! for (i, code) in [1200u32, 1500, 900, 400].into_iter().enumerate() {
//!     let sample = ChannelSample::from_code(code, i as u8)?;
//!     burst[i * 4..i * 4 + 4].copy_from_slice(&sample.encode());
//! }
//!
//! let samples = decode_channels(&burst)?;
//! let measurement = Measurement::from_samples(&samples);
//! println!("{}", measurement.telemetry_line());
//! # Ok::<(), opt4048::Opt4048Error>(())
//! ```

mod channel;
mod error;
mod measurement;
pub mod registers;

pub use channel::{compute_crc, decode_channels, verify_device_id, ChannelSample, MAX_EXPONENT, MAX_MANTISSA};
pub use error::Opt4048Error;
pub use measurement::{mccamy_cct, Measurement, XYZ_MATRIX, LUX_PER_CODE};

/// Result type for OPT4048 operations.
pub type Result<T> = std::result::Result<T, Opt4048Error>;
