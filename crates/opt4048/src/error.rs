//! Error types for the OPT4048 crate.

use thiserror::Error;

/// Errors that can occur when decoding sensor data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Opt4048Error {
    /// The device ID register did not hold the expected value.
    #[error("Unexpected device ID 0x{found:04X} (expected 0x{expected:04X})")]
    InvalidDeviceId {
        /// Value read from the register.
        found: u16,
        /// Value an OPT4048 reports.
        expected: u16,
    },

    /// A channel's CRC bits did not match its contents.
    #[error("CRC mismatch on channel {channel}: computed 0x{computed:X}, received 0x{received:X}")]
    Crc {
        /// Channel index (0-3).
        channel: usize,
        /// CRC computed from the exponent, mantissa, and counter.
        computed: u8,
        /// CRC bits received from the sensor.
        received: u8,
    },

    /// Exponent beyond the range the ADC produces.
    #[error("Invalid exponent {exponent} on channel {channel} (max 8)")]
    InvalidExponent {
        /// Channel index (0-3).
        channel: usize,
        /// Exponent field.
        exponent: u8,
    },

    /// An ADC code too large to be represented.
    #[error("ADC code {0} out of range")]
    CodeOutOfRange(u32),
}
