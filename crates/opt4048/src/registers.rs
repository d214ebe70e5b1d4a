//! OPT4048 register map.

/// Default I2C address (ADDR pin connected to GND).
pub const DEFAULT_ADDR: u8 = 0x44;

/// Channel 0 (X) exponent and mantissa high bits.
pub const CH0_MSB: u8 = 0x00;
/// Channel 0 mantissa low bits, counter, and CRC.
pub const CH0_LSB: u8 = 0x01;
/// Channel 1 (Y) exponent and mantissa high bits.
pub const CH1_MSB: u8 = 0x02;
/// Channel 1 mantissa low bits, counter, and CRC.
pub const CH1_LSB: u8 = 0x03;
/// Channel 2 (Z) exponent and mantissa high bits.
pub const CH2_MSB: u8 = 0x04;
/// Channel 2 mantissa low bits, counter, and CRC.
pub const CH2_LSB: u8 = 0x05;
/// Channel 3 (wide band) exponent and mantissa high bits.
pub const CH3_MSB: u8 = 0x06;
/// Channel 3 mantissa low bits, counter, and CRC.
pub const CH3_LSB: u8 = 0x07;
/// Low interrupt threshold.
pub const THRESHOLD_LOW: u8 = 0x08;
/// High interrupt threshold.
pub const THRESHOLD_HIGH: u8 = 0x09;
/// Main configuration.
pub const CONFIG: u8 = 0x0A;
/// Threshold channel and interrupt configuration.
pub const THRESHOLD_CFG: u8 = 0x0B;
/// Status flags.
pub const STATUS: u8 = 0x0C;
/// Device identification.
pub const DEVICE_ID: u8 = 0x11;

/// Value of [`DEVICE_ID`] after reset.
pub const EXPECTED_DEVICE_ID: u16 = 0x0821;

/// Number of ADC channels.
pub const CHANNEL_COUNT: usize = 4;

/// Bytes in one burst read of all channel registers.
pub const CHANNEL_BURST_LEN: usize = CHANNEL_COUNT * 4;
