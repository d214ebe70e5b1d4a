//! Channel register decoding and CRC verification.
//!
//! Each channel occupies two 16-bit big-endian registers:
//!
//! ```text
//! MSB: | E[3:0] | R[19:8]                    |
//! LSB: | R[7:0]          | C[3:0] | CRC[3:0] |
//! ```
//!
//! where `E` is the exponent, `R` the mantissa, and `C` a rolling sample counter. The
//! ADC code is `R << E`.

use crate::error::Opt4048Error;
use crate::registers::{CHANNEL_BURST_LEN, CHANNEL_COUNT, EXPECTED_DEVICE_ID};

/// Largest exponent the ADC reports.
pub const MAX_EXPONENT: u8 = 8;

/// Largest 20-bit mantissa.
pub const MAX_MANTISSA: u32 = (1 << 20) - 1;

/// Check the value read from the device ID register.
pub fn verify_device_id(id: u16) -> Result<(), Opt4048Error> {
    if id == EXPECTED_DEVICE_ID {
        Ok(())
    } else {
        Err(Opt4048Error::InvalidDeviceId {
            found: id,
            expected: EXPECTED_DEVICE_ID,
        })
    }
}

fn bit(value: u32, n: u32) -> u8 {
    ((value >> n) & 1) as u8
}

fn parity(value: u32, bits: u32) -> u8 {
    (0..bits).fold(0, |acc, n| acc ^ bit(value, n))
}

/// Compute the 4 CRC bits the sensor attaches to a channel sample.
///
/// The sample counter `C[3:0]` enters the parity equations as the datasheet
/// specifies; the Adafruit driver feeds the received CRC nibble there instead.
pub fn compute_crc(exponent: u8, mantissa: u32, counter: u8) -> u8 {
    let e = exponent as u32;
    let c = counter as u32;
    let r = mantissa;

    let x0 = parity(e, 4) ^ parity(r, 20) ^ parity(c, 4);

    let mut x1 = bit(c, 1) ^ bit(c, 3) ^ bit(e, 1) ^ bit(e, 3);
    for n in (1..20).step_by(2) {
        x1 ^= bit(r, n);
    }

    let mut x2 = bit(c, 3) ^ bit(e, 3);
    for n in (3..20).step_by(4) {
        x2 ^= bit(r, n);
    }

    let x3 = bit(r, 3) ^ bit(r, 11) ^ bit(r, 19);

    x0 | (x1 << 1) | (x2 << 2) | (x3 << 3)
}

/// One decoded channel sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSample {
    /// Exponent (0-8).
    pub exponent: u8,
    /// 20-bit mantissa.
    pub mantissa: u32,
    /// Rolling 4-bit sample counter.
    pub counter: u8,
}

impl ChannelSample {
    /// Build a sample for an ADC code, choosing the smallest exponent that fits.
    ///
    /// Low-order bits are dropped when the code needs a non-zero exponent, as the
    /// sensor itself does.
    pub fn from_code(code: u32, counter: u8) -> Result<ChannelSample, Opt4048Error> {
        let mut exponent = 0u8;
        while (code >> exponent) > MAX_MANTISSA {
            exponent += 1;
        }
        if exponent > MAX_EXPONENT {
            return Err(Opt4048Error::CodeOutOfRange(code));
        }
        Ok(ChannelSample {
            exponent,
            mantissa: code >> exponent,
            counter: counter & 0x0F,
        })
    }

    /// The linear ADC code.
    pub fn code(&self) -> u32 {
        self.mantissa << self.exponent
    }

    /// The CRC bits this sample carries.
    pub fn crc(&self) -> u8 {
        compute_crc(self.exponent, self.mantissa, self.counter)
    }

    /// Decode and verify one channel's four register bytes.
    pub fn decode(channel: usize, bytes: [u8; 4]) -> Result<ChannelSample, Opt4048Error> {
        let msb = u16::from_be_bytes([bytes[0], bytes[1]]);
        let lsb = u16::from_be_bytes([bytes[2], bytes[3]]);

        let exponent = ((msb >> 12) & 0x0F) as u8;
        let mantissa = (((msb & 0x0FFF) as u32) << 8) | ((lsb >> 8) & 0xFF) as u32;
        let counter = ((lsb >> 4) & 0x0F) as u8;
        let received = (lsb & 0x0F) as u8;

        let computed = compute_crc(exponent, mantissa, counter);
        if computed != received {
            return Err(Opt4048Error::Crc {
                channel,
                computed,
                received,
            });
        }
        if exponent > MAX_EXPONENT {
            return Err(Opt4048Error::InvalidExponent { channel, exponent });
        }

        Ok(ChannelSample {
            exponent,
            mantissa,
            counter,
        })
    }

    /// Encode this sample as the four register bytes the sensor would return.
    pub fn encode(&self) -> [u8; 4] {
        let msb = ((self.exponent as u16 & 0x0F) << 12) | ((self.mantissa >> 8) & 0x0FFF) as u16;
        let lsb = (((self.mantissa & 0xFF) as u16) << 8)
            | ((self.counter as u16 & 0x0F) << 4)
            | self.crc() as u16;
        let [m0, m1] = msb.to_be_bytes();
        let [l0, l1] = lsb.to_be_bytes();
        [m0, m1, l0, l1]
    }
}

/// Decode and verify a burst read of all four channels.
pub fn decode_channels(
    burst: &[u8; CHANNEL_BURST_LEN],
) -> Result<[ChannelSample; CHANNEL_COUNT], Opt4048Error> {
    let mut samples = [ChannelSample {
        exponent: 0,
        mantissa: 0,
        counter: 0,
    }; CHANNEL_COUNT];

    for (channel, (sample, bytes)) in samples.iter_mut().zip(burst.chunks_exact(4)).enumerate() {
        *sample = ChannelSample::decode(channel, [bytes[0], bytes[1], bytes[2], bytes[3]])?;
    }

    Ok(samples)
}
