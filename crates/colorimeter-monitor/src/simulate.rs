//! A simulated sensor board.
//!
//! The simulator plays the firmware's part: each interval it encodes the next scene's
//! channel codes into OPT4048 register bytes, decodes and CRC-checks them the way the
//! sketch does, and prints the resulting telemetry line. Output is handed out in small
//! chunks so the host sees the same fragmented reads a UART produces.

use crate::error::TransportError;
use crate::transport::Transport;
use opt4048::registers::CHANNEL_BURST_LEN;
use opt4048::{decode_channels, ChannelSample, Measurement};
use std::collections::VecDeque;
use std::io;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default interval between simulated measurements.
pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// Largest chunk handed out by one read.
const MAX_CHUNK: usize = 24;

/// Line printed once when the simulated board starts.
pub const BANNER: &str = "Adafruit OPT4048 simulator ready";

/// Channel codes cycled through when no scenes are configured: neutral daylight,
/// warm incandescent, cool shade.
pub const DEFAULT_SCENES: [[u32; 4]; 3] = [
    [24_350, 54_030, 17_010, 60_000],
    [35_040, 54_110, 5_930, 70_000],
    [23_270, 54_350, 21_900, 65_000],
];

/// A [`Transport`] backed by a simulated OPT4048 board.
#[derive(Debug)]
pub struct SimulatedTransport {
    scenes: Vec<[u32; 4]>,
    interval: Duration,
    read_timeout: Duration,
    next_due: Instant,
    scene_index: usize,
    counter: u8,
    outbound: VecDeque<u8>,
    received: Vec<u8>,
    closed: bool,
}

impl SimulatedTransport {
    /// Create a simulator cycling through `scenes` (or [`DEFAULT_SCENES`] if empty).
    ///
    /// Fails if a scene holds a code the sensor cannot report.
    pub fn new(
        scenes: Vec<[u32; 4]>,
        interval: Duration,
        read_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let scenes = if scenes.is_empty() {
            DEFAULT_SCENES.to_vec()
        } else {
            scenes
        };
        for scene in &scenes {
            for code in scene {
                ChannelSample::from_code(*code, 0)?;
            }
        }

        let mut outbound = VecDeque::new();
        outbound.extend(format!("{}\r\n", BANNER).bytes());

        Ok(SimulatedTransport {
            scenes,
            interval,
            read_timeout,
            next_due: Instant::now(),
            scene_index: 0,
            counter: 0,
            outbound,
            received: Vec::new(),
            closed: false,
        })
    }

    /// Bytes written to the simulated board so far.
    pub fn received(&self) -> &[u8] {
        &self.received
    }

    /// Produce the next telemetry line as the firmware would.
    fn measure(&mut self) -> io::Result<String> {
        let scene = self.scenes[self.scene_index % self.scenes.len()];
        self.scene_index += 1;

        let mut burst = [0u8; CHANNEL_BURST_LEN];
        for (i, code) in scene.iter().enumerate() {
            let sample = ChannelSample::from_code(*code, self.counter)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            burst[i * 4..i * 4 + 4].copy_from_slice(&sample.encode());
        }
        self.counter = (self.counter + 1) & 0x0F;

        let samples =
            decode_channels(&burst).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Measurement::from_samples(&samples).telemetry_line())
    }
}

impl Transport for SimulatedTransport {
    fn name(&self) -> &str {
        "simulated OPT4048"
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Ok(0);
        }

        if self.outbound.is_empty() {
            let now = Instant::now();
            if now < self.next_due {
                let wait = (self.next_due - now).min(self.read_timeout);
                thread::sleep(wait);
                if Instant::now() < self.next_due {
                    return Err(io::ErrorKind::TimedOut.into());
                }
            }
            let line = self.measure()?;
            self.outbound.extend(line.bytes());
            self.outbound.extend(b"\r\n");
            self.next_due = Instant::now() + self.interval;
        }

        let n = buf.len().min(MAX_CHUNK).min(self.outbound.len());
        for (slot, byte) in buf.iter_mut().zip(self.outbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        if self.closed {
            return Err(io::ErrorKind::NotConnected.into());
        }
        debug!("Simulator received {} bytes", data.len());
        self.received.extend_from_slice(data);
        Ok(())
    }

    fn release_reader(&mut self) -> io::Result<()> {
        self.outbound.clear();
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}
