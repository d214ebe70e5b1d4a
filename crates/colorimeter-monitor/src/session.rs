//! Connection lifecycle and the read loop.
//!
//! A [`Session`] owns one open link together with its read side, write side, and line
//! buffer. [`Session::run`] is the single consumer loop: it writes queued commands,
//! reads a chunk, and dispatches every complete line to the display. Whatever ends the
//! loop, [`Session::disconnect`] runs before `run` returns, and again (as a no-op) when
//! the session is dropped.

use crate::config::LinkConfig;
use crate::display::{DisplaySink, LogKind};
use crate::error::SessionError;
use crate::metric_defs;
use crate::transport::{is_idle, open_transport, Transport};
use colorimeter_color::{to_display_color, PlotBounds, PlotPoint};
use colorimeter_protocol::{decode, Command, LineCodec};
use crossbeam_channel::Receiver;
use serde::Serialize;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// Default size of the buffer handed to each read.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Shared flag asking a running session to stop.
///
/// Clones share the same flag, so one can be moved into a signal handler while the
/// session loop polls another.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// Create a signal that has not been raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder of this signal to stop.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-session settings.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Diagram bounds used to place markers.
    pub plot: PlotBounds,
    /// Commands written right after connecting.
    pub startup_commands: Vec<String>,
    /// Size of the buffer handed to each read.
    pub read_buffer_size: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            plot: PlotBounds::default(),
            startup_commands: Vec::new(),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

/// Counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Bytes read from the link.
    pub bytes_received: u64,
    /// Non-empty lines received.
    pub lines: u64,
    /// Lines carrying at least one recognized field.
    pub readings: u64,
    /// Markers placed on the diagram.
    pub points_plotted: u64,
    /// Chromaticity pairs with no displayable color.
    pub chromaticity_rejected: u64,
    /// Commands written to the link.
    pub commands_sent: u64,
}

/// Why [`Session::run`] returned.
#[derive(Debug)]
pub enum SessionEnd {
    /// The stop signal was raised, or the session was already disconnected.
    Stopped,
    /// The peer closed the link.
    PeerClosed,
    /// A read failed.
    ReadFailed(io::Error),
}

/// One connection to the board.
pub struct Session<D: DisplaySink> {
    link: Option<Box<dyn Transport>>,
    reader_held: bool,
    writer_held: bool,
    codec: LineCodec,
    display: D,
    options: SessionOptions,
    stats: SessionStats,
}

impl<D: DisplaySink> Session<D> {
    /// Open the link described by `config` and start a session on it.
    ///
    /// A failure to open is reported to the display before being returned.
    pub fn open(
        config: &LinkConfig,
        read_timeout: Duration,
        mut display: D,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        match open_transport(config, read_timeout) {
            Ok(link) => Ok(Session::connect(link, display, options)),
            Err(e) => {
                error!("Error connecting: {}", e);
                display.log(LogKind::Error, &format!("Error connecting: {}", e));
                display.log(LogKind::Status, "Connection failed");
                Err(SessionError::Connect(e))
            }
        }
    }

    /// Start a session on an already-open link.
    ///
    /// Startup commands that fail are logged and skipped.
    pub fn connect(link: Box<dyn Transport>, display: D, options: SessionOptions) -> Self {
        let name = link.name().to_string();
        let mut session = Session {
            link: Some(link),
            reader_held: true,
            writer_held: true,
            codec: LineCodec::new(),
            display,
            options,
            stats: SessionStats::default(),
        };

        info!("Connected to {}", name);
        metrics::gauge!(metric_defs::CONNECTED.name).set(1.0);
        session
            .display
            .log(LogKind::Status, &format!("Connected to {}", name));

        let startup = std::mem::take(&mut session.options.startup_commands);
        for command in &startup {
            // Failures are already reported by send_command.
            let _ = session.send_command(command);
        }
        session.options.startup_commands = startup;

        session
    }

    /// Whether the link is still open.
    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Counters so far.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// The display sink.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// The display sink, mutably.
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Write `text` followed by a newline to the board.
    pub fn send_command(&mut self, text: &str) -> Result<(), SessionError> {
        match self.write_command(text) {
            Ok(()) => {
                debug!("Sent command {:?}", text);
                self.stats.commands_sent += 1;
                metrics::counter!(metric_defs::COMMANDS_SENT.name).increment(1);
                self.display.log(LogKind::Command, &format!("Sent: {}", text));
                Ok(())
            }
            Err(SessionError::NotConnected) => {
                debug!("Dropping command {:?}: not connected", text);
                Err(SessionError::NotConnected)
            }
            Err(e) => {
                warn!("Error sending command: {}", e);
                if matches!(e, SessionError::Write(_)) {
                    metrics::counter!(metric_defs::LINK_ERRORS.name).increment(1);
                }
                self.display
                    .log(LogKind::Error, &format!("Error sending command: {}", e));
                Err(e)
            }
        }
    }

    fn write_command(&mut self, text: &str) -> Result<(), SessionError> {
        let command = Command::new(text)?;
        match self.link.as_mut() {
            Some(link) if self.writer_held => link
                .write_all(&command.encode())
                .map_err(SessionError::Write),
            _ => Err(SessionError::NotConnected),
        }
    }

    /// Feed bytes received from the link and dispatch every completed line.
    pub fn process_chunk(&mut self, data: &[u8]) {
        self.stats.bytes_received += data.len() as u64;
        metrics::counter!(metric_defs::BYTES_RECEIVED.name).increment(data.len() as u64);

        for line in self.codec.push(data) {
            self.dispatch_line(&line);
        }
    }

    fn dispatch_line(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        trace!("Received line {:?}", line);
        self.stats.lines += 1;
        metrics::counter!(metric_defs::LINES_RECEIVED.name).increment(1);
        self.display.log(LogKind::Data, line);

        let reading = decode(line);
        if reading.is_empty() {
            return;
        }
        self.stats.readings += 1;
        metrics::counter!(metric_defs::READINGS_DECODED.name).increment(1);
        self.display.show_reading(&reading);

        let Some((x, y)) = reading.chromaticity() else {
            return;
        };
        match to_display_color(x, y) {
            Some(color) => {
                let point = PlotPoint {
                    x,
                    y,
                    position: self.options.plot.position(x, y),
                    color,
                };
                self.stats.points_plotted += 1;
                metrics::counter!(metric_defs::POINTS_PLOTTED.name).increment(1);
                self.display.show_point(&point);
            }
            None => {
                warn!("No display color for chromaticity ({}, {})", x, y);
                self.stats.chromaticity_rejected += 1;
                metrics::counter!(metric_defs::CHROMATICITY_REJECTED.name).increment(1);
            }
        }
    }

    /// Read and dispatch until stopped, the peer closes, or a read fails.
    ///
    /// Commands arriving on `commands` are written between reads. The session is
    /// disconnected before this returns.
    pub fn run(&mut self, stop: &StopSignal, commands: &Receiver<String>) -> SessionEnd {
        let mut buf = vec![0u8; self.options.read_buffer_size.max(1)];

        let end = loop {
            if stop.is_stopped() {
                debug!("Stop requested");
                break SessionEnd::Stopped;
            }

            while let Ok(command) = commands.try_recv() {
                // Failures are already reported by send_command.
                let _ = self.send_command(&command);
            }

            let link = match self.link.as_mut() {
                Some(link) if self.reader_held => link,
                _ => break SessionEnd::Stopped,
            };
            match link.read_chunk(&mut buf) {
                Ok(0) => {
                    info!("Link closed by peer");
                    break SessionEnd::PeerClosed;
                }
                Ok(n) => self.process_chunk(&buf[..n]),
                Err(e) if is_idle(&e) => continue,
                Err(e) => {
                    error!("Error reading data: {}", e);
                    metrics::counter!(metric_defs::LINK_ERRORS.name).increment(1);
                    self.display
                        .log(LogKind::Error, &format!("Error reading data: {}", e));
                    break SessionEnd::ReadFailed(e);
                }
            }
        };

        self.disconnect();
        end
    }

    /// Release the link and reset the display.
    ///
    /// Each teardown step is attempted even if an earlier one fails. Calling this on a
    /// session that is already disconnected does nothing.
    pub fn disconnect(&mut self) {
        let Some(mut link) = self.link.take() else {
            return;
        };

        if self.reader_held {
            if let Err(e) = link.release_reader() {
                warn!("Error releasing reader: {}", e);
            }
            self.reader_held = false;
        }
        if self.writer_held {
            if let Err(e) = link.release_writer() {
                warn!("Error releasing writer: {}", e);
            }
            self.writer_held = false;
        }
        if let Err(e) = link.close() {
            warn!("Error closing link: {}", e);
        }

        self.codec.clear();
        self.display.clear();
        metrics::gauge!(metric_defs::CONNECTED.name).set(0.0);
        info!("Disconnected from {}", link.name());
        self.display
            .log(LogKind::Status, &format!("Disconnected from {}", link.name()));
    }
}

impl<D: DisplaySink> Drop for Session<D> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
