//! Links to the sensor board.
//!
//! A [`Transport`] is a byte stream with separately releasable read and write sides.
//! Reads block for at most the configured read timeout so the session loop can
//! notice a stop request; a timed-out read is reported as an idle error kind, not as
//! a failure (see [`is_idle`]).

use crate::config::LinkConfig;
use crate::error::TransportError;
use crate::simulate::SimulatedTransport;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;
use tracing::debug;

/// Baud rate the board's sketch uses.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// A byte-stream link to the board.
pub trait Transport: Send {
    /// Human-readable description of the link (device path or address).
    fn name(&self) -> &str;

    /// Read the next chunk of bytes.
    ///
    /// `Ok(0)` means the peer closed the link. Errors for which [`is_idle`] is true
    /// mean no data arrived within the read timeout.
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write all bytes to the link.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Give up read access, discarding anything not yet read.
    fn release_reader(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Give up write access, flushing anything not yet sent.
    fn release_writer(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Close the underlying link.
    fn close(&mut self) -> io::Result<()>;
}

/// Whether a read error only means "no data yet".
pub fn is_idle(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

/// Open the link described by `config`.
pub fn open_transport(
    config: &LinkConfig,
    read_timeout: Duration,
) -> Result<Box<dyn Transport>, TransportError> {
    let link: Box<dyn Transport> = match config {
        LinkConfig::Serial { path, baud_rate } => {
            Box::new(SerialTransport::open(path, *baud_rate, read_timeout)?)
        }
        LinkConfig::Tcp { address } => Box::new(TcpTransport::connect(address, read_timeout)?),
        LinkConfig::Simulate {
            interval_ms,
            scenes,
        } => Box::new(SimulatedTransport::new(
            scenes.clone(),
            Duration::from_millis(*interval_ms),
            read_timeout,
        )?),
    };
    debug!("Opened link {}", link.name());
    Ok(link)
}

/// Names of the serial ports present on this machine.
pub fn list_ports() -> Result<Vec<String>, TransportError> {
    let ports = serialport::available_ports().map_err(TransportError::Enumerate)?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

// ============================================================================
// Serial
// ============================================================================

/// A link over a local serial device.
pub struct SerialTransport {
    name: String,
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    /// Open and configure a serial device.
    pub fn open(path: &str, baud_rate: u32, read_timeout: Duration) -> Result<Self, TransportError> {
        let port = serialport::new(path, baud_rate)
            .timeout(read_timeout)
            .open()
            .map_err(|source| TransportError::Serial {
                path: path.to_string(),
                source,
            })?;
        Ok(SerialTransport {
            name: format!("{}@{}", path, baud_rate),
            port,
        })
    }
}

impl Transport for SerialTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)?;
        self.port.flush()
    }

    fn release_reader(&mut self) -> io::Result<()> {
        self.port
            .clear(serialport::ClearBuffer::Input)
            .map_err(io::Error::from)
    }

    fn release_writer(&mut self) -> io::Result<()> {
        self.port.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        // The device is closed when the port handle is dropped with the transport.
        Ok(())
    }
}

// ============================================================================
// TCP
// ============================================================================

/// A link over TCP to a serial bridge or a simulator's UART port.
pub struct TcpTransport {
    name: String,
    stream: TcpStream,
}

impl TcpTransport {
    /// Connect to `address` (`host:port`).
    pub fn connect(address: &str, read_timeout: Duration) -> Result<Self, TransportError> {
        let tcp_err = |source| TransportError::Tcp {
            address: address.to_string(),
            source,
        };
        let stream = TcpStream::connect(address).map_err(tcp_err)?;
        stream.set_read_timeout(Some(read_timeout)).map_err(tcp_err)?;
        stream.set_nodelay(true).map_err(tcp_err)?;
        Ok(TcpTransport {
            name: address.to_string(),
            stream,
        })
    }
}

fn ignore_not_connected(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
        other => other,
    }
}

impl Transport for TcpTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.stream.write_all(data)?;
        self.stream.flush()
    }

    fn release_reader(&mut self) -> io::Result<()> {
        ignore_not_connected(self.stream.shutdown(Shutdown::Read))
    }

    fn release_writer(&mut self) -> io::Result<()> {
        self.stream.flush()?;
        ignore_not_connected(self.stream.shutdown(Shutdown::Write))
    }

    fn close(&mut self) -> io::Result<()> {
        ignore_not_connected(self.stream.shutdown(Shutdown::Both))
    }
}
