//! Line-based codec for telemetry communication.
//!
//! Telemetry lines are terminated with `\n`; a preceding `\r` is removed along with
//! any other surrounding whitespace. Bytes are decoded incrementally so that a
//! multi-byte UTF-8 sequence split across two reads is reassembled rather than
//! replaced.

use bytes::{Buf, BytesMut};

/// Terminator appended to outbound commands and expected on inbound lines.
pub const LINE_TERMINATOR: char = '\n';

/// Incremental UTF-8 decoder for a byte stream.
///
/// Incomplete trailing sequences are held back until the next call. Invalid
/// sequences are replaced with U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    /// Bytes of an incomplete trailing sequence.
    pending: BytesMut,
}

impl Utf8StreamDecoder {
    /// Create a new decoder.
    pub fn new() -> Self {
        Utf8StreamDecoder {
            pending: BytesMut::with_capacity(4),
        }
    }

    /// Decode a chunk of bytes, returning all text that is complete so far.
    pub fn decode(&mut self, data: &[u8]) -> String {
        self.pending.extend_from_slice(data);
        let mut out = String::with_capacity(self.pending.len());

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        Some(invalid) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.advance(valid + invalid);
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes
                            self.pending.advance(valid);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush any held-back bytes as replacement characters.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        self.pending.clear();
        char::REPLACEMENT_CHARACTER.to_string()
    }

    /// Number of bytes held back awaiting completion.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop any held-back bytes.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Assembles text chunks into complete, trimmed lines.
///
/// The buffer never contains a newline between calls. It is not bounded: a peer
/// that never sends a newline grows it indefinitely.
#[derive(Debug, Default, Clone)]
pub struct LineAssembler {
    buffer: String,
}

impl LineAssembler {
    /// Create an empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completes.
    ///
    /// Lines are trimmed of surrounding whitespace. Empty lines are returned as
    /// empty strings; callers decide whether to skip them.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);

        let Some(last) = self.buffer.rfind(LINE_TERMINATOR) else {
            return Vec::new();
        };

        let rest = self.buffer.split_off(last + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        complete[..last]
            .split(LINE_TERMINATOR)
            .map(|line| line.trim().to_string())
            .collect()
    }

    /// The partial line currently buffered.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Drop the partial line.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// A codec for reading telemetry lines from raw transport bytes.
#[derive(Debug, Default)]
pub struct LineCodec {
    decoder: Utf8StreamDecoder,
    lines: LineAssembler,
}

impl LineCodec {
    /// Create a new line codec.
    pub fn new() -> Self {
        LineCodec {
            decoder: Utf8StreamDecoder::new(),
            lines: LineAssembler::new(),
        }
    }

    /// Add received data and return every line it completes.
    pub fn push(&mut self, data: &[u8]) -> Vec<String> {
        let text = self.decoder.decode(data);
        if text.is_empty() {
            return Vec::new();
        }
        self.lines.feed(&text)
    }

    /// Encode a command for transmission, appending the line terminator.
    pub fn encode_command(cmd: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(cmd.len() + 1);
        buf.extend_from_slice(cmd.as_bytes());
        buf.push(LINE_TERMINATOR as u8);
        buf
    }

    /// Get the number of buffered bytes (partial line plus incomplete UTF-8).
    pub fn buffered_len(&self) -> usize {
        self.lines.pending().len() + self.decoder.pending_len()
    }

    /// Get the partial line currently buffered.
    pub fn pending_line(&self) -> &str {
        self.lines.pending()
    }

    /// Clear all buffered state.
    pub fn clear(&mut self) {
        self.decoder.clear();
        self.lines.clear();
    }
}
