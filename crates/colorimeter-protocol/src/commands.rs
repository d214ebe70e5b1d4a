//! Commands that can be sent to the sensor board.
//!
//! The board accepts free-form text commands, one per line. The sketch decides what
//! each command means; the host only frames them.

use crate::codec::LineCodec;
use crate::error::{ProtocolError, ProtocolResult};
use std::fmt;

/// A single outbound command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    text: String,
}

impl Command {
    /// Create a command from its text.
    ///
    /// The text must not contain line breaks, since the board would read it as more
    /// than one command.
    pub fn new(text: impl Into<String>) -> ProtocolResult<Command> {
        let text = text.into();
        if text.contains(['\n', '\r']) {
            return Err(ProtocolError::InvalidCommand(format!(
                "line break in command {:?}",
                text
            )));
        }
        Ok(Command { text })
    }

    /// Encode the command to bytes, including the line terminator.
    pub fn encode(&self) -> Vec<u8> {
        LineCodec::encode_command(&self.text)
    }

    /// The command text without terminator.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl TryFrom<&str> for Command {
    type Error = ProtocolError;

    fn try_from(text: &str) -> ProtocolResult<Command> {
        Command::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_appends_newline() {
        let cmd = Command::new("RANGE AUTO").unwrap();
        assert_eq!(cmd.encode(), b"RANGE AUTO\n");
        assert_eq!(cmd.as_str(), "RANGE AUTO");
    }

    #[test]
    fn test_empty_command_allowed() {
        let cmd = Command::new("").unwrap();
        assert_eq!(cmd.encode(), b"\n");
    }

    #[test]
    fn test_line_break_rejected() {
        assert!(matches!(
            Command::new("a\nb"),
            Err(ProtocolError::InvalidCommand(_))
        ));
        assert!(Command::try_from("a\r").is_err());
    }

    #[test]
    fn test_display() {
        let cmd = Command::new("ping").unwrap();
        assert_eq!(cmd.to_string(), "ping");
    }
}
