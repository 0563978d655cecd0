//! Error types for the protocol crate.
//!
//! [`ProtocolError`] covers framing and I/O failures; [`MessageParseError`]
//! describes why a single line could not be turned into a [`Message`].
//!
//! [`Message`]: crate::Message

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Line was not valid UTF-8.
    #[error("invalid utf-8 at byte {byte_pos}")]
    InvalidUtf8 {
        /// Offset of the first invalid byte.
        byte_pos: usize,
    },

    /// Line exceeded the configured length limit.
    #[error("message too long: {actual} bytes (limit {limit})")]
    MessageTooLong {
        /// Observed length in bytes.
        actual: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// Line contained a control character that is never legal on the wire.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),

    /// Line could not be parsed into a message.
    #[error("invalid message {string:?}: {cause}")]
    InvalidMessage {
        /// The offending line.
        string: String,
        /// Why it was rejected.
        #[source]
        cause: MessageParseError,
    },
}

impl ProtocolError {
    /// Whether the stream can keep going after this error.
    ///
    /// A malformed line is skipped; anything that breaks framing is not.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidMessage { .. } | Self::IllegalControlChar(_))
    }
}

/// Errors produced while parsing a single message.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Line was empty (or only whitespace).
    #[error("empty message")]
    EmptyMessage,

    /// A prefix was present but no command followed it.
    #[error("missing command")]
    MissingCommand,

    /// Command token contained characters outside `[A-Za-z0-9]`.
    #[error("invalid command {0:?}")]
    InvalidCommand(String),

    /// Subcommand not recognised for the given command.
    #[error("invalid {cmd} subcommand: {sub}")]
    InvalidSubcommand {
        /// Parent command.
        cmd: &'static str,
        /// The unrecognised token.
        sub: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_classification() {
        let bad_line = ProtocolError::InvalidMessage {
            string: ":".to_string(),
            cause: MessageParseError::MissingCommand,
        };
        assert!(bad_line.is_recoverable());

        let too_long = ProtocolError::MessageTooLong {
            actual: 600,
            limit: 512,
        };
        assert!(!too_long.is_recoverable());
    }
}
