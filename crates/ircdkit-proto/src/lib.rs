//! # ircdkit-proto
//!
//! Parsing and serialization of the line-oriented messages spoken by the
//! ircdkit connection core.
//!
//! ## Parsing
//!
//! ```rust
//! use ircdkit_proto::Message;
//!
//! let msg: Message = "CAP REQ :multi-prefix sasl".parse().unwrap();
//! assert_eq!(msg.command_name(), "CAP");
//! assert_eq!(msg.arg(1), Some("multi-prefix sasl"));
//! ```
//!
//! ## Construction
//!
//! ```rust
//! use ircdkit_proto::{CapSubCommand, Command, Message, Prefix};
//!
//! let reply = Message::from(Command::CAP(
//!     Some("*".to_string()),
//!     CapSubCommand::ACK,
//!     None,
//!     Some("multi-prefix".to_string()),
//! ))
//! .with_prefix(Prefix::ServerName("irc.example.net".to_string()));
//!
//! assert_eq!(reply.to_string(), ":irc.example.net CAP * ACK :multi-prefix\r\n");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod cap;
pub mod command;
pub mod error;
#[cfg(feature = "tokio")]
pub mod irc;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod prefix;
pub mod response;

pub use self::cap::CapSubCommand;
pub use self::command::Command;
pub use self::error::{MessageParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use self::irc::IrcCodec;
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::message::Message;
pub use self::prefix::Prefix;
pub use self::response::Response;

/// Lowercase a string using RFC 1459 casemapping.
///
/// `[]\~` are the lowercase forms of `{}|^`.
pub fn irc_to_lower(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '[' => '{',
            ']' => '}',
            '\\' => '|',
            '~' => '^',
            _ => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Compare two names for equality under RFC 1459 casemapping.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && irc_to_lower(a) == irc_to_lower(b)
}
