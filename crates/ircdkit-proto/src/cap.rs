//! CAP subcommand types for capability negotiation.
//!
//! # Reference
//! - IRCv3 capability negotiation: <https://ircv3.net/specs/extensions/capability-negotiation>

use std::str::FromStr;

use crate::error::MessageParseError;

/// Subcommand for CAP (capability negotiation) messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CapSubCommand {
    /// LS - List available capabilities
    LS,
    /// LIST - List currently enabled capabilities
    LIST,
    /// REQ - Request capabilities
    REQ,
    /// ACK - Server acknowledged capabilities
    ACK,
    /// NAK - Server rejected capabilities
    NAK,
    /// END - End capability negotiation
    END,
    /// NEW - Server advertising new capabilities (cap-notify)
    NEW,
    /// DEL - Server removing capabilities (cap-notify)
    DEL,
}

impl CapSubCommand {
    /// Get the string representation of this subcommand.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LS => "LS",
            Self::LIST => "LIST",
            Self::REQ => "REQ",
            Self::ACK => "ACK",
            Self::NAK => "NAK",
            Self::END => "END",
            Self::NEW => "NEW",
            Self::DEL => "DEL",
        }
    }

    /// Whether a client may send this subcommand.
    ///
    /// ACK, NAK, NEW and DEL only ever flow from server to client.
    #[inline]
    pub fn is_client_initiated(&self) -> bool {
        matches!(self, Self::LS | Self::LIST | Self::REQ | Self::END)
    }
}

impl FromStr for CapSubCommand {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LS" => Ok(Self::LS),
            "LIST" => Ok(Self::LIST),
            "REQ" => Ok(Self::REQ),
            "ACK" => Ok(Self::ACK),
            "NAK" => Ok(Self::NAK),
            "END" => Ok(Self::END),
            "NEW" => Ok(Self::NEW),
            "DEL" => Ok(Self::DEL),
            _ => Err(MessageParseError::InvalidSubcommand {
                cmd: "CAP",
                sub: s.to_owned(),
            }),
        }
    }
}

impl std::fmt::Display for CapSubCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
