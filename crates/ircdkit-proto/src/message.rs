//! Owned IRC message type with parsing and serialization.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::command::Command;
use crate::error::{MessageParseError, ProtocolError};
use crate::prefix::Prefix;

/// An owned IRC message.
///
/// IRCv3 tags on inbound lines are accepted and discarded; the connection
/// core never acts on them.
///
/// # Example
///
/// ```
/// use ircdkit_proto::Message;
///
/// let msg: Message = ":nick!user@host PING :token".parse().unwrap();
/// assert_eq!(msg.command_name(), "PING");
/// assert_eq!(msg.arg(0), Some("token"));
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Message {
    /// Message prefix/source (e.g., `nick!user@host`).
    pub prefix: Option<Prefix>,
    /// The IRC command and its parameters.
    pub command: Command,
}

impl Message {
    /// Create a new message from raw components.
    pub fn new(
        prefix: Option<&str>,
        command: &str,
        args: Vec<&str>,
    ) -> Result<Message, MessageParseError> {
        Ok(Message {
            prefix: prefix.map(Prefix::new_from_str),
            command: Command::new(command, args)?,
        })
    }

    /// Create a PING message.
    #[must_use]
    pub fn ping<S: Into<String>>(server: S) -> Self {
        Command::PING(server.into(), None).into()
    }

    /// Create a PONG message in response to a PING.
    #[must_use]
    pub fn pong<S: Into<String>>(server: S) -> Self {
        Command::PONG(server.into(), None).into()
    }

    /// Create an ERROR message.
    #[must_use]
    pub fn error<S: Into<String>>(text: S) -> Self {
        Command::ERROR(text.into()).into()
    }

    /// Attach a prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Uppercased command token (empty for numerics).
    pub fn command_name(&self) -> &str {
        self.command.name()
    }

    /// Parameter at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.command.args().get(index).copied()
    }

    /// All parameters in wire order.
    pub fn args(&self) -> Vec<&str> {
        self.command.args()
    }
}

impl From<Command> for Message {
    fn from(cmd: Command) -> Message {
        Message {
            prefix: None,
            command: cmd,
        }
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let invalid = |cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        };

        let mut rest = s.trim_end_matches(&['\r', '\n'][..]).trim_start_matches(' ');
        if rest.is_empty() {
            return Err(invalid(MessageParseError::EmptyMessage));
        }

        if rest.starts_with('@') {
            rest = rest.split_once(' ').map_or("", |(_, r)| r);
            rest = rest.trim_start_matches(' ');
        }

        let mut prefix = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (p, r) = stripped.split_once(' ').unwrap_or((stripped, ""));
            prefix = Some(p);
            rest = r.trim_start_matches(' ');
        }

        let (command, mut rest) = rest.split_once(' ').unwrap_or((rest, ""));
        let mut args = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                args.push(trailing);
                break;
            }
            let (arg, r) = rest.split_once(' ').unwrap_or((rest, ""));
            args.push(arg);
            rest = r;
        }

        Message::new(prefix, command, args).map_err(invalid)
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }

        write!(f, "{}\r\n", self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cap::CapSubCommand;
    use crate::response::Response;

    #[test]
    fn test_parse_simple_ping() {
        let msg: Message = "PING :server\r\n".parse().unwrap();
        assert_eq!(msg.command, Command::PING("server".into(), None));
    }

    #[test]
    fn test_parse_cap_request_keeps_trailing_verbatim() {
        let msg: Message = "CAP REQ :a  c\r\n".parse().unwrap();
        assert_eq!(
            msg.command,
            Command::CAP(None, CapSubCommand::REQ, None, Some("a  c".into()))
        );
    }

    #[test]
    fn test_parse_with_tags_and_prefix() {
        let msg: Message = "@time=2023-01-01T00:00:00Z :nick!u@h PONG irc.example.net\r\n"
            .parse()
            .unwrap();
        assert_eq!(
            msg.prefix,
            Some(Prefix::Nickname("nick".into(), "u".into(), "h".into()))
        );
        assert_eq!(msg.command_name(), "PONG");
    }

    #[test]
    fn test_parse_numeric_response() {
        let msg: Message = ":server 001 nick :Welcome to IRC\r\n".parse().unwrap();
        assert!(matches!(msg.command, Command::Response(Response::RPL_WELCOME, _)));
    }

    #[test]
    fn test_parse_empty_message() {
        assert!("".parse::<Message>().is_err());
        assert!("\r\n".parse::<Message>().is_err());
        assert!(":prefix-only".parse::<Message>().is_err());
    }

    #[test]
    fn test_serialize_with_prefix() {
        let msg = Message::pong("irc.example.net")
            .with_prefix(Prefix::ServerName("irc.example.net".into()));
        assert_eq!(msg.to_string(), ":irc.example.net PONG irc.example.net\r\n");
    }

    #[test]
    fn test_user_realname_with_spaces() {
        let msg: Message = "USER guest 0 * :Real Name".parse().unwrap();
        assert_eq!(
            msg.command,
            Command::USER("guest".into(), "0".into(), "Real Name".into())
        );
        assert_eq!(msg.to_string(), "USER guest 0 * :Real Name\r\n");
    }
}
