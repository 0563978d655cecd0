//! IRC command representation.
//!
//! Commands the connection core reacts to or emits get typed variants;
//! everything else round-trips through [`Command::Raw`].

use std::fmt::{self, Write};

use crate::cap::CapSubCommand;
use crate::error::MessageParseError;
use crate::response::Response;

/// An IRC command together with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Command {
    /// `PASS <password>`
    PASS(String),
    /// `NICK <nickname>`
    NICK(String),
    /// `USER <user> <mode> * :<realname>`
    USER(String, String, String),
    /// `PING <server> [<token>]`
    PING(String, Option<String>),
    /// `PONG <server> [<token>]`
    PONG(String, Option<String>),
    /// `QUIT [:<reason>]`
    QUIT(Option<String>),
    /// `ERROR :<message>`
    ERROR(String),
    /// `CAP [<target>] <subcommand> [<more>] [:<param>]`
    ///
    /// Client form leaves `target` empty: `CAP REQ :multi-prefix`.
    /// Server form names the target: `CAP * LS * :sasl multi-prefix`.
    CAP(Option<String>, CapSubCommand, Option<String>, Option<String>),
    /// Numeric reply.
    Response(Response, Vec<String>),
    /// Anything without a typed variant (including malformed typed commands).
    Raw(String, Vec<String>),
}

fn raw(cmd: &str, args: Vec<&str>) -> Command {
    Command::Raw(
        cmd.to_ascii_uppercase(),
        args.into_iter().map(str::to_owned).collect(),
    )
}

impl Command {
    /// Build a command from its name and parameters.
    ///
    /// Typed variants are only produced when the arity matches; otherwise the
    /// command is kept as [`Command::Raw`] so handlers can report the problem.
    pub fn new(cmd: &str, args: Vec<&str>) -> Result<Command, MessageParseError> {
        if cmd.is_empty() {
            return Err(MessageParseError::MissingCommand);
        }
        if !cmd.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(MessageParseError::InvalidCommand(cmd.to_owned()));
        }

        let upper = cmd.to_ascii_uppercase();
        let parsed = match (upper.as_str(), args.len()) {
            ("PASS", 1) => Command::PASS(args[0].to_owned()),
            ("NICK", 1) => Command::NICK(args[0].to_owned()),
            ("USER", 4) => Command::USER(
                args[0].to_owned(),
                args[1].to_owned(),
                args[3].to_owned(),
            ),
            ("PING", 1) => Command::PING(args[0].to_owned(), None),
            ("PING", 2) => Command::PING(args[0].to_owned(), Some(args[1].to_owned())),
            ("PONG", 1) => Command::PONG(args[0].to_owned(), None),
            ("PONG", 2) => Command::PONG(args[0].to_owned(), Some(args[1].to_owned())),
            ("QUIT", 0) => Command::QUIT(None),
            ("QUIT", 1) => Command::QUIT(Some(args[0].to_owned())),
            ("ERROR", 1) => Command::ERROR(args[0].to_owned()),
            ("CAP", _) => parse_cap(cmd, args),
            _ => match cmd.parse::<Response>() {
                Ok(resp) => Command::Response(resp, args.into_iter().map(str::to_owned).collect()),
                Err(()) => raw(cmd, args),
            },
        };
        Ok(parsed)
    }

    /// The command token as it appears on the wire.
    ///
    /// Numerics have no textual name; use [`Response::code`] for those.
    pub fn name(&self) -> &str {
        match self {
            Command::PASS(_) => "PASS",
            Command::NICK(_) => "NICK",
            Command::USER(..) => "USER",
            Command::PING(..) => "PING",
            Command::PONG(..) => "PONG",
            Command::QUIT(_) => "QUIT",
            Command::ERROR(_) => "ERROR",
            Command::CAP(..) => "CAP",
            Command::Response(..) => "",
            Command::Raw(name, _) => name,
        }
    }

    /// Parameters in wire order.
    pub fn args(&self) -> Vec<&str> {
        match self {
            Command::PASS(p) | Command::NICK(p) | Command::ERROR(p) => vec![p.as_str()],
            Command::USER(u, m, r) => vec![u.as_str(), m.as_str(), "*", r.as_str()],
            Command::PING(s, t) | Command::PONG(s, t) => {
                let mut out = vec![s.as_str()];
                out.extend(t.as_deref());
                out
            }
            Command::QUIT(m) => m.as_deref().into_iter().collect(),
            Command::CAP(target, sub, more, param) => {
                let mut out = Vec::with_capacity(4);
                out.extend(target.as_deref());
                out.push(sub.as_str());
                out.extend(more.as_deref());
                out.extend(param.as_deref());
                out
            }
            Command::Response(_, a) | Command::Raw(_, a) => a.iter().map(String::as_str).collect(),
        }
    }
}

/// CAP comes in two shapes: `CAP <sub> [<arg>]` from clients and
/// `CAP <target> <sub> [<more>] [<param>]` from servers.
fn parse_cap(cmd: &str, args: Vec<&str>) -> Command {
    let first = args.first().and_then(|a| a.parse::<CapSubCommand>().ok());
    let second = args.get(1).and_then(|a| a.parse::<CapSubCommand>().ok());

    match (args.len(), first, second) {
        (1, Some(sub), _) => Command::CAP(None, sub, None, None),
        (2, Some(sub), _) => Command::CAP(None, sub, None, Some(args[1].to_owned())),
        (2, None, Some(sub)) => Command::CAP(Some(args[0].to_owned()), sub, None, None),
        (3, _, Some(sub)) => {
            Command::CAP(Some(args[0].to_owned()), sub, None, Some(args[2].to_owned()))
        }
        (4, _, Some(sub)) => Command::CAP(
            Some(args[0].to_owned()),
            sub,
            Some(args[2].to_owned()),
            Some(args[3].to_owned()),
        ),
        _ => raw(cmd, args),
    }
}

/// Check if a string needs colon-prefixing as a trailing IRC argument.
pub fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.starts_with(':')
}

/// Write a command, colon-prefixing the last argument only when required.
fn write_cmd(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    f.write_str(cmd)?;
    let Some((trailing, middle)) = args.split_last() else {
        return Ok(());
    };
    for param in middle {
        f.write_char(' ')?;
        f.write_str(param)?;
    }
    f.write_char(' ')?;
    if needs_colon_prefix(trailing) {
        f.write_char(':')?;
    }
    f.write_str(trailing)
}

/// Write a command with a freeform (always colon-prefixed) trailing argument.
fn write_cmd_freeform(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    f.write_str(cmd)?;
    let Some((trailing, middle)) = args.split_last() else {
        return Ok(());
    };
    for param in middle {
        f.write_char(' ')?;
        f.write_str(param)?;
    }
    f.write_str(" :")?;
    f.write_str(trailing)
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::USER(..) | Command::ERROR(_) | Command::CAP(_, _, _, Some(_)) => {
                write_cmd_freeform(f, self.name(), &self.args())
            }
            Command::QUIT(Some(_)) => write_cmd_freeform(f, "QUIT", &self.args()),
            Command::Response(resp, a) => {
                write!(f, "{:03}", resp.code())?;
                let args: Vec<&str> = a.iter().map(String::as_str).collect();
                write_cmd(f, "", &args)
            }
            _ => write_cmd(f, self.name(), &self.args()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_cap_forms() {
        assert_eq!(
            Command::new("cap", vec!["ls", "302"]).unwrap(),
            Command::CAP(None, CapSubCommand::LS, None, Some("302".into()))
        );
        assert_eq!(
            Command::new("CAP", vec!["END"]).unwrap(),
            Command::CAP(None, CapSubCommand::END, None, None)
        );
    }

    #[test]
    fn unknown_cap_subcommand_stays_raw() {
        let cmd = Command::new("CAP", vec!["BOGUS"]).unwrap();
        assert_eq!(cmd, Command::Raw("CAP".into(), vec!["BOGUS".into()]));
        assert_eq!(cmd.args(), vec!["BOGUS"]);
    }

    #[test]
    fn server_cap_forms() {
        let cmd = Command::new("CAP", vec!["*", "LS", "*", "a b"]).unwrap();
        assert_eq!(
            cmd,
            Command::CAP(
                Some("*".into()),
                CapSubCommand::LS,
                Some("*".into()),
                Some("a b".into())
            )
        );
    }

    #[test]
    fn cap_reply_trailing_is_always_prefixed() {
        let cmd = Command::CAP(Some("*".into()), CapSubCommand::ACK, None, Some("a".into()));
        assert_eq!(cmd.to_string(), "CAP * ACK :a");

        let empty = Command::CAP(Some("nick".into()), CapSubCommand::LIST, None, Some(String::new()));
        assert_eq!(empty.to_string(), "CAP nick LIST :");
    }

    #[test]
    fn numeric_serialization_pads_code() {
        let cmd = Command::Response(
            Response::RPL_WELCOME,
            vec!["alice".into(), "Welcome to IRC".into()],
        );
        assert_eq!(cmd.to_string(), "001 alice :Welcome to IRC");
    }

    #[test]
    fn wrong_arity_falls_back_to_raw() {
        assert_eq!(
            Command::new("NICK", vec![]).unwrap(),
            Command::Raw("NICK".into(), vec![])
        );
        assert!(matches!(
            Command::new("USER", vec!["guest", "0", "*", "Real Name"]).unwrap(),
            Command::USER(..)
        ));
    }

    #[test]
    fn rejects_non_alphanumeric_command() {
        assert_eq!(
            Command::new("PR!V", vec![]),
            Err(MessageParseError::InvalidCommand("PR!V".into()))
        );
    }
}
