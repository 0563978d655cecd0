//! `NICK` handling.

use ircdkit_proto::{Command, irc_eq};
use tracing::debug;

use crate::error::{HandlerError, HandlerResult};
use crate::extensions::{Context, Event, Extension};
use crate::state::ConnectionField;

/// Longest nickname accepted.
pub const MAX_NICK_LEN: usize = 30;

fn is_special(c: char) -> bool {
    matches!(c, '[' | ']' | '\\' | '`' | '_' | '^' | '{' | '|' | '}')
}

/// RFC 2812 nickname grammar with a relaxed length limit.
fn is_valid_nick(nick: &str) -> bool {
    let mut chars = nick.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    nick.len() <= MAX_NICK_LEN
        && (first.is_ascii_alphabetic() || is_special(first))
        && chars.all(|c| c.is_ascii_alphanumeric() || is_special(c) || c == '-')
}

/// The `nickname` builtin.
pub struct Nickname;

impl Extension for Nickname {
    fn name(&self) -> &'static str {
        "nickname"
    }

    fn handle(&self, ctx: &mut Context<'_>, event: &Event<'_>) -> HandlerResult {
        let nick = match event.command() {
            Some(Command::NICK(nick)) => nick.as_str(),
            Some(Command::Raw(name, _)) if name == "NICK" => "",
            _ => return Ok(()),
        };

        if nick.is_empty() {
            return Err(HandlerError::NoNicknameGiven);
        }
        if !is_valid_nick(nick) {
            return Err(HandlerError::ErroneousNickname(nick.to_string()));
        }

        let current = ctx.conn.nickname();
        if current.as_deref() == Some(nick) {
            return Ok(());
        }
        let own_nick = current.as_deref().is_some_and(|c| irc_eq(c, nick));
        if !own_nick
            && ctx
                .server
                .get_connection(ConnectionField::Nickname, nick)
                .is_some_and(|other| other.id() != ctx.conn.id())
        {
            return Err(HandlerError::NicknameInUse(nick.to_string()));
        }

        debug!(id = %ctx.conn.id(), old = ?current, new = %nick, "nickname changed");
        ctx.conn.set_nickname(nick.to_string());
        ctx.conn.signal(Event::NicknameChanged);
        Ok(())
    }
}
