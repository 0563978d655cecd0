//! Unified error handling for ircdkit.
//!
//! [`HandlerError`] is returned by extension handlers and turned into numeric
//! replies; [`ServerError`] reports misuse of the server API.

use ircdkit_proto::{Command, Message, Prefix, Response};
use thiserror::Error;
use tokio::sync::mpsc;

// ============================================================================
// Handler Errors (event processing)
// ============================================================================

/// Errors that can occur while an extension handles an event.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("not enough parameters")]
    NeedMoreParams,

    #[error("no nickname given")]
    NoNicknameGiven,

    #[error("erroneous nickname: {0}")]
    ErroneousNickname(String),

    #[error("nickname in use: {0}")]
    NicknameInUse(String),

    #[error("already registered")]
    AlreadyRegistered,

    #[error("password mismatch")]
    PasswordMismatch,

    #[error("invalid CAP subcommand: {0}")]
    InvalidCapCommand(String),

    #[error("send error: {0}")]
    Send(#[from] mpsc::error::SendError<Message>),
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NeedMoreParams => "need_more_params",
            Self::NoNicknameGiven => "no_nickname_given",
            Self::ErroneousNickname(_) => "erroneous_nickname",
            Self::NicknameInUse(_) => "nickname_in_use",
            Self::AlreadyRegistered => "already_registered",
            Self::PasswordMismatch => "password_mismatch",
            Self::InvalidCapCommand(_) => "invalid_cap_command",
            Self::Send(_) => "send_error",
        }
    }

    /// Convert to an IRC error reply message.
    ///
    /// Returns `None` for errors that don't warrant a client-visible reply.
    pub fn to_irc_reply(&self, server_name: &str, nick: &str, cmd_name: &str) -> Option<Message> {
        let (response, args) = match self {
            Self::NeedMoreParams => (
                Response::ERR_NEEDMOREPARAMS,
                vec![nick, cmd_name, "Not enough parameters"],
            ),
            Self::NoNicknameGiven => (Response::ERR_NONICKNAMEGIVEN, vec![nick, "No nickname given"]),
            Self::ErroneousNickname(bad_nick) => (
                Response::ERR_ERRONEUSNICKNAME,
                vec![nick, bad_nick.as_str(), "Erroneous nickname"],
            ),
            Self::NicknameInUse(bad_nick) => (
                Response::ERR_NICKNAMEINUSE,
                vec![nick, bad_nick.as_str(), "Nickname is already in use"],
            ),
            Self::AlreadyRegistered => (
                Response::ERR_ALREADYREGISTRED,
                vec![nick, "You may not reregister"],
            ),
            Self::PasswordMismatch => (Response::ERR_PASSWDMISMATCH, vec![nick, "Password incorrect"]),
            Self::InvalidCapCommand(sub) => (
                Response::ERR_INVALIDCAPCMD,
                vec![nick, sub.as_str(), "Invalid CAP command"],
            ),

            // These errors don't get client-visible replies
            Self::Send(_) => return None,
        };

        let args = args.into_iter().map(str::to_owned).collect();
        Some(
            Message::from(Command::Response(response, args))
                .with_prefix(Prefix::ServerName(server_name.to_string())),
        )
    }
}

/// Result type for extension handlers.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Server Errors (API misuse and startup)
// ============================================================================

/// Errors surfaced synchronously by the server API.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("a server is already listening")]
    AlreadyListening,

    #[error("server has been closed")]
    Closed,

    #[error("local connections require a nickname")]
    MissingNickname,

    #[error("unknown extension: {0}")]
    UnknownExtension(String),

    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),
}
