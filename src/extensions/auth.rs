//! Registration (`PASS`, `USER`) and credential checks.
//!
//! Registration completes once `USER` is known, the nickname is set (when
//! `require_nickname` is on) and the connection's [`AuthenticationGate`] is
//! open. A paused gate defers completion until
//! [`Event::AuthenticationResumed`].
//!
//! [`AuthenticationGate`]: super::AuthenticationGate

use std::sync::Arc;

use ircdkit_proto::{Command, Response};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::{HandlerError, HandlerResult};
use crate::extensions::{Context, Event, Extension};

/// What a client presented during registration.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub nickname: Option<&'a str>,
    pub username: &'a str,
    pub password: Option<&'a str>,
    pub host: &'a str,
}

/// Decides whether a registering client may proceed.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, credentials: &Credentials<'_>) -> bool;
}

/// Compares `PASS` with a configured password; accepts everyone when unset.
#[derive(Debug, Clone, Default)]
pub struct PasswordVerifier {
    password: Option<String>,
}

impl PasswordVerifier {
    pub fn new(password: Option<String>) -> Self {
        Self { password }
    }
}

impl CredentialVerifier for PasswordVerifier {
    fn verify(&self, credentials: &Credentials<'_>) -> bool {
        match &self.password {
            Some(expected) => credentials.password == Some(expected.as_str()),
            None => true,
        }
    }
}

/// The `authentication` builtin.
///
/// Only one extension named `authentication` can be registered, so a custom
/// verifier requires `use_default_extensions = false`.
pub struct Authentication {
    verifier: Arc<dyn CredentialVerifier>,
}

impl Authentication {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(Arc::new(PasswordVerifier::new(config.password.clone())))
    }

    /// Finish registration if nothing is holding it back.
    fn try_complete(&self, ctx: &mut Context<'_>) -> HandlerResult {
        if ctx.conn.is_authenticated() || ctx.conn.is_closed() {
            return Ok(());
        }
        let Some(username) = ctx.conn.username() else {
            return Ok(());
        };
        let nickname = ctx.conn.nickname();
        if ctx.config().require_nickname && nickname.is_none() {
            return Ok(());
        }
        if let Some(reason) = ctx.conn.gate().and_then(|g| g.reason()) {
            debug!(id = %ctx.conn.id(), reason, "registration paused");
            return Ok(());
        }

        let credentials = Credentials {
            nickname: nickname.as_deref(),
            username: &username,
            password: ctx.conn.password(),
            host: ctx.conn.host(),
        };
        if !self.verifier.verify(&credentials) {
            warn!(id = %ctx.conn.id(), %username, "credentials rejected");
            let nick = ctx.conn.nick_or_star();
            if let Some(reply) =
                HandlerError::PasswordMismatch.to_irc_reply(&ctx.config().hostname, &nick, "PASS")
            {
                ctx.conn.send(reply)?;
            }
            ctx.conn.close();
            return Ok(());
        }

        ctx.conn.authorize();
        ctx.conn.authenticate();

        let nick = ctx.conn.nick_or_star();
        info!(id = %ctx.conn.id(), %nick, %username, "client registered");
        let welcome = ctx.config().welcome_message.clone();
        ctx.reply(Command::Response(Response::RPL_WELCOME, vec![nick, welcome]))
    }
}

impl Extension for Authentication {
    fn name(&self) -> &'static str {
        "authentication"
    }

    fn handle(&self, ctx: &mut Context<'_>, event: &Event<'_>) -> HandlerResult {
        match event {
            Event::Accepted => {
                ctx.conn.install_gate();
                Ok(())
            }
            Event::AuthenticationResumed | Event::NicknameChanged => self.try_complete(ctx),
            Event::Command(msg) => match &msg.command {
                Command::PASS(password) => {
                    if ctx.conn.is_authenticated() {
                        return Err(HandlerError::AlreadyRegistered);
                    }
                    ctx.conn.set_password(password.clone());
                    Ok(())
                }
                Command::USER(username, _mode, realname) => {
                    if ctx.conn.is_authenticated() {
                        return Err(HandlerError::AlreadyRegistered);
                    }
                    if username.is_empty() {
                        return Err(HandlerError::NeedMoreParams);
                    }
                    ctx.conn.set_user(username.clone(), realname.clone());
                    self.try_complete(ctx)
                }
                Command::Raw(name, _) if name == "PASS" || name == "USER" => {
                    if ctx.conn.is_authenticated() {
                        Err(HandlerError::AlreadyRegistered)
                    } else {
                        Err(HandlerError::NeedMoreParams)
                    }
                }
                _ => Ok(()),
            },
            _ => Ok(()),
        }
    }
}
