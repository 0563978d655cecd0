//! Extension framework.
//!
//! An [`Extension`] is a synchronous unit of protocol behavior. Extensions are
//! applied to the [`Server`] once and attached to every connection accepted
//! afterwards; each attached extension sees every [`Event`] on that
//! connection, in registration order.
//!
//! ## Builtins
//!
//! | Name             | Type                   | Loaded by default |
//! |------------------|------------------------|-------------------|
//! | `authentication` | [`Authentication`]     | yes               |
//! | `nickname`       | [`Nickname`]           | yes               |
//! | `capabilities`   | [`Capabilities`]       | no                |
//! | `ping`           | [`Ping`]               | no                |

mod auth;
pub mod caps;
mod gate;
mod nickname;
mod ping;
mod registry;

pub use auth::{Authentication, CredentialVerifier, Credentials, PasswordVerifier};
pub use caps::{CapSession, Capabilities, CapabilitySet, GateWatch, Negotiation};
pub use gate::AuthenticationGate;
pub use nickname::Nickname;
pub use ping::{Ping, Watchdog, WatchdogAction};
pub use registry::{ExtensionRef, ExtensionRegistry};

use std::sync::Arc;
use std::time::Instant;

use ircdkit_proto::{Command, Message};

use crate::config::ServerConfig;
use crate::error::{HandlerResult, ServerError};
use crate::state::{Connection, Server};

/// Names of the builtin extensions.
pub const BUILTIN_EXTENSIONS: [&str; 4] = ["authentication", "capabilities", "nickname", "ping"];

/// Builtins loaded unless `use_default_extensions` is false.
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["authentication", "nickname"];

/// Something that happened on a connection.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// The connection was accepted and the extension attached to it.
    Accepted,
    /// A parsed inbound message.
    Command(&'a Message),
    /// The connection passed credential checks.
    Authorized,
    /// Registration completed.
    Authenticated,
    /// A paused [`AuthenticationGate`] was resumed.
    AuthenticationResumed,
    /// The nickname changed.
    NicknameChanged,
    /// The client sent `QUIT`.
    Quit,
    /// The keepalive deadline elapsed.
    KeepaliveTick,
}

impl Event<'_> {
    /// Command token for [`Event::Command`], empty otherwise.
    pub fn command_name(&self) -> &str {
        match self {
            Event::Command(msg) => msg.command_name(),
            _ => "",
        }
    }

    /// The inbound command, if this event carries one.
    pub fn command(&self) -> Option<&Command> {
        match self {
            Event::Command(msg) => Some(&msg.command),
            _ => None,
        }
    }
}

/// Handler context passed to each extension.
pub struct Context<'a> {
    /// The server the connection belongs to.
    pub server: &'a Server,
    /// The connection the event happened on.
    pub conn: &'a mut Connection,
    /// Time the event is processed at.
    pub now: Instant,
}

impl Context<'_> {
    /// Send a server-originated message, prefixed with the server host.
    pub fn reply(&self, command: Command) -> HandlerResult {
        self.conn
            .send(Message::from(command).with_prefix(self.server.prefix()))
    }

    /// Server-wide configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.server.config().server
    }
}

/// A unit of protocol behavior.
///
/// Identity is [`Extension::name`]: registering a second value with the same
/// name is a no-op. The default name is the type name, so every value of a
/// type counts as one extension; override `name` to register several.
pub trait Extension: Send + Sync + 'static {
    /// Identity used for deduplication.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Called once when the extension is registered with a server.
    fn apply(&self, _server: &Server) -> Result<(), ServerError> {
        Ok(())
    }

    /// Handle one event on an attached connection.
    fn handle(&self, ctx: &mut Context<'_>, event: &Event<'_>) -> HandlerResult;
}

/// Resolve a builtin extension by name.
pub fn builtin(name: &str, config: &ServerConfig) -> Option<Arc<dyn Extension>> {
    let ext: Arc<dyn Extension> = match name {
        "authentication" => Arc::new(Authentication::from_config(config)),
        "capabilities" => Arc::new(Capabilities),
        "nickname" => Arc::new(Nickname),
        "ping" => Arc::new(Ping),
        _ => return None,
    };
    Some(ext)
}
