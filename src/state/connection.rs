//! Per-client connection state.
//!
//! A [`Connection`] is owned by the task that drives it. The parts other
//! connections need to see (identity, outbox, close token) live in a
//! [`ConnectionHandle`] kept in the server registry.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use ircdkit_proto::Message;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::uid::ConnectionId;
use crate::error::HandlerResult;
use crate::extensions::{AuthenticationGate, CapSession, CapabilitySet, Event, Extension, Watchdog};

/// Names a connection presents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub nickname: Option<String>,
    pub username: Option<String>,
    pub realname: Option<String>,
}

/// Shared view of a connection, stored in the server registry.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: Arc<str>,
    host: Arc<str>,
    identity: Arc<RwLock<Identity>>,
    outbox: mpsc::UnboundedSender<Message>,
    token: CancellationToken,
    local: bool,
}

impl ConnectionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn identity(&self) -> Identity {
        self.identity.read().clone()
    }

    pub fn nickname(&self) -> Option<String> {
        self.identity.read().nickname.clone()
    }

    /// Virtual connections have no transport.
    pub fn is_local(&self) -> bool {
        self.local
    }

    /// Queue a message for delivery to this client.
    pub fn send(&self, msg: Message) -> HandlerResult {
        self.outbox.send(msg)?;
        Ok(())
    }

    /// Ask the connection to close.
    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// A client connection and its protocol state.
pub struct Connection {
    handle: ConnectionHandle,
    capabilities: CapabilitySet,
    cap_session: CapSession,
    gate: Option<AuthenticationGate>,
    watchdog: Watchdog,
    password: Option<String>,
    authorized: bool,
    authenticated: bool,
    pending: VecDeque<Event<'static>>,
    extensions: Arc<[Arc<dyn Extension>]>,
}

impl Connection {
    pub(crate) fn new(
        id: ConnectionId,
        host: String,
        local: bool,
        ping_interval: Duration,
        extensions: Arc<[Arc<dyn Extension>]>,
    ) -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (outbox, rx) = mpsc::unbounded_channel();
        let handle = ConnectionHandle {
            id: id.into(),
            host: host.into(),
            identity: Arc::new(RwLock::new(Identity::default())),
            outbox,
            token: CancellationToken::new(),
            local,
        };
        let conn = Self {
            handle,
            capabilities: CapabilitySet::new(),
            cap_session: CapSession::new(),
            gate: None,
            watchdog: Watchdog::new(ping_interval),
            password: None,
            authorized: false,
            authenticated: false,
            pending: VecDeque::new(),
            extensions,
        };
        (conn, rx)
    }

    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    pub fn id(&self) -> &str {
        self.handle.id()
    }

    pub fn host(&self) -> &str {
        self.handle.host()
    }

    pub fn nickname(&self) -> Option<String> {
        self.handle.nickname()
    }

    /// Nickname, or `*` before one is set.
    pub fn nick_or_star(&self) -> String {
        self.nickname().unwrap_or_else(|| "*".to_string())
    }

    pub fn username(&self) -> Option<String> {
        self.handle.identity.read().username.clone()
    }

    pub fn realname(&self) -> Option<String> {
        self.handle.identity.read().realname.clone()
    }

    /// `nick!user@host`, with `*` for unknown parts.
    pub fn mask(&self) -> String {
        let identity = self.handle.identity.read();
        format!(
            "{}!{}@{}",
            identity.nickname.as_deref().unwrap_or("*"),
            identity.username.as_deref().unwrap_or("*"),
            self.handle.host
        )
    }

    pub fn set_nickname(&mut self, nickname: String) {
        self.handle.identity.write().nickname = Some(nickname);
    }

    pub fn set_user(&mut self, username: String, realname: String) {
        let mut identity = self.handle.identity.write();
        identity.username = Some(username);
        identity.realname = Some(realname);
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn set_password(&mut self, password: String) {
        self.password = Some(password);
    }

    /// Queue a message for delivery to this client.
    pub fn send(&self, msg: Message) -> HandlerResult {
        self.handle.send(msg)
    }

    /// Ask the connection to close. The driving task winds down after the
    /// current event.
    pub fn close(&self) {
        self.handle.close();
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    // === Capabilities ===

    /// Capabilities enabled on this connection.
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.contains(name)
    }

    pub fn has_capabilities(&self, names: &[&str]) -> bool {
        self.capabilities.contains_all(names.iter().copied())
    }

    /// Callers must only pass names the server offers.
    pub(crate) fn enable_capabilities(&mut self, names: &[&str]) {
        self.capabilities.extend(names);
    }

    pub fn cap_session(&self) -> &CapSession {
        &self.cap_session
    }

    pub fn cap_session_mut(&mut self) -> &mut CapSession {
        &mut self.cap_session
    }

    // === Authentication ===

    pub fn gate(&self) -> Option<&AuthenticationGate> {
        self.gate.as_ref()
    }

    /// Install an open gate unless one is already present.
    pub fn install_gate(&mut self) {
        self.gate.get_or_insert_with(AuthenticationGate::new);
    }

    /// Pause registration. Returns `false` without a gate or if already paused.
    pub fn pause_authentication(&mut self, reason: &str) -> bool {
        self.gate.as_mut().is_some_and(|gate| gate.pause(reason))
    }

    /// Resume registration, signalling [`Event::AuthenticationResumed`] when
    /// the gate was paused.
    pub fn resume_authentication(&mut self) -> bool {
        let resumed = self.gate.as_mut().is_some_and(|gate| gate.resume());
        if resumed {
            self.signal(Event::AuthenticationResumed);
        }
        resumed
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Mark credentials as accepted and signal [`Event::Authorized`].
    pub fn authorize(&mut self) {
        if !self.authorized {
            self.authorized = true;
            self.signal(Event::Authorized);
        }
    }

    /// Mark registration as complete and signal [`Event::Authenticated`].
    pub fn authenticate(&mut self) {
        if !self.authenticated {
            self.authenticated = true;
            self.signal(Event::Authenticated);
        }
    }

    // === Keepalive ===

    pub fn watchdog(&self) -> &Watchdog {
        &self.watchdog
    }

    pub fn watchdog_mut(&mut self) -> &mut Watchdog {
        &mut self.watchdog
    }

    // === Dispatch ===

    /// Queue a lifecycle event, delivered after the current one.
    pub fn signal(&mut self, event: Event<'static>) {
        self.pending.push_back(event);
    }

    pub(crate) fn next_signal(&mut self) -> Option<Event<'static>> {
        self.pending.pop_front()
    }

    pub(crate) fn extensions(&self) -> Arc<[Arc<dyn Extension>]> {
        Arc::clone(&self.extensions)
    }
}
