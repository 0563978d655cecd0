//! Server - shared state and connection registry.
//!
//! The [`Server`] owns the offered capability set, the id-keyed registry of
//! live connections and the applied extensions. Every connection is driven
//! by its own task; the server only sees [`ConnectionHandle`]s.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use dashmap::DashMap;
use ircdkit_proto::{Command, Message, Prefix, irc_eq};
use parking_lot::RwLock;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::ToSocketAddrs;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::connection::{Connection, ConnectionHandle};
use super::uid::{ConnectionId, IdGenerator};
use crate::config::Config;
use crate::error::ServerError;
use crate::extensions::{
    CapabilitySet, Context, DEFAULT_EXTENSIONS, Event, ExtensionRef, ExtensionRegistry, builtin,
};
use crate::network::{self, Gateway};

/// Capacity of the server event bus.
const EVENT_CAPACITY: usize = 256;

/// Host recorded for virtual local connections.
const LOCAL_HOST: &str = "localhost";

/// Field used by [`Server::get_connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionField {
    Id,
    /// Compared with RFC 1459 casemapping.
    Nickname,
    Username,
    Host,
}

/// Lifecycle notifications published on the server event bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// The listener is bound.
    Listening(SocketAddr),
    /// A connection was accepted.
    Connection(ConnectionId),
    /// The peer ended the transport.
    ConnectionEnd(ConnectionId),
    /// A connection was deregistered.
    ConnectionClose(ConnectionId),
    /// A transport, codec or listener error.
    Error {
        connection: Option<ConnectionId>,
        message: String,
    },
    /// Shutdown finished; no connections remain.
    Closed,
}

/// Shared server state.
pub struct Server {
    config: Config,
    offered: RwLock<CapabilitySet>,
    connections: DashMap<ConnectionId, ConnectionHandle>,
    extensions: RwLock<ExtensionRegistry>,
    events: broadcast::Sender<ServerEvent>,
    ids: IdGenerator,
    listening: AtomicBool,
    closing: AtomicBool,
    closed_emitted: AtomicBool,
    /// Stops the accept loop.
    shutdown: CancellationToken,
    /// Resolves every pending [`Server::close`] call.
    closed: CancellationToken,
}

impl Server {
    /// Build a server and apply the configured extensions.
    pub fn new(config: Config) -> Result<Arc<Self>, ServerError> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let offered = config.server.capabilities.iter().collect();

        let server = Arc::new(Self {
            config,
            offered: RwLock::new(offered),
            connections: DashMap::new(),
            extensions: RwLock::new(ExtensionRegistry::new()),
            events,
            ids: IdGenerator::new(),
            listening: AtomicBool::new(false),
            closing: AtomicBool::new(false),
            closed_emitted: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
            closed: CancellationToken::new(),
        });

        if server.config.server.use_default_extensions {
            for name in DEFAULT_EXTENSIONS {
                server.use_extension(name)?;
            }
        }
        for name in &server.config.server.extensions {
            server.use_extension(name.as_str())?;
        }

        Ok(server)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Prefix carried by every server-originated message.
    pub fn prefix(&self) -> Prefix {
        Prefix::ServerName(self.config.server.hostname.clone())
    }

    /// Subscribe to lifecycle notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: ServerEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub(crate) fn report_error(&self, connection: Option<&str>, error: impl fmt::Display) {
        warn!(connection = ?connection, error = %error, "server error");
        self.emit(ServerEvent::Error {
            connection: connection.map(str::to_string),
            message: error.to_string(),
        });
    }

    // === Extensions ===

    /// Apply an extension unless one with the same name already was.
    ///
    /// Returns `true` when the extension was newly applied. It attaches to
    /// connections accepted from now on.
    pub fn use_extension(&self, ext: impl Into<ExtensionRef>) -> Result<bool, ServerError> {
        let ext = match ext.into() {
            ExtensionRef::Builtin(name) => match builtin(&name, &self.config.server) {
                Some(ext) => ext,
                None => return Err(ServerError::UnknownExtension(name)),
            },
            ExtensionRef::Custom(ext) => ext,
        };

        let name = ext.name();
        if !self.extensions.write().reserve(name) {
            debug!(extension = name, "extension already applied");
            return Ok(false);
        }

        if let Err(e) = ext.apply(self) {
            self.extensions.write().release(name);
            return Err(e);
        }
        self.extensions.write().insert(ext);
        info!(extension = name, "extension applied");
        Ok(true)
    }

    /// Names of the applied extensions, in registration order.
    pub fn extension_names(&self) -> Vec<&'static str> {
        self.extensions.read().names()
    }

    // === Capabilities ===

    /// Snapshot of the offered capability set.
    pub fn capabilities(&self) -> CapabilitySet {
        self.offered.read().clone()
    }

    /// Offer additional capabilities to clients.
    pub fn enable_capabilities<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.offered.write().extend(names);
    }

    pub fn has_capability(&self, name: &str) -> bool {
        self.offered.read().contains(name)
    }

    pub fn has_capabilities(&self, names: &[&str]) -> bool {
        self.offered.read().contains_all(names.iter().copied())
    }

    // === Registry ===

    /// Find a live connection by one of its identity fields.
    pub fn get_connection(&self, field: ConnectionField, value: &str) -> Option<ConnectionHandle> {
        if field == ConnectionField::Id {
            return self.connections.get(value).map(|entry| entry.value().clone());
        }

        self.connections
            .iter()
            .find(|entry| field_matches(entry.value(), field, value))
            .map(|entry| entry.value().clone())
    }

    /// Handles of every live connection.
    pub fn connections(&self) -> Vec<ConnectionHandle> {
        self.connections.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Create a virtual client with no transport.
    ///
    /// The returned receiver yields whatever is sent to the connection.
    pub fn create_connection(
        &self,
        nickname: &str,
    ) -> Result<(Connection, mpsc::UnboundedReceiver<Message>), ServerError> {
        if nickname.is_empty() {
            return Err(ServerError::MissingNickname);
        }
        if self.closing.load(Ordering::Acquire) {
            return Err(ServerError::Closed);
        }

        let (mut conn, rx) = self.register(self.ids.next_local(), LOCAL_HOST.to_string(), true);
        conn.set_nickname(nickname.to_string());
        debug!(id = %conn.id(), %nickname, "local connection created");

        self.notify(&mut conn, Event::Accepted, Instant::now());
        Ok((conn, rx))
    }

    /// Deregister a connection. Returns `false` if it was not registered.
    pub fn remove_connection(&self, id: &str) -> bool {
        let removed = self.connections.remove(id).is_some();
        if removed {
            debug!(%id, "connection removed");
            self.finish_if_drained();
        }
        removed
    }

    fn register(
        &self,
        id: ConnectionId,
        host: String,
        local: bool,
    ) -> (Connection, mpsc::UnboundedReceiver<Message>) {
        let extensions = self.extensions.read().snapshot();
        let (conn, rx) = Connection::new(
            id,
            host,
            local,
            self.config.server.ping_interval(),
            extensions,
        );
        self.connections
            .insert(conn.id().to_string(), conn.handle().clone());
        (conn, rx)
    }

    // === Transport ===

    /// Bind a listener and start accepting connections.
    ///
    /// Returns the bound address. A server listens at most once.
    pub async fn listen<A: ToSocketAddrs>(self: &Arc<Self>, addr: A) -> Result<SocketAddr, ServerError> {
        if self.closing.load(Ordering::Acquire) {
            return Err(ServerError::Closed);
        }
        if self.listening.swap(true, Ordering::AcqRel) {
            return Err(ServerError::AlreadyListening);
        }

        let gateway = match Gateway::bind(addr).await {
            Ok(gateway) => gateway,
            Err(e) => {
                self.listening.store(false, Ordering::Release);
                return Err(ServerError::Bind(e));
            }
        };

        let local_addr = gateway.local_addr();
        info!(server = %self.config.server.name, %local_addr, "server listening");
        self.emit(ServerEvent::Listening(local_addr));

        tokio::spawn(gateway.run(Arc::clone(self), self.shutdown.clone()));
        Ok(local_addr)
    }

    /// Take over a transport and drive it as a new connection.
    pub fn handle<S>(self: &Arc<Self>, stream: S, addr: SocketAddr) -> ConnectionId
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (conn, outbox) = self.register(self.ids.next_remote(), addr.ip().to_string(), false);
        let id = conn.id().to_string();
        info!(%id, %addr, "connection accepted");

        if self.closing.load(Ordering::Acquire) {
            conn.close();
        }

        self.emit(ServerEvent::Connection(id.clone()));
        tokio::spawn(network::drive(Arc::clone(self), conn, outbox, stream));
        id
    }

    pub(crate) fn connection_ended(&self, id: &str) {
        info!(%id, "connection ended by peer");
        self.emit(ServerEvent::ConnectionEnd(id.to_string()));
    }

    pub(crate) fn connection_closed(&self, id: &str) {
        self.connections.remove(id);
        info!(%id, "connection closed");
        self.emit(ServerEvent::ConnectionClose(id.to_string()));
        self.finish_if_drained();
    }

    // === Dispatch ===

    /// Deliver an inbound message to every extension attached to `conn`,
    /// then any lifecycle events that queued up.
    pub fn dispatch(&self, conn: &mut Connection, msg: &Message, now: Instant) {
        self.deliver(conn, &Event::Command(msg), now);

        if let Command::QUIT(reason) = &msg.command {
            self.quit(conn, reason.as_deref());
        }

        self.drain(conn, now);
    }

    /// Deliver a non-command event, then any lifecycle events that queued up.
    pub fn notify(&self, conn: &mut Connection, event: Event<'_>, now: Instant) {
        self.deliver(conn, &event, now);
        self.drain(conn, now);
    }

    fn drain(&self, conn: &mut Connection, now: Instant) {
        while let Some(event) = conn.next_signal() {
            self.deliver(conn, &event, now);
        }
    }

    fn deliver(&self, conn: &mut Connection, event: &Event<'_>, now: Instant) {
        let extensions = conn.extensions();
        for ext in extensions.iter() {
            let mut ctx = Context {
                server: self,
                conn: &mut *conn,
                now,
            };
            let Err(e) = ext.handle(&mut ctx, event) else {
                continue;
            };

            debug!(
                id = %conn.id(),
                extension = ext.name(),
                code = e.error_code(),
                error = %e,
                "handler error"
            );
            let nick = conn.nick_or_star();
            if let Some(reply) = e.to_irc_reply(&self.config.server.hostname, &nick, event.command_name())
                && let Err(e) = conn.send(reply)
            {
                debug!(id = %conn.id(), error = %e, "failed to queue error reply");
            }
        }
    }

    fn quit(&self, conn: &mut Connection, reason: Option<&str>) {
        let reason = reason.unwrap_or("Client Quit");
        info!(id = %conn.id(), %reason, "client quit");

        conn.signal(Event::Quit);
        let farewell = Message::error(format!("Closing Link: {} ({})", conn.host(), reason))
            .with_prefix(self.prefix());
        if let Err(e) = conn.send(farewell) {
            debug!(id = %conn.id(), error = %e, "failed to queue farewell");
        }
        conn.close();
    }

    // === Shutdown ===

    /// Stop accepting, close every connection and wait until all are gone.
    ///
    /// Safe to call repeatedly; [`ServerEvent::Closed`] is emitted once and
    /// every caller resolves when it is.
    pub async fn close(&self) {
        if !self.closing.swap(true, Ordering::AcqRel) {
            info!("closing all connections");
            self.shutdown.cancel();

            if self.listening.load(Ordering::Acquire) {
                // Local connections have no task to deregister them.
                self.connections.retain(|_, handle| {
                    handle.close();
                    !handle.is_local()
                });
            } else {
                for entry in self.connections.iter() {
                    entry.value().close();
                }
                self.connections.clear();
            }

            self.finish_if_drained();
        }

        self.closed.cancelled().await;
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    fn finish_if_drained(&self) {
        if !self.closing.load(Ordering::Acquire) || !self.connections.is_empty() {
            return;
        }
        if !self.closed_emitted.swap(true, Ordering::AcqRel) {
            info!("server closed");
            self.emit(ServerEvent::Closed);
            self.closed.cancel();
        }
    }
}

fn field_matches(handle: &ConnectionHandle, field: ConnectionField, value: &str) -> bool {
    match field {
        ConnectionField::Id => handle.id() == value,
        ConnectionField::Nickname => handle.nickname().is_some_and(|nick| irc_eq(&nick, value)),
        ConnectionField::Username => handle.identity().username.as_deref() == Some(value),
        ConnectionField::Host => handle.host() == value,
    }
}
