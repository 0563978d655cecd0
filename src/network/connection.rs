//! Connection driver - runs one client connection.
//!
//! Each connection runs in its own Tokio task:
//!
//! ```text
//!   FramedRead<LineCodec> ──▶ Message::from_str ──▶ Server::dispatch
//!                                                        │
//!   FramedWrite<IrcCodec> ◀──── outbox (mpsc) ◀──────────┘
//!
//!   watchdog deadline ──▶ Event::KeepaliveTick
//!   close token       ──▶ wind down
//! ```
//!
//! The task owns the [`Connection`], so an event is fully handled before the
//! next line or timer is looked at.

use std::sync::Arc;
use std::time::Instant;

use futures_util::{SinkExt, StreamExt};
use ircdkit_proto::{IrcCodec, LineCodec, Message};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, instrument, warn};

use crate::extensions::Event;
use crate::state::{Connection, Server};

/// Sleep until the watchdog deadline, or forever without one.
async fn keepalive_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}

/// Drive a connection until it closes, then deregister it.
#[instrument(skip_all, name = "connection", fields(id = %conn.id(), host = %conn.host()))]
pub(crate) async fn drive<S>(
    server: Arc<Server>,
    mut conn: Connection,
    mut outbox: mpsc::UnboundedReceiver<Message>,
    stream: S,
) where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    let id = conn.id().to_string();
    let token = conn.handle().token().clone();

    let (read_half, write_half) = tokio::io::split(stream);
    let mut reader = FramedRead::new(read_half, LineCodec::new());
    let mut writer = FramedWrite::new(write_half, IrcCodec::new());

    info!("Client connected");
    server.notify(&mut conn, Event::Accepted, Instant::now());

    loop {
        let deadline = conn.watchdog().next_deadline();

        tokio::select! {
            biased;

            // Responses queued by extensions
            Some(msg) = outbox.recv() => {
                if let Err(e) = writer.send(msg).await {
                    server.report_error(Some(id.as_str()), e);
                    break;
                }
            }

            _ = token.cancelled() => break,

            line = reader.next() => match line {
                Some(Ok(line)) => match line.parse::<Message>() {
                    Ok(msg) => {
                        debug!(raw = %line.trim_end(), "Received message");
                        server.dispatch(&mut conn, &msg, Instant::now());
                    }
                    Err(e) => {
                        debug!(error = %e, "Skipping unparsable line");
                        server.report_error(Some(id.as_str()), e);
                    }
                },
                Some(Err(e)) => {
                    warn!(error = %e, "Read error");
                    server.report_error(Some(id.as_str()), e);
                    conn.close();
                    break;
                }
                None => {
                    conn.close();
                    server.connection_ended(&id);
                    break;
                }
            },

            _ = keepalive_deadline(deadline) => {
                server.notify(&mut conn, Event::KeepaliveTick, Instant::now());
            }
        }
    }

    // Flush whatever was queued before the close (e.g. QUIT's ERROR line).
    while let Ok(msg) = outbox.try_recv() {
        if writer.feed(msg).await.is_err() {
            break;
        }
    }
    if let Err(e) = writer.flush().await {
        debug!(error = %e, "Flush on close failed");
    }

    conn.close();
    server.connection_closed(&id);
}
