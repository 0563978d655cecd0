//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds a socket and hands every accepted stream to
//! [`Server::handle`], which spawns a connection task for it.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, ToSocketAddrs};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::state::Server;

/// The Gateway accepts incoming TCP connections.
pub struct Gateway {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind<A: ToSocketAddrs>(addr: A) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!(address = %local_addr, "Plaintext listener bound");
        Ok(Self {
            listener,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections until `shutdown` fires.
    #[instrument(skip_all, name = "gateway", fields(addr = %self.local_addr))]
    pub async fn run(self, server: Arc<Server>, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Listener stopped");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        if let Err(e) = stream.set_nodelay(true) {
                            debug!(%addr, error = %e, "Failed to set TCP_NODELAY");
                        }
                        server.handle(stream, addr);
                    }
                    Err(e) => server.report_error(None, e),
                },
            }
        }
    }
}
