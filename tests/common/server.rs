//! Test server management.
//!
//! Runs an ircdkit server inside the test process on an ephemeral port.

use std::net::SocketAddr;
use std::sync::Arc;

use ircdkit::{Config, Server};

use super::TestClient;

pub const HOSTNAME: &str = "irc.test";

/// A test server instance.
pub struct TestServer {
    server: Arc<Server>,
    addr: SocketAddr,
}

impl TestServer {
    /// Spawn a server offering capabilities `a` and `b` with every builtin enabled.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn a server after letting the caller adjust the configuration.
    pub async fn spawn_with<F>(configure: F) -> anyhow::Result<Self>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = Config::default();
        config.server.hostname = HOSTNAME.to_string();
        config.server.capabilities = vec!["a".to_string(), "b".to_string()];
        config.server.extensions = vec!["capabilities".to_string(), "ping".to_string()];
        configure(&mut config);

        let server = Server::new(config)?;
        let addr = server.listen("127.0.0.1:0").await?;
        Ok(Self { server, addr })
    }

    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    pub fn server(&self) -> &Arc<Server> {
        &self.server
    }

    /// Open a client connection that will register as `nick`.
    pub async fn connect(&self, nick: &str) -> anyhow::Result<TestClient> {
        TestClient::connect(&self.address(), nick).await
    }
}
