//! Integration test common infrastructure.
//!
//! Provides an in-process test server, a line-oriented test client and
//! helpers for waiting on server lifecycle events.

pub mod client;
pub mod server;

use std::time::Duration;

use ircdkit::ServerEvent;
use tokio::sync::broadcast;
use tokio::time::timeout;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::TestServer;

/// Wait for the first event matching `predicate`, collecting everything seen.
#[allow(dead_code)]
pub async fn wait_for_event<F>(
    events: &mut broadcast::Receiver<ServerEvent>,
    mut predicate: F,
) -> anyhow::Result<Vec<ServerEvent>>
where
    F: FnMut(&ServerEvent) -> bool,
{
    let mut seen = Vec::new();
    loop {
        let event = timeout(Duration::from_secs(5), events.recv()).await??;
        let done = predicate(&event);
        seen.push(event);
        if done {
            return Ok(seen);
        }
    }
}

/// Poll `condition` until it holds or five seconds pass.
#[allow(dead_code)]
pub async fn wait_until<F>(mut condition: F) -> anyhow::Result<()>
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            anyhow::bail!("condition not met within 5s");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Ok(())
}
