//! ircdkit - standalone server binary.

use ircdkit::{Config, Server};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        server = %config.server.name,
        hostname = %config.server.hostname,
        "Starting ircdkit"
    );

    let address = config.listen.address.clone();
    let server = Server::new(config)?;

    server.listen(address.as_str()).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    server.close().await;

    Ok(())
}
