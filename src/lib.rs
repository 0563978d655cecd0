//! ircdkit - extensible connection core for IRC-style line protocols.
//!
//! A [`Server`] accepts connections and lets independent [`Extension`]s
//! attach protocol behavior to them. Builtins cover registration, nickname
//! handling, capability negotiation and keepalive.
//!
//! ```no_run
//! use ircdkit::{Config, Server};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let mut config = Config::default();
//! config.server.capabilities = vec!["multi-prefix".into()];
//! config.server.extensions = vec!["capabilities".into(), "ping".into()];
//!
//! let server = Server::new(config)?;
//! let addr = server.listen("127.0.0.1:0").await?;
//! println!("listening on {addr}");
//! server.close().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod extensions;
pub mod network;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::{HandlerError, HandlerResult, ServerError};
pub use extensions::{Context, Event, Extension, ExtensionRef};
pub use state::{Connection, ConnectionField, ConnectionHandle, Server, ServerEvent};

pub use ircdkit_proto as proto;
