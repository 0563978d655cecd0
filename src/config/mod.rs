//! Configuration loading and management.
//!
//! - [`types`]: config struct definitions (Config, ServerConfig, ListenConfig)
//! - [`defaults`]: serde default functions

mod defaults;
mod types;

pub use types::{Config, ConfigError, ListenConfig, ServerConfig};
