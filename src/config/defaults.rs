//! Default value functions for configuration.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

pub fn default_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

pub fn default_hostname() -> String {
    "unknown.tld".to_string()
}

pub fn default_welcome_message() -> String {
    "Welcome to IRC".to_string()
}

/// Keepalive interval in milliseconds.
pub fn default_ping_time() -> u64 {
    60_000
}

pub fn default_listen_address() -> String {
    "127.0.0.1:6667".to_string()
}
