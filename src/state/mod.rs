//! State management module.
//!
//! Contains the [`Server`] (shared state and registry) and per-client
//! [`Connection`] state.

mod connection;
mod server;
mod uid;

pub use connection::{Connection, ConnectionHandle, Identity};
pub use server::{ConnectionField, Server, ServerEvent};
pub use uid::{ConnectionId, IdGenerator};
