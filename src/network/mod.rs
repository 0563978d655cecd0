//! Network module.
//!
//! Contains the Gateway (TCP listener) and the per-connection driver task.

mod connection;
mod gateway;

pub(crate) use connection::drive;
pub use gateway::Gateway;
