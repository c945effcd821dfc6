//! TCP server front-end
//!
//! This module provides:
//! - Server configuration
//! - The accept loop and connection limit
//! - Per-connection reader/writer tasks bridging sockets to the relay core

pub mod config;
pub mod connection;
pub mod listener;

pub use config::ServerConfig;
pub use connection::Connection;
pub use listener::RelayServer;
