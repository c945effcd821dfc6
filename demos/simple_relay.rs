//! Simple chat relay server
//!
//! Run with: cargo run --example simple_relay [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example simple_relay                  # binds to 0.0.0.0:7667
//!   cargo run --example simple_relay 127.0.0.1:7700   # custom address
//!
//! Clients speak the length-prefixed frame protocol: the first frame must be
//! Hello with the identity to register; after that the usual send/join/leave
//! commands apply. Presence events and messages stream back on the same
//! socket. Stops on Ctrl-C.

use std::net::SocketAddr;

use chat_relay::{RelayServer, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> chat_relay::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let bind_addr: SocketAddr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "0.0.0.0:7667".to_string())
        .parse()
        .expect("invalid bind address");

    let config = ServerConfig::with_addr(bind_addr).max_connections(1000);
    let server = RelayServer::new(config);

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    let stats = server.relay().stats();
    tracing::info!(
        total_sessions = stats.total_sessions,
        messages_routed = stats.messages_routed,
        events_delivered = stats.events_delivered,
        "Relay stopped"
    );

    Ok(())
}
