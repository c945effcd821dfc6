//! Relay server listener
//!
//! Handles the TCP accept loop and spawns one connection handler per client.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::error::Result;
use crate::relay::Relay;
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;
use crate::session::SessionHandle;

/// Chat relay server
pub struct RelayServer {
    config: ServerConfig,
    relay: Arc<Relay>,
    next_session_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl RelayServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            config,
            relay: Arc::new(Relay::new()),
            next_session_id: AtomicU64::new(1),
            connection_semaphore,
        }
    }

    /// Get a reference to the relay core
    pub fn relay(&self) -> &Arc<Relay> {
        &self.relay
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Run the server
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Relay server listening");

        self.accept_loop(&listener).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Relay server listening");

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        }
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        // Check connection limit
        let permit = if let Some(ref sem) = self.connection_semaphore {
            match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    return;
                }
            }
        } else {
            None
        };

        let handle = SessionHandle::new(self.next_session_id.fetch_add(1, Ordering::Relaxed));

        tracing::debug!(
            session_id = handle.id(),
            peer = %peer_addr,
            "New connection"
        );

        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::debug!(error = %e, "Failed to set TCP_NODELAY");
            }
        }

        let config = self.config.clone();
        let relay = Arc::clone(&self.relay);

        tokio::spawn(async move {
            // Permit held for the lifetime of the connection task
            let _permit = permit;

            let mut connection = Connection::new(handle, socket, peer_addr, config, relay);

            if let Err(e) = connection.run().await {
                tracing::debug!(
                    session_id = handle.id(),
                    error = %e,
                    "Connection error"
                );
            }

            tracing::debug!(session_id = handle.id(), "Connection closed");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_construction() {
        let config = ServerConfig::default().max_connections(10);
        let server = RelayServer::new(config);

        assert!(server.connection_semaphore.is_some());
        assert_eq!(server.bind_addr().port(), 7667);
    }

    #[test]
    fn test_unlimited_connections_no_semaphore() {
        let server = RelayServer::new(ServerConfig::default());

        assert!(server.connection_semaphore.is_none());
    }
}
