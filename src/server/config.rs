//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

/// Hard upper bound on a single frame, regardless of configuration
pub const MAX_FRAME_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Maximum concurrent connections (0 = unlimited)
    pub max_connections: usize,

    /// Idle timeout (disconnect if no frame received)
    pub idle_timeout: Duration,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,

    /// Per-session outbound event queue capacity
    ///
    /// A session whose queue is full drops events rather than stalling the
    /// relay.
    pub session_queue_capacity: usize,

    /// Maximum accepted frame payload size in bytes
    pub max_frame_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:7667".parse().unwrap(),
            max_connections: 0, // Unlimited
            idle_timeout: Duration::from_secs(300),
            tcp_nodelay: true, // Chat traffic is small and latency-sensitive
            session_queue_capacity: 256,
            max_frame_size: 1024 * 1024, // 1MB, enough for file blobs
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set idle timeout
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set per-session event queue capacity (minimum 1)
    pub fn session_queue_capacity(mut self, capacity: usize) -> Self {
        self.session_queue_capacity = capacity.max(1);
        self
    }

    /// Set maximum frame size
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size.min(MAX_FRAME_SIZE_LIMIT);
        self
    }
}
