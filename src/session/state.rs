//! Session lifecycle state machine
//!
//! Tracks one connection from accept to teardown. A session only becomes
//! addressable once it is `Bound` (identity registered); `Disconnected` is
//! terminal and the transition into it is idempotent so teardown cannot run
//! twice.

use std::net::SocketAddr;
use std::time::Instant;

use super::handle::SessionHandle;

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Channel open, identity not yet registered
    Connecting,
    /// Identity registered in the session registry
    Bound,
    /// Session torn down (terminal)
    Disconnected,
}

/// Per-connection lifecycle state
#[derive(Debug)]
pub struct SessionState {
    /// Handle issued by the transport
    pub handle: SessionHandle,

    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// Current phase
    pub phase: SessionPhase,

    /// Identity registered at bind time
    pub identity: Option<String>,

    /// Connection start time
    pub connected_at: Instant,
}

impl SessionState {
    /// Create state for a freshly accepted connection
    pub fn new(handle: SessionHandle, peer_addr: SocketAddr) -> Self {
        Self {
            handle,
            peer_addr,
            phase: SessionPhase::Connecting,
            identity: None,
            connected_at: Instant::now(),
        }
    }

    /// Mark the session bound to an identity
    ///
    /// Only valid from `Connecting`; any other phase is ignored.
    pub fn bind(&mut self, identity: impl Into<String>) {
        if self.phase == SessionPhase::Connecting {
            self.phase = SessionPhase::Bound;
            self.identity = Some(identity.into());
        }
    }

    /// Mark the session disconnected
    ///
    /// Returns `true` the first time, `false` on repeat calls. Callers use
    /// the return value to run teardown exactly once.
    pub fn disconnect(&mut self) -> bool {
        if self.phase == SessionPhase::Disconnected {
            return false;
        }
        self.phase = SessionPhase::Disconnected;
        true
    }

    /// Whether the session is currently bound
    pub fn is_bound(&self) -> bool {
        self.phase == SessionPhase::Bound
    }

    /// Session duration so far
    pub fn duration(&self) -> std::time::Duration {
        self.connected_at.elapsed()
    }
}
