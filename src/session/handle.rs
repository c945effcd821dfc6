//! Session handle and delivery channel
//!
//! A [`SessionHandle`] identifies one live connection for the lifetime of the
//! process. The [`SessionSender`] is the delivery half of a session: a bounded
//! queue the router pushes events into, drained by the connection's writer
//! task. Delivery is strictly non-blocking; a full queue drops the event
//! rather than stalling the router.

use tokio::sync::mpsc;

use crate::routing::ServerEvent;

/// Opaque identifier for one live session
///
/// Issued by the transport (an `AtomicU64` counter in the TCP server) and
/// never reused while the process runs. Components outside the transport
/// treat it as a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionHandle(u64);

impl SessionHandle {
    /// Create a handle from a raw session ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw session ID (for logging)
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivery half of a session
///
/// Cheap to clone; clones push into the same queue.
#[derive(Debug, Clone)]
pub struct SessionSender {
    tx: mpsc::Sender<ServerEvent>,
}

/// Create a session delivery channel with the given queue capacity
///
/// The receiver side belongs to the session's writer task (or the test
/// harness); the sender side is handed to the registry at bind time.
pub fn session_channel(capacity: usize) -> (SessionSender, mpsc::Receiver<ServerEvent>) {
    let (tx, rx) = mpsc::channel(capacity);
    (SessionSender { tx }, rx)
}

impl SessionSender {
    /// Attempt to deliver an event without blocking
    ///
    /// Returns `false` if the queue is full or the session is gone. Callers
    /// treat a failed delivery as a drop, never an error.
    pub fn try_deliver(&self, event: ServerEvent) -> bool {
        self.tx.try_send(event).is_ok()
    }

    /// Whether the receiving side has gone away
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_display() {
        let handle = SessionHandle::new(42);
        assert_eq!(handle.id(), 42);
        assert_eq!(handle.to_string(), "42");
    }

    #[tokio::test]
    async fn test_try_deliver() {
        let (sender, mut rx) = session_channel(4);

        assert!(sender.try_deliver(ServerEvent::online("alice")));

        let event = rx.recv().await.unwrap();
        assert_eq!(event, ServerEvent::online("alice"));
    }

    #[tokio::test]
    async fn test_try_deliver_full_queue_drops() {
        let (sender, _rx) = session_channel(1);

        assert!(sender.try_deliver(ServerEvent::online("alice")));
        // Queue full: drop, not block
        assert!(!sender.try_deliver(ServerEvent::online("bob")));
    }

    #[tokio::test]
    async fn test_try_deliver_closed() {
        let (sender, rx) = session_channel(4);
        drop(rx);

        assert!(sender.is_closed());
        assert!(!sender.try_deliver(ServerEvent::online("alice")));
    }
}
