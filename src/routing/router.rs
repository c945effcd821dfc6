//! Message routing and dispatch
//!
//! Stateless resolution logic: given a routing intent and the current
//! registry/index snapshots, work out the target sessions and deliver.
//! Delivery is fire-and-forget; a target whose queue is full or whose
//! session is mid-teardown simply drops the event.
//!
//! All inputs are validated before resolution. A validation failure drops
//! the send with a warning; it is never surfaced to the caller, because
//! there is no acknowledgment channel back to the sender.

use std::sync::Arc;

use bytes::Bytes;

use crate::registry::{GroupIndex, SessionRegistry};
use crate::session::{SessionHandle, SessionSender};
use crate::stats::RelayStats;

use super::event::ServerEvent;

/// Routes messages to sessions via the registry and group index
#[derive(Clone)]
pub struct MessageRouter {
    registry: Arc<SessionRegistry>,
    groups: Arc<GroupIndex>,
    stats: Arc<RelayStats>,
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl MessageRouter {
    /// Create a router over the given registry and group index
    pub fn new(
        registry: Arc<SessionRegistry>,
        groups: Arc<GroupIndex>,
        stats: Arc<RelayStats>,
    ) -> Self {
        Self {
            registry,
            groups,
            stats,
        }
    }

    /// Broadcast a text message to every bound session
    pub async fn route_broadcast(&self, from: &str, text: &str) {
        if is_blank(from) || is_blank(text) {
            tracing::warn!("Broadcast dropped: empty sender or message");
            return;
        }

        self.stats.message_routed();
        let delivered = self
            .broadcast_event(ServerEvent::message(from, text))
            .await;

        tracing::info!(from = %from, delivered, "Broadcast message routed");
    }

    /// Deliver a text message to the session currently bound to `to`
    ///
    /// An unknown target is a silent no-op: there is no error channel back
    /// to the sender, only the log.
    pub async fn route_unicast(&self, from: &str, to: &str, text: &str) {
        if is_blank(from) || is_blank(to) || is_blank(text) {
            tracing::warn!("Private message dropped: empty field");
            return;
        }

        self.stats.message_routed();

        let target = match self.registry.lookup(to).await {
            Some(handle) => handle,
            None => {
                tracing::warn!(from = %from, to = %to, "Private message target not online");
                return;
            }
        };

        let targets = match self.registry.sender_for(target).await {
            Some(sender) => vec![(target, sender)],
            None => Vec::new(),
        };

        let delivered = self.deliver(ServerEvent::private_message(from, text), targets);
        tracing::info!(from = %from, to = %to, delivered, "Private message routed");
    }

    /// Deliver a text message to every member of a group
    ///
    /// The sender is not excluded: if it is a member it receives its own
    /// message. Empty or unknown groups deliver to zero recipients.
    pub async fn route_group(&self, group: &str, from: &str, text: &str) {
        if is_blank(group) || is_blank(from) || is_blank(text) {
            tracing::warn!("Group message dropped: empty field");
            return;
        }

        self.stats.message_routed();

        let members = self.groups.members(group).await;
        let targets = self.resolve_handles(&members).await;

        let delivered = self.deliver(ServerEvent::group_message(group, from, text), targets);
        tracing::info!(
            group = %group,
            from = %from,
            members = members.len(),
            delivered,
            "Group message routed"
        );
    }

    /// Deliver a binary blob to one recipient, or to everyone
    ///
    /// With a recipient that resolves to a live session, this is a unicast;
    /// otherwise (no recipient given, or recipient not online) the blob is
    /// broadcast. An empty name or empty content drops the send.
    pub async fn route_blob(&self, name: &str, content: Bytes, recipient: Option<&str>) {
        if content.is_empty() {
            tracing::warn!("File dropped: empty content");
            return;
        }
        if is_blank(name) {
            tracing::warn!("File dropped: empty file name");
            return;
        }

        self.stats.message_routed();
        let event = ServerEvent::file(name, content);

        let target = match recipient.filter(|r| !is_blank(r)) {
            Some(r) => self.registry.lookup(r).await,
            None => None,
        };

        let delivered = match target {
            Some(handle) => {
                let targets = match self.registry.sender_for(handle).await {
                    Some(sender) => vec![(handle, sender)],
                    None => Vec::new(),
                };
                self.deliver(event, targets)
            }
            None => self.broadcast_event(event).await,
        };

        tracing::info!(file = %name, recipient = ?recipient, delivered, "File routed");
    }

    /// Send an event to every bound session, returning the delivery count
    ///
    /// Shared by the broadcast routes and the presence notifier.
    pub async fn broadcast_event(&self, event: ServerEvent) -> usize {
        let targets = self.registry.bound_sessions().await;
        self.deliver(event, targets)
    }

    async fn resolve_handles(
        &self,
        handles: &[SessionHandle],
    ) -> Vec<(SessionHandle, SessionSender)> {
        let mut targets = Vec::with_capacity(handles.len());
        for &handle in handles {
            // A member mid-teardown may already be gone from the registry
            if let Some(sender) = self.registry.sender_for(handle).await {
                targets.push((handle, sender));
            }
        }
        targets
    }

    fn deliver(
        &self,
        event: ServerEvent,
        targets: Vec<(SessionHandle, SessionSender)>,
    ) -> usize {
        let mut delivered = 0usize;
        for (handle, sender) in &targets {
            if sender.try_deliver(event.clone()) {
                delivered += 1;
            } else {
                tracing::debug!(
                    session_id = handle.id(),
                    event = event.kind(),
                    "Delivery dropped (queue full or session gone)"
                );
            }
        }

        self.stats.events_delivered(delivered as u64);
        self.stats
            .events_dropped((targets.len() - delivered) as u64);

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::session_channel;
    use tokio::sync::mpsc;

    struct Fixture {
        router: MessageRouter,
        registry: Arc<SessionRegistry>,
        groups: Arc<GroupIndex>,
        stats: Arc<RelayStats>,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(SessionRegistry::new());
        let groups = Arc::new(GroupIndex::new());
        let stats = Arc::new(RelayStats::new());
        let router = MessageRouter::new(
            Arc::clone(&registry),
            Arc::clone(&groups),
            Arc::clone(&stats),
        );
        Fixture {
            router,
            registry,
            groups,
            stats,
        }
    }

    async fn bind(fx: &Fixture, identity: &str, id: u64) -> mpsc::Receiver<ServerEvent> {
        let (sender, rx) = session_channel(16);
        fx.registry
            .bind(identity, SessionHandle::new(id), sender)
            .await
            .unwrap();
        rx
    }

    fn drain(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_bound() {
        let fx = fixture();
        let mut alice = bind(&fx, "alice", 1).await;
        let mut bob = bind(&fx, "bob", 2).await;

        fx.router.route_broadcast("alice", "hello").await;

        assert_eq!(drain(&mut alice), vec![ServerEvent::message("alice", "hello")]);
        assert_eq!(drain(&mut bob), vec![ServerEvent::message("alice", "hello")]);
    }

    #[tokio::test]
    async fn test_broadcast_validation_drops() {
        let fx = fixture();
        let mut alice = bind(&fx, "alice", 1).await;

        fx.router.route_broadcast("", "hello").await;
        fx.router.route_broadcast("alice", "   ").await;

        assert!(drain(&mut alice).is_empty());
        assert_eq!(fx.stats.snapshot().messages_routed, 0);
    }

    #[tokio::test]
    async fn test_unicast_only_target_receives() {
        let fx = fixture();
        let mut alice = bind(&fx, "alice", 1).await;
        let mut bob = bind(&fx, "bob", 2).await;

        fx.router.route_unicast("alice", "bob", "hi").await;

        assert!(drain(&mut alice).is_empty());
        assert_eq!(
            drain(&mut bob),
            vec![ServerEvent::private_message("alice", "hi")]
        );
    }

    #[tokio::test]
    async fn test_unicast_unknown_target_is_noop() {
        let fx = fixture();
        let mut alice = bind(&fx, "alice", 1).await;

        fx.router.route_unicast("alice", "nobody", "hi").await;

        assert!(drain(&mut alice).is_empty());
        assert_eq!(fx.stats.snapshot().events_delivered, 0);
    }

    #[tokio::test]
    async fn test_group_includes_sender() {
        let fx = fixture();
        let mut alice = bind(&fx, "alice", 1).await;
        let mut bob = bind(&fx, "bob", 2).await;
        let mut carol = bind(&fx, "carol", 3).await;

        fx.groups.join("room1", SessionHandle::new(1)).await.unwrap();
        fx.groups.join("room1", SessionHandle::new(2)).await.unwrap();

        fx.router.route_group("room1", "alice", "yo").await;

        let expected = ServerEvent::group_message("room1", "alice", "yo");
        assert_eq!(drain(&mut alice), vec![expected.clone()]);
        assert_eq!(drain(&mut bob), vec![expected]);
        // Not a member: nothing
        assert!(drain(&mut carol).is_empty());
    }

    #[tokio::test]
    async fn test_group_empty_or_unknown_delivers_zero() {
        let fx = fixture();
        let mut alice = bind(&fx, "alice", 1).await;

        fx.router.route_group("nowhere", "alice", "yo").await;

        assert!(drain(&mut alice).is_empty());
        // Routed (valid input), zero deliveries
        assert_eq!(fx.stats.snapshot().messages_routed, 1);
        assert_eq!(fx.stats.snapshot().events_delivered, 0);
    }

    #[tokio::test]
    async fn test_blob_unicast_to_recipient() {
        let fx = fixture();
        let mut alice = bind(&fx, "alice", 1).await;
        let mut bob = bind(&fx, "bob", 2).await;

        let content = Bytes::from_static(b"\x01\x02\x03");
        fx.router
            .route_blob("data.bin", content.clone(), Some("bob"))
            .await;

        assert!(drain(&mut alice).is_empty());
        assert_eq!(drain(&mut bob), vec![ServerEvent::file("data.bin", content)]);
    }

    #[tokio::test]
    async fn test_blob_without_recipient_broadcasts() {
        let fx = fixture();
        let mut alice = bind(&fx, "alice", 1).await;
        let mut bob = bind(&fx, "bob", 2).await;

        let content = Bytes::from_static(b"blob");
        fx.router.route_blob("data.bin", content.clone(), None).await;

        let expected = ServerEvent::file("data.bin", content);
        assert_eq!(drain(&mut alice), vec![expected.clone()]);
        assert_eq!(drain(&mut bob), vec![expected]);
    }

    #[tokio::test]
    async fn test_blob_unknown_recipient_falls_back_to_broadcast() {
        let fx = fixture();
        let mut alice = bind(&fx, "alice", 1).await;

        let content = Bytes::from_static(b"blob");
        fx.router
            .route_blob("data.bin", content.clone(), Some("nobody"))
            .await;

        assert_eq!(drain(&mut alice), vec![ServerEvent::file("data.bin", content)]);
    }

    #[tokio::test]
    async fn test_blob_validation_drops() {
        let fx = fixture();
        let mut alice = bind(&fx, "alice", 1).await;

        fx.router.route_blob("", Bytes::from_static(b"x"), None).await;
        fx.router.route_blob("data.bin", Bytes::new(), None).await;

        assert!(drain(&mut alice).is_empty());
        assert_eq!(fx.stats.snapshot().messages_routed, 0);
    }

    #[tokio::test]
    async fn test_full_queue_counts_as_drop() {
        let fx = fixture();

        let (sender, _rx) = session_channel(1);
        fx.registry
            .bind("slow", SessionHandle::new(1), sender)
            .await
            .unwrap();

        // First fills the queue, second drops
        fx.router.route_broadcast("slow", "one").await;
        fx.router.route_broadcast("slow", "two").await;

        let snap = fx.stats.snapshot();
        assert_eq!(snap.events_delivered, 1);
        assert_eq!(snap.events_dropped, 1);
    }
}
