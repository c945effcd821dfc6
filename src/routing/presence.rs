//! Presence notifications
//!
//! Whenever the registry gains or loses a binding, every bound session is
//! told twice: once with the typed presence event, once with a mirrored
//! system-text message for plain display. Both go through the router's
//! broadcast path. Rapid connect/disconnect flapping is not suppressed.

use super::event::ServerEvent;
use super::router::MessageRouter;

/// Emits Online/Offline events on registry membership changes
#[derive(Clone)]
pub struct PresenceNotifier {
    router: MessageRouter,
}

impl PresenceNotifier {
    /// Create a notifier that broadcasts through the given router
    pub fn new(router: MessageRouter) -> Self {
        Self { router }
    }

    /// Announce that an identity came online
    pub async fn notify_online(&self, identity: &str) {
        let delivered = self
            .router
            .broadcast_event(ServerEvent::online(identity))
            .await;
        self.router
            .broadcast_event(ServerEvent::system(format!("{} connected.", identity)))
            .await;

        tracing::info!(identity = %identity, delivered, "Presence: online");
    }

    /// Announce that an identity went offline
    pub async fn notify_offline(&self, identity: &str) {
        let delivered = self
            .router
            .broadcast_event(ServerEvent::offline(identity))
            .await;
        self.router
            .broadcast_event(ServerEvent::system(format!("{} disconnected.", identity)))
            .await;

        tracing::info!(identity = %identity, delivered, "Presence: offline");
    }
}
