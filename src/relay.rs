//! Relay facade
//!
//! One [`Relay`] instance owns the session registry, group index, router,
//! presence notifier, and stats for a single relay. Construct one per server
//! (or per test): there is no process-wide singleton, so isolated instances
//! can coexist.
//!
//! The transport calls [`Relay::on_connect`] / [`Relay::on_disconnect`] for
//! lifecycle and the `send_*` / group operations for client requests. Send
//! operations never return errors: validation failures and unknown targets
//! degrade to logged no-ops, because the wire protocol has no acknowledgment
//! channel.

use std::sync::Arc;

use bytes::Bytes;

use crate::registry::{GroupIndex, RegistryError, SessionRegistry};
use crate::routing::{MessageRouter, PresenceNotifier};
use crate::session::{SessionHandle, SessionSender};
use crate::stats::{RelayStats, StatsSnapshot};

/// The session/identity registry and message-routing engine
pub struct Relay {
    registry: Arc<SessionRegistry>,
    groups: Arc<GroupIndex>,
    router: MessageRouter,
    presence: PresenceNotifier,
    stats: Arc<RelayStats>,
}

impl Relay {
    /// Create a relay with empty registries
    pub fn new() -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let groups = Arc::new(GroupIndex::new());
        let stats = Arc::new(RelayStats::new());
        let router = MessageRouter::new(
            Arc::clone(&registry),
            Arc::clone(&groups),
            Arc::clone(&stats),
        );
        let presence = PresenceNotifier::new(router.clone());

        Self {
            registry,
            groups,
            router,
            presence,
            stats,
        }
    }

    /// Register a connecting session under the identity it supplied
    ///
    /// On success the session becomes addressable and everyone (including
    /// the new session) receives the Online presence pair. On
    /// [`RegistryError::InvalidIdentity`] nothing is registered and no
    /// presence is emitted; the caller decides whether to close the channel.
    pub async fn on_connect(
        &self,
        handle: SessionHandle,
        identity: &str,
        sender: SessionSender,
    ) -> Result<(), RegistryError> {
        self.registry.bind(identity, handle, sender).await?;
        self.stats.session_bound();
        self.presence.notify_online(identity).await;
        Ok(())
    }

    /// Unwind a session after its connection is gone
    ///
    /// Removes the registry binding and every group membership, then emits
    /// the Offline presence pair, but only if an identity was actually
    /// released, so repeated calls (or teardown of a never-bound session)
    /// are no-ops.
    pub async fn on_disconnect(&self, handle: SessionHandle) {
        let released = self.registry.unbind(handle).await;
        self.groups.remove_session_everywhere(handle).await;

        if let Some(identity) = released {
            self.stats.session_unbound();
            self.presence.notify_offline(&identity).await;
        }
    }

    /// Broadcast a text message to every bound session
    pub async fn send_message(&self, sender: &str, text: &str) {
        self.router.route_broadcast(sender, text).await;
    }

    /// Deliver a text message to one identity
    pub async fn send_private_message(&self, sender: &str, target: &str, text: &str) {
        self.router.route_unicast(sender, target, text).await;
    }

    /// Deliver a text message to a group
    pub async fn send_group_message(&self, group: &str, sender: &str, text: &str) {
        self.router.route_group(group, sender, text).await;
    }

    /// Add the calling session to a group
    ///
    /// An invalid group name drops the request with a warning, matching the
    /// send operations: group membership calls carry no reply either.
    pub async fn join_group(&self, group: &str, handle: SessionHandle) {
        if let Err(e) = self.groups.join(group, handle).await {
            tracing::warn!(session_id = handle.id(), error = %e, "Join group dropped");
        }
    }

    /// Remove the calling session from a group
    pub async fn leave_group(&self, group: &str, handle: SessionHandle) {
        self.groups.leave(group, handle).await;
    }

    /// Deliver a binary blob to one identity, or broadcast it
    pub async fn send_file(&self, name: &str, content: Bytes, recipient: Option<&str>) {
        self.router.route_blob(name, content, recipient).await;
    }

    /// The session registry backing this relay
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// The group index backing this relay
    pub fn groups(&self) -> &Arc<GroupIndex> {
        &self.groups
    }

    /// Snapshot of this relay's counters
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}
