//! Session registry implementation
//!
//! The registry is the single source of truth for "who is online": a
//! bidirectional mapping between identities and live session handles, plus
//! the delivery channel for each bound session.
//!
//! Both directions live under one `RwLock` so a reader can never observe the
//! identity→handle side updated without the handle→identity side (or vice
//! versa).

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::session::{SessionHandle, SessionSender};

use super::error::RegistryError;

/// A bound session: its identity and its delivery channel
struct BoundSession {
    identity: String,
    sender: SessionSender,
}

#[derive(Default)]
struct Inner {
    /// Identity → current handle (last bind wins)
    by_identity: HashMap<String, SessionHandle>,
    /// Handle → identity + delivery channel
    by_handle: HashMap<SessionHandle, BoundSession>,
}

/// Central registry of bound sessions
///
/// Thread-safe via `RwLock`. Read-heavy workloads (target resolution,
/// broadcast snapshots) benefit from the concurrent read access.
#[derive(Default)]
pub struct SessionRegistry {
    inner: RwLock<Inner>,
}

impl SessionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an identity to a live session handle
    ///
    /// Fails with [`RegistryError::InvalidIdentity`] if the identity is empty
    /// or whitespace-only. If another live handle already holds the identity,
    /// the new binding supersedes it in the identity→handle direction (last
    /// bind wins); the prior session is not disconnected, it merely stops
    /// being addressable by that identity.
    pub async fn bind(
        &self,
        identity: &str,
        handle: SessionHandle,
        sender: SessionSender,
    ) -> Result<(), RegistryError> {
        if identity.trim().is_empty() {
            return Err(RegistryError::InvalidIdentity);
        }

        let mut inner = self.inner.write().await;

        let superseded = inner.by_identity.insert(identity.to_string(), handle);
        let previous = inner.by_handle.insert(
            handle,
            BoundSession {
                identity: identity.to_string(),
                sender,
            },
        );

        // A handle rebound under a new identity must release its old one,
        // or the old name would keep resolving to this handle
        if let Some(prev) = previous {
            if prev.identity != identity && inner.by_identity.get(&prev.identity) == Some(&handle)
            {
                inner.by_identity.remove(&prev.identity);
            }
        }

        match superseded {
            Some(prior) if prior != handle => {
                tracing::info!(
                    identity = %identity,
                    session_id = handle.id(),
                    superseded_session_id = prior.id(),
                    "Identity bound (superseding prior session)"
                );
            }
            _ => {
                tracing::info!(
                    identity = %identity,
                    session_id = handle.id(),
                    "Identity bound"
                );
            }
        }

        Ok(())
    }

    /// Remove a handle's binding, returning the identity it held
    ///
    /// No-op (returns `None`) if the handle was never bound or was already
    /// removed. The identity→handle direction is only cleared when it still
    /// points at this handle, so unbinding a superseded session does not
    /// steal the identity from its current owner.
    pub async fn unbind(&self, handle: SessionHandle) -> Option<String> {
        let mut inner = self.inner.write().await;

        let bound = inner.by_handle.remove(&handle)?;

        if inner.by_identity.get(&bound.identity) == Some(&handle) {
            inner.by_identity.remove(&bound.identity);
        }

        tracing::info!(
            identity = %bound.identity,
            session_id = handle.id(),
            "Identity unbound"
        );

        Some(bound.identity)
    }

    /// Resolve an identity to its current handle
    pub async fn lookup(&self, identity: &str) -> Option<SessionHandle> {
        self.inner.read().await.by_identity.get(identity).copied()
    }

    /// Resolve a handle back to the identity it holds
    ///
    /// Used at disconnect time to discover which identity a dying session
    /// owned.
    pub async fn reverse_lookup(&self, handle: SessionHandle) -> Option<String> {
        self.inner
            .read()
            .await
            .by_handle
            .get(&handle)
            .map(|bound| bound.identity.clone())
    }

    /// Delivery channel for a bound handle
    pub async fn sender_for(&self, handle: SessionHandle) -> Option<SessionSender> {
        self.inner
            .read()
            .await
            .by_handle
            .get(&handle)
            .map(|bound| bound.sender.clone())
    }

    /// Snapshot of every bound session's delivery channel
    ///
    /// This is the broadcast target set; delivery order across the snapshot
    /// is unspecified.
    pub async fn bound_sessions(&self) -> Vec<(SessionHandle, SessionSender)> {
        self.inner
            .read()
            .await
            .by_handle
            .iter()
            .map(|(handle, bound)| (*handle, bound.sender.clone()))
            .collect()
    }

    /// Number of bound sessions
    pub async fn session_count(&self) -> usize {
        self.inner.read().await.by_handle.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::session_channel;

    // Registry tests never deliver, so the receiver half can be dropped.
    fn sender() -> SessionSender {
        let (tx, _rx) = session_channel(16);
        tx
    }

    #[tokio::test]
    async fn test_bind_and_lookup() {
        let registry = SessionRegistry::new();
        let handle = SessionHandle::new(1);

        registry.bind("alice", handle, sender()).await.unwrap();

        assert_eq!(registry.lookup("alice").await, Some(handle));
        assert_eq!(
            registry.reverse_lookup(handle).await.as_deref(),
            Some("alice")
        );
        assert_eq!(registry.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_bind_rejects_blank_identity() {
        let registry = SessionRegistry::new();

        let result = registry.bind("", SessionHandle::new(1), sender()).await;
        assert_eq!(result, Err(RegistryError::InvalidIdentity));

        let result = registry.bind("   ", SessionHandle::new(2), sender()).await;
        assert_eq!(result, Err(RegistryError::InvalidIdentity));

        assert_eq!(registry.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_last_bind_wins() {
        let registry = SessionRegistry::new();
        let h1 = SessionHandle::new(1);
        let h2 = SessionHandle::new(2);

        registry.bind("alice", h1, sender()).await.unwrap();
        registry.bind("alice", h2, sender()).await.unwrap();

        // The newer handle owns the identity
        assert_eq!(registry.lookup("alice").await, Some(h2));
        // The superseded session is still live, just unaddressable by name
        assert_eq!(registry.reverse_lookup(h1).await.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_unbind_superseded_handle_keeps_current_binding() {
        let registry = SessionRegistry::new();
        let h1 = SessionHandle::new(1);
        let h2 = SessionHandle::new(2);

        registry.bind("alice", h1, sender()).await.unwrap();
        registry.bind("alice", h2, sender()).await.unwrap();

        // Old session disconnects; the identity still resolves to the new one
        assert_eq!(registry.unbind(h1).await.as_deref(), Some("alice"));
        assert_eq!(registry.lookup("alice").await, Some(h2));
    }

    #[tokio::test]
    async fn test_unbind_unknown_is_noop() {
        let registry = SessionRegistry::new();

        assert_eq!(registry.unbind(SessionHandle::new(99)).await, None);
    }

    #[tokio::test]
    async fn test_unbind_is_idempotent() {
        let registry = SessionRegistry::new();
        let handle = SessionHandle::new(1);

        registry.bind("alice", handle, sender()).await.unwrap();

        assert_eq!(registry.unbind(handle).await.as_deref(), Some("alice"));
        assert_eq!(registry.unbind(handle).await, None);
        assert_eq!(registry.lookup("alice").await, None);
    }

    #[tokio::test]
    async fn test_mapping_consistency() {
        let registry = SessionRegistry::new();
        let h1 = SessionHandle::new(1);
        let h2 = SessionHandle::new(2);

        registry.bind("alice", h1, sender()).await.unwrap();
        registry.bind("bob", h2, sender()).await.unwrap();
        registry.unbind(h1).await;

        // lookup(identity) == h iff reverse_lookup(h) == identity
        assert_eq!(registry.lookup("alice").await, None);
        assert_eq!(registry.reverse_lookup(h1).await, None);
        assert_eq!(registry.lookup("bob").await, Some(h2));
        assert_eq!(registry.reverse_lookup(h2).await.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn test_rebind_handle_releases_old_identity() {
        let registry = SessionRegistry::new();
        let handle = SessionHandle::new(1);

        registry.bind("alice", handle, sender()).await.unwrap();
        registry.bind("bob", handle, sender()).await.unwrap();

        // The old name no longer resolves to the rebound handle
        assert_eq!(registry.lookup("alice").await, None);
        assert_eq!(registry.lookup("bob").await, Some(handle));
        assert_eq!(registry.reverse_lookup(handle).await.as_deref(), Some("bob"));
        assert_eq!(registry.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_rebind_handle_leaves_superseding_binding_alone() {
        let registry = SessionRegistry::new();
        let h1 = SessionHandle::new(1);
        let h2 = SessionHandle::new(2);

        registry.bind("alice", h1, sender()).await.unwrap();
        // Another session takes the name, then the first handle rebinds
        registry.bind("alice", h2, sender()).await.unwrap();
        registry.bind("carol", h1, sender()).await.unwrap();

        // "alice" still belongs to its current owner
        assert_eq!(registry.lookup("alice").await, Some(h2));
        assert_eq!(registry.lookup("carol").await, Some(h1));
    }

    #[tokio::test]
    async fn test_bound_sessions_snapshot() {
        let registry = SessionRegistry::new();

        registry
            .bind("alice", SessionHandle::new(1), sender())
            .await
            .unwrap();
        registry
            .bind("bob", SessionHandle::new(2), sender())
            .await
            .unwrap();

        let snapshot = registry.bound_sessions().await;
        assert_eq!(snapshot.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_bind_unbind() {
        use std::sync::Arc;

        let registry = Arc::new(SessionRegistry::new());
        let mut tasks = Vec::new();

        for i in 0..32u64 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                let handle = SessionHandle::new(i);
                let identity = format!("user-{}", i);
                registry.bind(&identity, handle, sender()).await.unwrap();
                assert_eq!(registry.lookup(&identity).await, Some(handle));
                if i % 2 == 0 {
                    assert_eq!(registry.unbind(handle).await, Some(identity));
                }
            }));
        }

        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(registry.session_count().await, 16);
    }
}
