//! Group membership index
//!
//! Maps group names to the set of session handles currently joined, with a
//! reverse handle→groups index so disconnect cleanup touches only the groups
//! a session actually belongs to. Both directions live under one `RwLock`.
//!
//! Groups are created implicitly on first join and dropped as soon as their
//! membership empties; there is no explicit group deletion.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use crate::session::SessionHandle;

use super::error::RegistryError;

#[derive(Default)]
struct Inner {
    /// Group name → member handles
    members: HashMap<String, HashSet<SessionHandle>>,
    /// Handle → groups it belongs to (for disconnect cleanup)
    by_session: HashMap<SessionHandle, HashSet<String>>,
}

/// Index of group memberships, keyed on session handle
#[derive(Default)]
pub struct GroupIndex {
    inner: RwLock<Inner>,
}

impl GroupIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handle to a group, creating the group on first join
    ///
    /// Fails with [`RegistryError::InvalidGroupName`] on an empty or
    /// whitespace-only name. Idempotent: joining twice has no further effect.
    pub async fn join(&self, group: &str, handle: SessionHandle) -> Result<(), RegistryError> {
        if group.trim().is_empty() {
            return Err(RegistryError::InvalidGroupName);
        }

        let mut inner = self.inner.write().await;

        let added = inner
            .members
            .entry(group.to_string())
            .or_default()
            .insert(handle);
        inner
            .by_session
            .entry(handle)
            .or_default()
            .insert(group.to_string());

        if added {
            tracing::info!(group = %group, session_id = handle.id(), "Joined group");
        }

        Ok(())
    }

    /// Remove a handle from a group
    ///
    /// Idempotent: no error if the handle was not a member or the group does
    /// not exist. An emptied group is dropped.
    pub async fn leave(&self, group: &str, handle: SessionHandle) {
        let mut inner = self.inner.write().await;

        let removed = match inner.members.get_mut(group) {
            Some(set) => {
                let removed = set.remove(&handle);
                if set.is_empty() {
                    inner.members.remove(group);
                }
                removed
            }
            None => false,
        };

        if let Some(groups) = inner.by_session.get_mut(&handle) {
            groups.remove(group);
            if groups.is_empty() {
                inner.by_session.remove(&handle);
            }
        }

        if removed {
            tracing::info!(group = %group, session_id = handle.id(), "Left group");
        }
    }

    /// Snapshot of a group's current membership
    ///
    /// An unknown group is an empty snapshot, not an error.
    pub async fn members(&self, group: &str) -> Vec<SessionHandle> {
        self.inner
            .read()
            .await
            .members
            .get(group)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Remove a handle from every group it belongs to
    ///
    /// Called on disconnect; runs under a single lock acquisition so routing
    /// never observes a half-vacated membership.
    pub async fn remove_session_everywhere(&self, handle: SessionHandle) {
        let mut inner = self.inner.write().await;

        let Some(groups) = inner.by_session.remove(&handle) else {
            return;
        };

        for group in &groups {
            if let Some(set) = inner.members.get_mut(group) {
                set.remove(&handle);
                if set.is_empty() {
                    inner.members.remove(group);
                }
            }
        }

        tracing::debug!(
            session_id = handle.id(),
            groups = groups.len(),
            "Session removed from all groups"
        );
    }

    /// Number of groups with at least one member
    pub async fn group_count(&self) -> usize {
        self.inner.read().await.members.len()
    }

    /// Number of members in a group (0 for unknown groups)
    pub async fn member_count(&self, group: &str) -> usize {
        self.inner
            .read()
            .await
            .members
            .get(group)
            .map(HashSet::len)
            .unwrap_or(0)
    }
}
