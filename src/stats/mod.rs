//! Relay statistics
//!
//! Process-wide counters on atomics; cheap enough to update from every
//! routing call. Snapshot via [`RelayStats::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one relay instance
#[derive(Debug, Default)]
pub struct RelayStats {
    /// Total sessions ever bound
    total_sessions: AtomicU64,
    /// Currently bound sessions
    active_sessions: AtomicU64,
    /// Routing calls that passed validation
    messages_routed: AtomicU64,
    /// Events accepted by a session queue
    events_delivered: AtomicU64,
    /// Events dropped at delivery (full queue or gone session)
    events_dropped: AtomicU64,
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total_sessions: u64,
    pub active_sessions: u64,
    pub messages_routed: u64,
    pub events_delivered: u64,
    pub events_dropped: u64,
}

impl RelayStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn session_bound(&self) {
        self.total_sessions.fetch_add(1, Ordering::Relaxed);
        self.active_sessions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn session_unbound(&self) {
        self.active_sessions.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn message_routed(&self) {
        self.messages_routed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn events_delivered(&self, count: u64) {
        self.events_delivered.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn events_dropped(&self, count: u64) {
        self.events_dropped.fetch_add(count, Ordering::Relaxed);
    }

    /// Take a snapshot of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_sessions: self.total_sessions.load(Ordering::Relaxed),
            active_sessions: self.active_sessions.load(Ordering::Relaxed),
            messages_routed: self.messages_routed.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_start_zeroed() {
        let stats = RelayStats::new();
        let snap = stats.snapshot();

        assert_eq!(snap.total_sessions, 0);
        assert_eq!(snap.active_sessions, 0);
        assert_eq!(snap.messages_routed, 0);
        assert_eq!(snap.events_delivered, 0);
        assert_eq!(snap.events_dropped, 0);
    }

    #[test]
    fn test_session_counters() {
        let stats = RelayStats::new();

        stats.session_bound();
        stats.session_bound();
        stats.session_unbound();

        let snap = stats.snapshot();
        assert_eq!(snap.total_sessions, 2);
        assert_eq!(snap.active_sessions, 1);
    }

    #[test]
    fn test_delivery_counters() {
        let stats = RelayStats::new();

        stats.message_routed();
        stats.events_delivered(3);
        stats.events_dropped(1);

        let snap = stats.snapshot();
        assert_eq!(snap.messages_routed, 1);
        assert_eq!(snap.events_delivered, 3);
        assert_eq!(snap.events_dropped, 1);
    }
}
