//! Statistics and metrics for the relay

use std::sync::atomic::{AtomicU64, Ordering};

/// Live relay counters
///
/// Updated with relaxed atomics from every connection task.
#[derive(Debug, Default)]
pub struct RelayStats {
    connections_total: AtomicU64,
    relayed: AtomicU64,
    dropped_unknown_recipient: AtomicU64,
    dropped_link_closed: AtomicU64,
    dropped_queue_full: AtomicU64,
    dropped_malformed: AtomicU64,
    dropped_unknown_type: AtomicU64,
    peer_list_sent: AtomicU64,
    peer_list_failed: AtomicU64,
}

/// Point-in-time copy of [`RelayStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayStatsSnapshot {
    /// Peers ever registered
    pub connections_total: u64,
    /// Directed messages delivered to a recipient's link
    pub relayed: u64,
    /// Directed messages whose `to` was not registered
    pub dropped_unknown_recipient: u64,
    /// Directed messages whose recipient link was closed
    pub dropped_link_closed: u64,
    /// Directed messages whose recipient's outbound queue was full
    pub dropped_queue_full: u64,
    /// Frames that could not be decoded
    pub dropped_malformed: u64,
    /// Well-formed frames with an unhandled `type`
    pub dropped_unknown_type: u64,
    /// Peer-list notifications queued
    pub peer_list_sent: u64,
    /// Peer-list notifications that failed to queue
    pub peer_list_failed: u64,
}

impl RelayStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_connection(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_relayed(&self) {
        self.relayed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unknown_recipient(&self) {
        self.dropped_unknown_recipient.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_link_closed(&self) {
        self.dropped_link_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_queue_full(&self) {
        self.dropped_queue_full.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_malformed(&self) {
        self.dropped_malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unknown_type(&self) {
        self.dropped_unknown_type.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_peer_list(&self, delivered: bool) {
        if delivered {
            self.peer_list_sent.fetch_add(1, Ordering::Relaxed);
        } else {
            self.peer_list_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Read all counters
    pub fn snapshot(&self) -> RelayStatsSnapshot {
        RelayStatsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            relayed: self.relayed.load(Ordering::Relaxed),
            dropped_unknown_recipient: self.dropped_unknown_recipient.load(Ordering::Relaxed),
            dropped_link_closed: self.dropped_link_closed.load(Ordering::Relaxed),
            dropped_queue_full: self.dropped_queue_full.load(Ordering::Relaxed),
            dropped_malformed: self.dropped_malformed.load(Ordering::Relaxed),
            dropped_unknown_type: self.dropped_unknown_type.load(Ordering::Relaxed),
            peer_list_sent: self.peer_list_sent.load(Ordering::Relaxed),
            peer_list_failed: self.peer_list_failed.load(Ordering::Relaxed),
        }
    }
}

impl RelayStatsSnapshot {
    /// Total inbound frames that were dropped for any reason
    pub fn dropped(&self) -> u64 {
        self.dropped_unknown_recipient
            + self.dropped_link_closed
            + self.dropped_queue_full
            + self.dropped_malformed
            + self.dropped_unknown_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_stats_new() {
        let stats = RelayStats::new();
        assert_eq!(stats.snapshot(), RelayStatsSnapshot::default());
    }

    #[test]
    fn test_relay_stats_counts() {
        let stats = RelayStats::new();
        stats.record_connection();
        stats.record_connection();
        stats.record_relayed();
        stats.record_unknown_recipient();
        stats.record_malformed();
        stats.record_queue_full();
        stats.record_peer_list(true);
        stats.record_peer_list(false);

        let snap = stats.snapshot();
        assert_eq!(snap.connections_total, 2);
        assert_eq!(snap.relayed, 1);
        assert_eq!(snap.peer_list_sent, 1);
        assert_eq!(snap.peer_list_failed, 1);
        assert_eq!(snap.dropped_queue_full, 1);
        assert_eq!(snap.dropped(), 3);
    }
}
