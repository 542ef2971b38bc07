//! Presence broadcaster
//!
//! After every membership change each registered peer receives the current
//! member list minus itself. Enqueueing never waits, so a full or closed link
//! only loses its own notification. Failed peers are not removed here;
//! removal is driven by the transport's disconnect.
//!
//! Rounds are serialized: snapshot and enqueue happen under one lock, so the
//! last list queued to any peer always reflects the latest membership.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::protocol::PeerListNotice;
use crate::registry::{PeerId, PeerLink, PeerRegistry};
use crate::stats::RelayStats;

/// Pushes peer-list notifications
#[derive(Clone)]
pub struct PresenceBroadcaster {
    registry: Arc<PeerRegistry>,
    stats: Arc<RelayStats>,
    round: Arc<Mutex<()>>,
}

impl PresenceBroadcaster {
    pub fn new(registry: Arc<PeerRegistry>, stats: Arc<RelayStats>) -> Self {
        Self {
            registry,
            stats,
            round: Arc::new(Mutex::new(())),
        }
    }

    /// Send every registered peer its filtered peer list
    ///
    /// Returns how many notifications were queued successfully.
    pub async fn broadcast(&self) -> usize {
        let _round = self.round.lock().await;
        let members = self.registry.snapshot().await;
        let ids: Vec<&PeerId> = members.iter().map(|(id, _)| id).collect();

        let delivered = members
            .iter()
            .map(|(id, link)| {
                let notice = PeerListNotice::for_recipient(id, ids.iter().copied());
                self.deliver(id, link, notice)
            })
            .filter(|ok| *ok)
            .count();

        tracing::debug!(
            peers = members.len(),
            delivered = delivered,
            "Peer list broadcast"
        );

        delivered
    }

    /// Send one peer a fresh peer list
    ///
    /// Returns `false` if the peer is not registered or its link failed.
    pub async fn send_to(&self, recipient: &PeerId) -> bool {
        let _round = self.round.lock().await;
        let members = self.registry.snapshot().await;

        let Some((_, link)) = members.iter().find(|(id, _)| id == recipient) else {
            tracing::debug!(peer = %recipient, "Peer list requested by unregistered peer");
            return false;
        };

        let notice = PeerListNotice::for_recipient(recipient, members.iter().map(|(id, _)| id));
        self.deliver(recipient, link, notice)
    }

    fn deliver(&self, id: &PeerId, link: &PeerLink, notice: PeerListNotice<'_>) -> bool {
        let text = match notice.to_json() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(peer = %id, error = %e, "Failed to encode peer list");
                self.stats.record_peer_list(false);
                return false;
            }
        };

        match link.send(text) {
            Ok(()) => {
                self.stats.record_peer_list(true);
                true
            }
            Err(e) => {
                tracing::debug!(peer = %id, error = %e, "Peer list not delivered");
                self.stats.record_peer_list(false);
                false
            }
        }
    }
}
