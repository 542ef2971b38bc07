//! Peer registry implementation
//!
//! The central registry that tracks every connected peer and hands out
//! cloned links for relay and presence broadcast.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::entry::{PeerEntry, PeerId};
use super::error::RegistryError;
use super::link::PeerLink;

#[derive(Default)]
struct Members {
    peers: HashMap<PeerId, PeerEntry>,
    next_seq: u64,
}

/// Registry of all live peer connections
///
/// Thread-safe via `RwLock`. Lookups from the router take the read lock
/// concurrently; register, unregister and snapshot are serialized through
/// the write/read lock and never hold it across a send.
pub struct PeerRegistry {
    members: RwLock<Members>,
}

impl PeerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            members: RwLock::new(Members::default()),
        }
    }

    /// Register a peer's link
    ///
    /// Returns an error if the identity is already present. The existing
    /// entry is left untouched in that case.
    pub async fn register(&self, id: PeerId, link: PeerLink) -> Result<(), RegistryError> {
        let mut members = self.members.write().await;

        if members.peers.contains_key(&id) {
            tracing::warn!(peer = %id, "Duplicate peer identity rejected");
            return Err(RegistryError::DuplicateIdentity(id));
        }

        let seq = members.next_seq;
        members.next_seq += 1;
        members.peers.insert(id.clone(), PeerEntry::new(link, seq));

        tracing::info!(peer = %id, peers = members.peers.len(), "Peer registered");

        Ok(())
    }

    /// Remove a peer
    ///
    /// Returns `true` if the peer was present. Removing an absent peer is a
    /// no-op, since disconnect notifications may race with other cleanup.
    pub async fn unregister(&self, id: &PeerId) -> bool {
        let mut members = self.members.write().await;

        match members.peers.remove(id) {
            Some(entry) => {
                tracing::info!(
                    peer = %id,
                    peers = members.peers.len(),
                    connected_secs = entry.connected_at.elapsed().as_secs(),
                    "Peer unregistered"
                );
                true
            }
            None => {
                tracing::debug!(peer = %id, "Unregister for absent peer ignored");
                false
            }
        }
    }

    /// Look up the link of a registered peer
    pub async fn lookup(&self, id: &PeerId) -> Option<PeerLink> {
        let members = self.members.read().await;
        members.peers.get(id).map(|entry| entry.link.clone())
    }

    /// Point-in-time copy of current membership, in registration order
    pub async fn snapshot(&self) -> Vec<(PeerId, PeerLink)> {
        let members = self.members.read().await;

        let mut entries: Vec<(u64, PeerId, PeerLink)> = members
            .peers
            .iter()
            .map(|(id, entry)| (entry.seq, id.clone(), entry.link.clone()))
            .collect();
        drop(members);

        entries.sort_unstable_by_key(|(seq, _, _)| *seq);
        entries
            .into_iter()
            .map(|(_, id, link)| (id, link))
            .collect()
    }

    /// Identities of all registered peers, in registration order
    pub async fn peer_ids(&self) -> Vec<PeerId> {
        self.snapshot().await.into_iter().map(|(id, _)| id).collect()
    }

    /// Check whether a peer is registered
    pub async fn contains(&self, id: &PeerId) -> bool {
        self.members.read().await.peers.contains_key(id)
    }

    /// Get the number of registered peers
    pub async fn len(&self) -> usize {
        self.members.read().await.peers.len()
    }

    /// Check whether no peers are registered
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio_test::{assert_err, assert_ok};

    use super::*;

    fn link() -> (PeerLink, tokio::sync::mpsc::Receiver<String>) {
        PeerLink::channel(8)
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let registry = PeerRegistry::new();
        let (a, _rx) = link();

        assert_ok!(registry.register(PeerId::from("a"), a).await);

        assert!(registry.contains(&PeerId::from("a")).await);
        assert!(registry.lookup(&PeerId::from("a")).await.is_some());
        assert!(registry.lookup(&PeerId::from("b")).await.is_none());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_keeps_existing_entry() {
        let registry = PeerRegistry::new();
        let (first, mut first_rx) = link();
        let (second, _second_rx) = link();

        registry.register(PeerId::from("a"), first).await.unwrap();
        let err = assert_err!(registry.register(PeerId::from("a"), second).await);
        assert_eq!(err, RegistryError::DuplicateIdentity(PeerId::from("a")));

        // The stored link still points at the first connection
        let stored = registry.lookup(&PeerId::from("a")).await.unwrap();
        stored.send("ping".to_string()).unwrap();
        assert_eq!(first_rx.recv().await.as_deref(), Some("ping"));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let registry = PeerRegistry::new();
        let (a, _rx) = link();
        registry.register(PeerId::from("a"), a).await.unwrap();

        assert!(registry.unregister(&PeerId::from("a")).await);
        assert!(!registry.unregister(&PeerId::from("a")).await);
        assert!(registry.lookup(&PeerId::from("a")).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_snapshot_preserves_registration_order() {
        let registry = PeerRegistry::new();
        let mut receivers = Vec::new();

        for id in ["c", "a", "d", "b"] {
            let (l, rx) = link();
            receivers.push(rx);
            registry.register(PeerId::from(id), l).await.unwrap();
        }
        registry.unregister(&PeerId::from("d")).await;

        let ids = registry.peer_ids().await;
        assert_eq!(
            ids,
            vec![PeerId::from("c"), PeerId::from("a"), PeerId::from("b")]
        );
    }

    #[tokio::test]
    async fn test_reregister_after_unregister_moves_to_end() {
        let registry = PeerRegistry::new();
        let (a, _a_rx) = link();
        let (b, _b_rx) = link();
        let (a2, _a2_rx) = link();

        registry.register(PeerId::from("a"), a).await.unwrap();
        registry.register(PeerId::from("b"), b).await.unwrap();
        registry.unregister(&PeerId::from("a")).await;
        registry.register(PeerId::from("a"), a2).await.unwrap();

        assert_eq!(
            registry.peer_ids().await,
            vec![PeerId::from("b"), PeerId::from("a")]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_connect_disconnect() {
        let registry = Arc::new(PeerRegistry::new());
        let mut tasks = Vec::new();

        for i in 0..200 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                let id = PeerId::new(format!("peer-{}", i));
                let (l, rx) = PeerLink::channel(1);
                registry.register(id.clone(), l).await.unwrap();
                tokio::task::yield_now().await;
                // Every third peer stays connected
                if i % 3 != 0 {
                    assert!(registry.unregister(&id).await);
                    assert!(!registry.unregister(&id).await);
                }
                rx
            }));
        }

        let mut receivers = Vec::new();
        for task in tasks {
            receivers.push(task.await.unwrap());
        }

        let mut ids = registry.peer_ids().await;
        ids.sort();
        let mut expected: Vec<PeerId> = (0..200)
            .filter(|i| i % 3 == 0)
            .map(|i| PeerId::new(format!("peer-{}", i)))
            .collect();
        expected.sort();

        assert_eq!(ids, expected);
    }
}
