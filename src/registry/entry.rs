//! Peer identity and entry types
//!
//! This module defines the key used to address peers and the per-peer state
//! stored in the registry.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::link::PeerLink;

/// Opaque identity of one live connection
///
/// Assigned by the transport when the connection is accepted. It is both the
/// relay address (`to`) and the token listed in peer-list notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// Create an identity from an existing string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identity (UUID v4)
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Entry for a single connected peer
#[derive(Debug, Clone)]
pub struct PeerEntry {
    /// Outbound send capability of the peer's connection
    pub link: PeerLink,

    /// Registration sequence number, defines snapshot order
    pub seq: u64,

    /// When the peer was registered
    pub connected_at: Instant,
}

impl PeerEntry {
    pub(super) fn new(link: PeerLink, seq: u64) -> Self {
        Self {
            link,
            seq,
            connected_at: Instant::now(),
        }
    }
}
