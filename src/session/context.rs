//! Handler context
//!
//! Context passed to handler callbacks describing one signaling session.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crate::registry::PeerId;

/// Context passed to [`SignalingHandler`](crate::server::SignalingHandler) callbacks
///
/// Read-only view of the session; the relay owns all mutable state.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Unique session number, for logs
    pub session_id: u64,

    /// Identity the peer is addressed by
    pub peer_id: PeerId,

    /// Remote socket address
    pub peer_addr: SocketAddr,

    /// `Origin` header of the upgrade request, if any
    pub origin: Option<String>,

    /// When the WebSocket upgrade completed
    pub connected_at: Instant,
}

impl SessionContext {
    /// Create a new context
    pub fn new(
        session_id: u64,
        peer_id: PeerId,
        peer_addr: SocketAddr,
        origin: Option<String>,
    ) -> Self {
        Self {
            session_id,
            peer_id,
            peer_addr,
            origin,
            connected_at: Instant::now(),
        }
    }

    /// Get the origin header if available
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Time since the session was established
    pub fn duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
