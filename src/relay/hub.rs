//! Transport-facing relay surface
//!
//! One hub per server instance. The transport reports each connection's
//! lifecycle through [`SignalingHub::on_connect`],
//! [`SignalingHub::on_message`] and [`SignalingHub::on_disconnect`].

use std::sync::Arc;

use super::broadcaster::PresenceBroadcaster;
use super::config::RelayConfig;
use super::router::{MessageRouter, RouteOutcome};
use crate::registry::{PeerId, PeerLink, PeerRegistry, RegistryError};
use crate::stats::{RelayStats, RelayStatsSnapshot};

/// Registry, router and broadcaster wired together
pub struct SignalingHub {
    registry: Arc<PeerRegistry>,
    broadcaster: PresenceBroadcaster,
    router: MessageRouter,
    stats: Arc<RelayStats>,
}

impl SignalingHub {
    /// Create a hub with default relay behavior
    pub fn new() -> Self {
        Self::with_config(RelayConfig::default())
    }

    /// Create a hub with custom relay behavior
    pub fn with_config(config: RelayConfig) -> Self {
        let registry = Arc::new(PeerRegistry::new());
        let stats = Arc::new(RelayStats::new());
        let broadcaster = PresenceBroadcaster::new(Arc::clone(&registry), Arc::clone(&stats));
        let router = MessageRouter::new(
            Arc::clone(&registry),
            broadcaster.clone(),
            Arc::clone(&stats),
            config,
        );

        Self {
            registry,
            broadcaster,
            router,
            stats,
        }
    }

    /// Get a reference to the peer registry
    pub fn registry(&self) -> &Arc<PeerRegistry> {
        &self.registry
    }

    /// Current relay counters
    pub fn stats(&self) -> RelayStatsSnapshot {
        self.stats.snapshot()
    }

    /// A connection was accepted
    ///
    /// Registers the peer and pushes fresh peer lists to every member,
    /// the newcomer included. A duplicate identity is rejected without a
    /// broadcast.
    pub async fn on_connect(&self, id: PeerId, link: PeerLink) -> Result<(), RegistryError> {
        self.registry.register(id, link).await?;
        self.stats.record_connection();
        self.broadcaster.broadcast().await;
        Ok(())
    }

    /// A text frame arrived from `from`
    pub async fn on_message(&self, from: &PeerId, text: &str) -> RouteOutcome {
        tracing::trace!(peer = %from, frame = text, "Inbound frame");
        self.router.route(from, text).await
    }

    /// A connection closed
    ///
    /// Returns `true` if the peer was registered. Repeated notifications for
    /// the same identity are no-ops and do not broadcast.
    pub async fn on_disconnect(&self, id: &PeerId) -> bool {
        if !self.registry.unregister(id).await {
            return false;
        }
        self.broadcaster.broadcast().await;
        true
    }
}

impl Default for SignalingHub {
    fn default() -> Self {
        Self::new()
    }
}
