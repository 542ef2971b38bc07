//! Message router
//!
//! Stateless dispatch of one inbound frame:
//!
//! ```text
//! Received ──decode──► Parsed ──┬── offer/answer/ice-candidate ──► relay to `to`
//!     │                         ├── peer-list ──────────────────► reply to sender
//!     │                         └── unknown type ───────────────► Dropped
//!     └── malformed ────────────────────────────────────────────► Dropped
//! ```
//!
//! Nothing is ever returned to the transport as an error.

use std::sync::Arc;

use super::broadcaster::PresenceBroadcaster;
use super::config::RelayConfig;
use crate::error::SendError;
use crate::protocol::{DirectedSignal, RecipientUnavailable, RelayedSignal, Signal, SignalKind};
use crate::registry::{PeerId, PeerRegistry};
use crate::stats::RelayStats;

/// What happened to one inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Forwarded to its single recipient
    Relayed,
    /// Peer list sent back to the requester
    PeerListSent,
    /// Peer list could not be delivered to the requester
    PeerListFailed,
    /// Target identity not registered
    UnknownRecipient,
    /// Target registered but its link is closed
    LinkClosed,
    /// Target's outbound queue is full
    QueueFull,
    /// Frame could not be decoded
    Malformed,
    /// Unhandled message type
    UnknownType,
}

impl RouteOutcome {
    /// Whether the frame was dropped without any delivery
    pub fn is_dropped(&self) -> bool {
        !matches!(self, RouteOutcome::Relayed | RouteOutcome::PeerListSent)
    }
}

/// Dispatches decoded signals
#[derive(Clone)]
pub struct MessageRouter {
    registry: Arc<PeerRegistry>,
    broadcaster: PresenceBroadcaster,
    stats: Arc<RelayStats>,
    config: RelayConfig,
}

impl MessageRouter {
    pub fn new(
        registry: Arc<PeerRegistry>,
        broadcaster: PresenceBroadcaster,
        stats: Arc<RelayStats>,
        config: RelayConfig,
    ) -> Self {
        Self {
            registry,
            broadcaster,
            stats,
            config,
        }
    }

    /// Decode and dispatch one text frame sent by `from`
    pub async fn route(&self, from: &PeerId, text: &str) -> RouteOutcome {
        match Signal::decode(text) {
            Ok(signal) => self.dispatch(from, signal).await,
            Err(e) => {
                tracing::debug!(peer = %from, error = %e, "Dropping malformed frame");
                self.stats.record_malformed();
                RouteOutcome::Malformed
            }
        }
    }

    /// Dispatch an already decoded signal
    pub async fn dispatch(&self, from: &PeerId, signal: Signal) -> RouteOutcome {
        match signal {
            Signal::Offer(directed) => self.relay(from, SignalKind::Offer, directed).await,
            Signal::Answer(directed) => self.relay(from, SignalKind::Answer, directed).await,
            Signal::IceCandidate(directed) => {
                self.relay(from, SignalKind::IceCandidate, directed).await
            }
            Signal::PeerListRequest => {
                if self.broadcaster.send_to(from).await {
                    RouteOutcome::PeerListSent
                } else {
                    RouteOutcome::PeerListFailed
                }
            }
            Signal::Unknown(ty) => {
                tracing::debug!(peer = %from, message_type = %ty, "Dropping unknown message type");
                self.stats.record_unknown_type();
                RouteOutcome::UnknownType
            }
        }
    }

    async fn relay(&self, from: &PeerId, kind: SignalKind, signal: DirectedSignal) -> RouteOutcome {
        let Some(ty) = kind.as_type() else {
            self.stats.record_unknown_type();
            return RouteOutcome::UnknownType;
        };

        // Lock released before sending
        let Some(link) = self.registry.lookup(&signal.to).await else {
            tracing::debug!(from = %from, to = %signal.to, message_type = ty, "Relay target not registered");
            self.stats.record_unknown_recipient();
            self.notify_unreachable(from, &signal.to).await;
            return RouteOutcome::UnknownRecipient;
        };

        if !link.is_open() {
            tracing::debug!(from = %from, to = %signal.to, message_type = ty, "Relay target link closed");
            self.stats.record_link_closed();
            self.notify_unreachable(from, &signal.to).await;
            return RouteOutcome::LinkClosed;
        }

        let text = match RelayedSignal::new(ty, from, &signal.payload).to_json() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(from = %from, error = %e, "Failed to encode relayed signal");
                self.stats.record_malformed();
                return RouteOutcome::Malformed;
            }
        };

        match link.send(text) {
            Ok(()) => {
                tracing::debug!(from = %from, to = %signal.to, message_type = ty, "Relayed");
                self.stats.record_relayed();
                RouteOutcome::Relayed
            }
            Err(SendError::QueueFull) => {
                tracing::debug!(from = %from, to = %signal.to, message_type = ty, "Relay target queue full");
                self.stats.record_queue_full();
                self.notify_unreachable(from, &signal.to).await;
                RouteOutcome::QueueFull
            }
            Err(SendError::LinkClosed) => {
                tracing::debug!(from = %from, to = %signal.to, message_type = ty, "Relay target link closed");
                self.stats.record_link_closed();
                self.notify_unreachable(from, &signal.to).await;
                RouteOutcome::LinkClosed
            }
        }
    }

    async fn notify_unreachable(&self, from: &PeerId, to: &PeerId) {
        if !self.config.notify_unreachable {
            return;
        }

        let Some(link) = self.registry.lookup(from).await else {
            return;
        };

        match RecipientUnavailable::new(to).to_json() {
            Ok(text) => {
                if let Err(e) = link.send(text) {
                    tracing::debug!(peer = %from, error = %e, "Unavailable notice not delivered");
                }
            }
            Err(e) => tracing::error!(error = %e, "Failed to encode unavailable notice"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::Value;
    use tokio::sync::mpsc;

    use super::*;
    use crate::registry::PeerLink;

    struct Fixture {
        router: MessageRouter,
        registry: Arc<PeerRegistry>,
        stats: Arc<RelayStats>,
    }

    fn fixture(config: RelayConfig) -> Fixture {
        let registry = Arc::new(PeerRegistry::new());
        let stats = Arc::new(RelayStats::new());
        let broadcaster = PresenceBroadcaster::new(Arc::clone(&registry), Arc::clone(&stats));
        Fixture {
            router: MessageRouter::new(Arc::clone(&registry), broadcaster, Arc::clone(&stats), config),
            registry,
            stats,
        }
    }

    async fn join(registry: &PeerRegistry, id: &str) -> mpsc::Receiver<String> {
        let (link, rx) = PeerLink::channel(8);
        registry.register(PeerId::from(id), link).await.unwrap();
        rx
    }

    #[tokio::test]
    async fn test_offer_reaches_only_target() {
        let f = fixture(RelayConfig::default());
        let mut a = join(&f.registry, "A").await;
        let mut b = join(&f.registry, "B").await;
        let mut c = join(&f.registry, "C").await;

        let outcome = f
            .router
            .route(&PeerId::from("A"), r#"{"type":"offer","to":"B","payload":"X"}"#)
            .await;
        assert_eq!(outcome, RouteOutcome::Relayed);

        assert_eq!(
            b.recv().await.unwrap(),
            r#"{"type":"offer","from":"A","payload":"X"}"#
        );
        assert!(b.try_recv().is_err());
        assert!(a.try_recv().is_err());
        assert!(c.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_from_is_stamped_by_router() {
        let f = fixture(RelayConfig::default());
        let _a = join(&f.registry, "A").await;
        let mut b = join(&f.registry, "B").await;

        f.router
            .route(
                &PeerId::from("A"),
                r#"{"type":"answer","to":"B","from":"mallory","payload":{"sdp":"v=0"}}"#,
            )
            .await;

        let value: Value = serde_json::from_str(&b.recv().await.unwrap()).unwrap();
        assert_eq!(value["type"], "answer");
        assert_eq!(value["from"], "A");
        assert!(value.get("to").is_none());
    }

    #[tokio::test]
    async fn test_payload_forwarded_verbatim() {
        let f = fixture(RelayConfig::default());
        let _a = join(&f.registry, "A").await;
        let mut b = join(&f.registry, "B").await;

        let payloads = [
            r#""candidate:0 1 UDP 2122252543 192.168.1.2 54400 typ host""#,
            r#"{"z":1,"a":[1.0, 2e3, -0.50],"nested":{"k":"é"}}"#,
            "null",
            "12345678901234567890",
        ];

        for payload in payloads {
            let frame = format!(
                r#"{{"type":"ice-candidate","to":"B","payload":{}}}"#,
                payload
            );
            assert_eq!(
                f.router.route(&PeerId::from("A"), &frame).await,
                RouteOutcome::Relayed
            );
            let expected = format!(
                r#"{{"type":"ice-candidate","from":"A","payload":{}}}"#,
                payload
            );
            assert_eq!(b.recv().await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_unknown_recipient_is_silent() {
        let f = fixture(RelayConfig::default());
        let mut a = join(&f.registry, "A").await;
        let mut b = join(&f.registry, "B").await;

        let outcome = f
            .router
            .route(&PeerId::from("A"), r#"{"type":"offer","to":"nobody","payload":"X"}"#)
            .await;

        assert_eq!(outcome, RouteOutcome::UnknownRecipient);
        assert!(outcome.is_dropped());
        assert!(a.try_recv().is_err());
        assert!(b.try_recv().is_err());
        assert_eq!(f.stats.snapshot().dropped_unknown_recipient, 1);
    }

    #[tokio::test]
    async fn test_closed_link_is_silent() {
        let f = fixture(RelayConfig::default());
        let mut a = join(&f.registry, "A").await;
        let b = join(&f.registry, "B").await;
        drop(b);

        let outcome = f
            .router
            .route(&PeerId::from("A"), r#"{"type":"offer","to":"B","payload":"X"}"#)
            .await;

        assert_eq!(outcome, RouteOutcome::LinkClosed);
        assert!(a.try_recv().is_err());
        // Cleanup is left to the transport's disconnect
        assert!(f.registry.contains(&PeerId::from("B")).await);
    }

    #[tokio::test]
    async fn test_notify_unreachable_when_enabled() {
        let f = fixture(RelayConfig::default().notify_unreachable(true));
        let mut a = join(&f.registry, "A").await;

        let outcome = f
            .router
            .route(&PeerId::from("A"), r#"{"type":"offer","to":"gone","payload":"X"}"#)
            .await;

        assert_eq!(outcome, RouteOutcome::UnknownRecipient);
        assert_eq!(
            a.recv().await.unwrap(),
            r#"{"type":"recipient-unavailable","payload":"gone"}"#
        );
    }

    #[tokio::test]
    async fn test_peer_list_request() {
        let f = fixture(RelayConfig::default());
        let mut a = join(&f.registry, "A").await;
        let mut b = join(&f.registry, "B").await;

        let outcome = f.router.route(&PeerId::from("A"), r#"{"type":"peer-list"}"#).await;

        assert_eq!(outcome, RouteOutcome::PeerListSent);
        assert_eq!(
            a.recv().await.unwrap(),
            r#"{"type":"peer-list","payload":["B"]}"#
        );
        assert!(b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_malformed_and_unknown_are_dropped() {
        let f = fixture(RelayConfig::default());
        let mut a = join(&f.registry, "A").await;
        let from = PeerId::from("A");

        assert_eq!(f.router.route(&from, "{oops").await, RouteOutcome::Malformed);
        assert_eq!(f.router.route(&from, r#"{"to":"A"}"#).await, RouteOutcome::Malformed);
        assert_eq!(
            f.router.route(&from, r#"{"type":"offer","payload":"X"}"#).await,
            RouteOutcome::Malformed
        );
        assert_eq!(
            f.router.route(&from, r#"{"type":"hangup","to":"A"}"#).await,
            RouteOutcome::UnknownType
        );

        assert!(a.try_recv().is_err());
        let snap = f.stats.snapshot();
        assert_eq!(snap.dropped_malformed, 3);
        assert_eq!(snap.dropped_unknown_type, 1);
    }

    #[tokio::test]
    async fn test_self_addressed_offer_is_delivered_to_self() {
        let f = fixture(RelayConfig::default());
        let mut a = join(&f.registry, "A").await;

        let outcome = f
            .router
            .route(&PeerId::from("A"), r#"{"type":"offer","to":"A","payload":1}"#)
            .await;

        assert_eq!(outcome, RouteOutcome::Relayed);
        assert_eq!(
            a.recv().await.unwrap(),
            r#"{"type":"offer","from":"A","payload":1}"#
        );
    }

    #[tokio::test]
    async fn test_array_frame_is_not_relayed() {
        let f = fixture(RelayConfig::default());
        let _a = join(&f.registry, "A").await;
        let mut b = join(&f.registry, "B").await;

        let outcome = f
            .router
            .route(&PeerId::from("A"), r#"["offer","B",{"sdp":"x"}]"#)
            .await;

        assert_eq!(outcome, RouteOutcome::Malformed);
        assert!(b.try_recv().is_err());
        assert_eq!(f.stats.snapshot().relayed, 0);
    }

    #[tokio::test]
    async fn test_peer_list_request_ignores_stray_to() {
        let f = fixture(RelayConfig::default());
        let mut a = join(&f.registry, "A").await;
        let _b = join(&f.registry, "B").await;

        let outcome = f
            .router
            .route(&PeerId::from("A"), r#"{"type":"peer-list","to":7}"#)
            .await;

        assert_eq!(outcome, RouteOutcome::PeerListSent);
        assert_eq!(
            a.recv().await.unwrap(),
            r#"{"type":"peer-list","payload":["B"]}"#
        );
    }

    #[tokio::test]
    async fn test_full_recipient_does_not_delay_other_relays() {
        let f = fixture(RelayConfig::default());
        let _a = join(&f.registry, "A").await;
        let mut c = join(&f.registry, "C").await;

        // S never drains its single-slot queue
        let (slow, _slow_rx) = PeerLink::channel(1);
        f.registry.register(PeerId::from("S"), slow.clone()).await.unwrap();
        slow.send("filler".to_string()).unwrap();

        let from = PeerId::from("A");
        let routed = tokio::time::timeout(Duration::from_millis(100), async {
            let first = f
                .router
                .route(&from, r#"{"type":"offer","to":"S","payload":"o1"}"#)
                .await;
            let second = f
                .router
                .route(&from, r#"{"type":"offer","to":"C","payload":"o2"}"#)
                .await;
            (first, second)
        })
        .await
        .expect("routing should never wait on a full queue");

        assert_eq!(routed, (RouteOutcome::QueueFull, RouteOutcome::Relayed));
        assert!(RouteOutcome::QueueFull.is_dropped());
        assert_eq!(
            c.try_recv().unwrap(),
            r#"{"type":"offer","from":"A","payload":"o2"}"#
        );
        assert_eq!(f.stats.snapshot().dropped_queue_full, 1);
    }
}
