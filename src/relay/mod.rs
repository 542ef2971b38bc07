//! Signaling relay core
//!
//! [`SignalingHub`] is the surface the transport drives: one call per
//! connect, per inbound text frame and per disconnect. Behind it the
//! [`MessageRouter`] dispatches decoded frames and the
//! [`PresenceBroadcaster`] pushes peer lists after every membership change.
//!
//! Delivery is best-effort throughout. No failure is ever reported back to
//! the sending peer (unless [`RelayConfig::notify_unreachable`] is enabled)
//! and nothing is queued for retry.

pub mod broadcaster;
pub mod config;
pub mod hub;
pub mod router;

pub use broadcaster::PresenceBroadcaster;
pub use config::RelayConfig;
pub use hub::SignalingHub;
pub use router::{MessageRouter, RouteOutcome};
