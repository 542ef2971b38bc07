//! # signal-relay
//!
//! A WebRTC signaling relay. Browser peers connect over WebSocket, receive a
//! live list of the other connected peers, and exchange SDP offers, answers
//! and ICE candidates addressed by peer identity. The relay never inspects
//! the negotiation payloads and never carries media.
//!
//! ## Quick start
//!
//! ```no_run
//! use signal_relay::{ServerConfig, SignalingServer};
//!
//! # async fn example() -> signal_relay::Result<()> {
//! let config = ServerConfig::default().bind("127.0.0.1:8080".parse().unwrap());
//! let server = SignalingServer::new(config, ());
//!
//! server.run_until(async {
//!     let _ = tokio::signal::ctrl_c().await;
//! }).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Delivery
//!
//! Relay is best-effort: a message for an unknown or closed peer is dropped
//! without telling the sender, and nothing is retried.

pub mod error;
pub mod protocol;
pub mod registry;
pub mod relay;
pub mod server;
pub mod session;
pub mod stats;

pub use error::{Error, Result};
pub use protocol::{Signal, SignalKind};
pub use registry::{PeerId, PeerLink, PeerRegistry};
pub use relay::{RelayConfig, RouteOutcome, SignalingHub};
pub use server::{ServerConfig, SignalingHandler, SignalingServer};
pub use session::SessionContext;
pub use stats::RelayStatsSnapshot;
