//! WebSocket signaling server
//!
//! The transport half of the relay: accepts WebSocket connections, assigns
//! each one a [`PeerId`](crate::registry::PeerId) and feeds its lifecycle
//! into the [`SignalingHub`](crate::relay::SignalingHub).

pub mod config;
pub(crate) mod connection;
pub mod handler;
pub mod listener;

pub use config::ServerConfig;
pub use handler::SignalingHandler;
pub use listener::SignalingServer;
