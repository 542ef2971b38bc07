//! Error types for the signaling relay
//!
//! Per-message failures (`DecodeError`, `SendError`) never cross the transport
//! boundary; the relay logs and absorbs them. Only server start-up surfaces an
//! [`Error`] to the caller.

use thiserror::Error;

pub use crate::registry::RegistryError;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Socket level failure (bind, accept, configure)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket handshake or framing failure
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Registry rejected an operation
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Outbound delivery failed
    #[error("Send error: {0}")]
    Send(#[from] SendError),

    /// Inbound frame could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Failure writing one message to a peer's link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    /// The peer's writer task has exited; the link will never accept again
    #[error("link closed")]
    LinkClosed,

    /// The peer's outbound queue is full; the message was not queued
    #[error("outbound queue full")]
    QueueFull,
}

/// Failure decoding an inbound text frame
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not a JSON object, or a field has the wrong JSON type
    #[error("malformed envelope: {0}")]
    Json(#[from] serde_json::Error),

    /// The envelope has no `type` field
    #[error("missing message type")]
    MissingType,

    /// A directed message lacks a required field
    #[error("'{kind}' message missing required field '{field}'")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
}
