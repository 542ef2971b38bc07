//! Outbound send capability
//!
//! A [`PeerLink`] is the write half of one peer's connection as seen by the
//! relay. It wraps the sender of a bounded queue drained by the connection's
//! writer task; once that task exits the link reports itself closed.
//!
//! Sending never waits. A full queue is reported immediately so a slow peer
//! can only lose its own messages.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::SendError;

/// Cloneable handle for writing text messages to one peer
#[derive(Debug, Clone)]
pub struct PeerLink {
    tx: mpsc::Sender<String>,
}

impl PeerLink {
    /// Wrap an existing queue sender
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        Self { tx }
    }

    /// Create a link together with the receiving end of its queue
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    /// Whether the underlying connection can still accept messages
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Queue one text message for the peer
    pub fn send(&self, text: String) -> Result<(), SendError> {
        self.tx.try_send(text).map_err(|e| match e {
            TrySendError::Full(_) => SendError::QueueFull,
            TrySendError::Closed(_) => SendError::LinkClosed,
        })
    }
}
