//! Signaling wire protocol
//!
//! Inbound frames are JSON objects with a `type` field. They are decoded once
//! at the boundary into the closed [`Signal`] enumeration; everything after
//! that point matches on variants instead of strings.
//!
//! ```text
//! { "type": "offer" | "answer" | "ice-candidate" | "peer-list",
//!   "to": "<peer-identity>",       // offer/answer/ice-candidate only
//!   "from": "<peer-identity>",     // stamped by the relay, ignored inbound
//!   "payload": <opaque> }          // SDP or ICE candidate, never inspected
//! ```

pub mod constants;
pub mod envelope;
pub mod message;

pub use envelope::{DirectedSignal, Signal, SignalKind};
pub use message::{PeerListNotice, RecipientUnavailable, RelayedSignal};
