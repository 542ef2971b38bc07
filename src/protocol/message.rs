//! Outbound messages
//!
//! Everything the relay writes to a peer is built here.

use serde::Serialize;
use serde_json::value::RawValue;

use super::constants::{TYPE_PEER_LIST, TYPE_RECIPIENT_UNAVAILABLE};
use crate::registry::PeerId;

/// Offer, answer or ICE candidate forwarded to its recipient
///
/// `from` is always the relay-stamped sender; the payload is written back out
/// byte-for-byte.
#[derive(Debug, Serialize)]
pub struct RelayedSignal<'a> {
    #[serde(rename = "type")]
    pub ty: &'static str,
    pub from: &'a PeerId,
    pub payload: &'a RawValue,
}

impl<'a> RelayedSignal<'a> {
    pub fn new(ty: &'static str, from: &'a PeerId, payload: &'a RawValue) -> Self {
        Self { ty, from, payload }
    }

    /// Serialize to a JSON text frame
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Presence notification: every registered peer except the recipient
#[derive(Debug, Serialize)]
pub struct PeerListNotice<'a> {
    #[serde(rename = "type")]
    ty: &'static str,
    payload: Vec<&'a PeerId>,
}

impl<'a> PeerListNotice<'a> {
    /// Build the view of `members` as seen by `recipient`
    pub fn for_recipient<I>(recipient: &PeerId, members: I) -> Self
    where
        I: IntoIterator<Item = &'a PeerId>,
    {
        Self {
            ty: TYPE_PEER_LIST,
            payload: members.into_iter().filter(|id| *id != recipient).collect(),
        }
    }

    /// Identities listed in this notice
    pub fn peers(&self) -> &[&'a PeerId] {
        &self.payload
    }

    /// Serialize to a JSON text frame
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Sent back to a sender whose relay target is unreachable, when enabled
#[derive(Debug, Serialize)]
pub struct RecipientUnavailable<'a> {
    #[serde(rename = "type")]
    ty: &'static str,
    payload: &'a PeerId,
}

impl<'a> RecipientUnavailable<'a> {
    pub fn new(to: &'a PeerId) -> Self {
        Self {
            ty: TYPE_RECIPIENT_UNAVAILABLE,
            payload: to,
        }
    }

    /// Serialize to a JSON text frame
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
