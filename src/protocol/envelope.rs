//! Inbound envelope decoding
//!
//! Turns one raw text frame into a [`Signal`]. The opaque `payload` is kept as
//! a borrowed-then-boxed [`RawValue`] so the relay forwards the exact bytes
//! the sender wrote.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use super::constants::{TYPE_ANSWER, TYPE_ICE_CANDIDATE, TYPE_OFFER, TYPE_PEER_LIST};
use crate::error::DecodeError;
use crate::registry::PeerId;

/// Kind of an inbound signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
    PeerListRequest,
    /// Any `type` the relay does not handle
    Unknown,
}

impl SignalKind {
    /// Map a wire `type` string to a kind
    pub fn from_type(ty: &str) -> Self {
        match ty {
            TYPE_OFFER => SignalKind::Offer,
            TYPE_ANSWER => SignalKind::Answer,
            TYPE_ICE_CANDIDATE => SignalKind::IceCandidate,
            TYPE_PEER_LIST => SignalKind::PeerListRequest,
            _ => SignalKind::Unknown,
        }
    }

    /// Wire `type` string, or `None` for [`SignalKind::Unknown`]
    pub fn as_type(&self) -> Option<&'static str> {
        match self {
            SignalKind::Offer => Some(TYPE_OFFER),
            SignalKind::Answer => Some(TYPE_ANSWER),
            SignalKind::IceCandidate => Some(TYPE_ICE_CANDIDATE),
            SignalKind::PeerListRequest => Some(TYPE_PEER_LIST),
            SignalKind::Unknown => None,
        }
    }

    /// Whether messages of this kind are relayed to a single `to` peer
    pub fn is_directed(&self) -> bool {
        matches!(
            self,
            SignalKind::Offer | SignalKind::Answer | SignalKind::IceCandidate
        )
    }
}

/// Target and opaque payload of an offer, answer or ICE candidate
#[derive(Debug)]
pub struct DirectedSignal {
    /// Recipient identity
    pub to: PeerId,
    /// Payload exactly as received
    pub payload: Box<RawValue>,
}

/// A decoded inbound frame
#[derive(Debug)]
pub enum Signal {
    Offer(DirectedSignal),
    Answer(DirectedSignal),
    IceCandidate(DirectedSignal),
    PeerListRequest,
    /// Well-formed envelope with an unhandled `type`
    Unknown(String),
}

/// Top-level members of an inbound frame, values left undecoded
///
/// Deserializing into a map only accepts a JSON object; arrays and scalars
/// are rejected here.
type Fields = HashMap<String, Box<RawValue>>;

fn field<T: DeserializeOwned>(raw: &RawValue) -> Result<T, DecodeError> {
    Ok(serde_json::from_str(raw.get())?)
}

impl Signal {
    /// Decode one text frame
    ///
    /// Any client-supplied `from` is ignored; the router stamps the sender.
    /// Only directed kinds look at `to` and `payload`.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let mut fields: Fields = serde_json::from_str(text)?;
        let ty: String = match fields.get("type") {
            Some(raw) => field(raw)?,
            None => return Err(DecodeError::MissingType),
        };

        let kind = SignalKind::from_type(&ty);
        match kind {
            SignalKind::PeerListRequest => Ok(Signal::PeerListRequest),
            SignalKind::Unknown => Ok(Signal::Unknown(ty)),
            SignalKind::Offer | SignalKind::Answer | SignalKind::IceCandidate => {
                let name = kind.as_type().unwrap_or_default();
                let to: String = match fields.get("to") {
                    Some(raw) => field(raw)?,
                    None => {
                        return Err(DecodeError::MissingField {
                            kind: name,
                            field: "to",
                        })
                    }
                };
                // A present `"payload": null` counts as present
                let payload = fields.remove("payload").ok_or(DecodeError::MissingField {
                    kind: name,
                    field: "payload",
                })?;
                let directed = DirectedSignal {
                    to: PeerId::from(to),
                    payload,
                };

                Ok(match kind {
                    SignalKind::Offer => Signal::Offer(directed),
                    SignalKind::Answer => Signal::Answer(directed),
                    _ => Signal::IceCandidate(directed),
                })
            }
        }
    }

    /// Kind of this signal
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Offer(_) => SignalKind::Offer,
            Signal::Answer(_) => SignalKind::Answer,
            Signal::IceCandidate(_) => SignalKind::IceCandidate,
            Signal::PeerListRequest => SignalKind::PeerListRequest,
            Signal::Unknown(_) => SignalKind::Unknown,
        }
    }
}
