//! Signaling protocol constants

/// Message type of an SDP offer
pub const TYPE_OFFER: &str = "offer";

/// Message type of an SDP answer
pub const TYPE_ANSWER: &str = "answer";

/// Message type of a trickled ICE candidate
pub const TYPE_ICE_CANDIDATE: &str = "ice-candidate";

/// Message type of a peer-list request (inbound) and notification (outbound)
pub const TYPE_PEER_LIST: &str = "peer-list";

/// Message type sent back when a relay target is unreachable (opt-in)
pub const TYPE_RECIPIENT_UNAVAILABLE: &str = "recipient-unavailable";

/// Default WebSocket endpoint path
pub const DEFAULT_PATH: &str = "/signaling-server";

/// Default signaling port
pub const DEFAULT_PORT: u16 = 8080;

/// Origin wildcard accepting any browser origin
pub const ANY_ORIGIN: &str = "*";

/// Default depth of each peer's outbound queue
pub const DEFAULT_OUTBOUND_QUEUE: usize = 64;

/// Default maximum size of one inbound WebSocket message (64 KiB)
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024;
