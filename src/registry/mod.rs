//! Connection registry
//!
//! The registry is the only shared mutable state in the relay. It maps each
//! live peer's identity to the outbound link of its connection.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<PeerRegistry>
//!                   ┌──────────────────────────┐
//!                   │ peers: HashMap<PeerId,   │
//!                   │   PeerEntry {            │
//!                   │     link: PeerLink,      │
//!                   │     seq,                 │
//!                   │   }                      │
//!                   │ >                        │
//!                   └────────────┬─────────────┘
//!                                │
//!        ┌───────────────────────┼───────────────────────┐
//!        │                       │                       │
//!        ▼                       ▼                       ▼
//!   [Connection]          [MessageRouter]       [PresenceBroadcaster]
//!   register()            lookup(to)            snapshot()
//!   unregister()              │                       │
//!                             └──► link.send() ◄──────┘   (lock released)
//! ```
//!
//! # Locking
//!
//! Mutations and snapshots take the map lock for a bounded critical section
//! and never await anything while holding it. Callers receive cloned
//! [`PeerLink`] handles and send on them after the lock is dropped, so a slow
//! peer can never stall registry mutation for anyone else.

pub mod entry;
pub mod error;
pub mod link;
pub mod store;

pub use entry::{PeerEntry, PeerId};
pub use error::RegistryError;
pub use link::PeerLink;
pub use store::PeerRegistry;
