//! Registry error types

use thiserror::Error;

use super::entry::PeerId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The identity is already registered; the existing entry was kept
    #[error("Peer identity already registered: {0}")]
    DuplicateIdentity(PeerId),
}
