//! Error types for the core library.
//!
//! Only caller misuse is an error. An empty ring, a missing key or an unknown
//! leaving node are ordinary outcomes reported through the result types in
//! [`crate::ring`].

use crate::identifier::Identifier;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, RingError>;

/// Errors that can occur in the core library.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// A node with this identifier is already a ring member.
    #[error("node {0} is already a member of the ring")]
    DuplicateNode(Identifier),

    /// A raw key or node id does not fit the identifier space.
    #[error("key {key} is outside the {bits}-bit identifier space")]
    KeyOutOfRange { key: u128, bits: u8 },

    /// The routing start node is not a ring member.
    #[error("start node {0} is not a member of the ring")]
    UnknownStartNode(Identifier),

    /// Ring configuration rejected by [`crate::RingConfig::validate`].
    #[error("invalid ring configuration: {0}")]
    InvalidConfig(String),
}
