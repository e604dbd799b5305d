//! Core partitioner trait definitions.

use std::fmt::Debug;

/// A partitioner hashes arbitrary bytes into a position on the ring.
///
/// Partitioners are stateless and thread-safe. They return a full 128-bit
/// digest; the ring reduces it into its own identifier space, so the same
/// partitioner serves rings of any width.
pub trait Partitioner: Send + Sync + Debug + 'static {
    /// Hashes `key` into a 128-bit digest. Must be deterministic.
    fn partition(&self, key: &[u8]) -> u128;

    /// Returns the name of this partitioner.
    fn name(&self) -> &'static str;
}
