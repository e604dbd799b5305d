//! Ring members.
//!
//! A [`RingNode`] owns its storage and nothing else. Successor, predecessor
//! and finger entries are identifiers resolved against the ring's sorted
//! membership list, so a node never keeps another node alive and a stale
//! reference is detectable instead of dangling.

use std::fmt;

use crate::identifier::Identifier;
use crate::ring::finger::FingerTable;
use crate::storage::StorageBackend;

/// A participant in the ring.
pub struct RingNode<S> {
    pub(crate) id: Identifier,
    pub(crate) successor: Identifier,
    pub(crate) predecessor: Identifier,
    pub(crate) fingers: FingerTable,
    pub(crate) storage: S,
}

impl<S: StorageBackend> RingNode<S> {
    /// A node alone on a ring of `bits` width: it is its own successor and
    /// predecessor until the ring relinks it.
    pub(crate) fn new(id: Identifier, bits: u8, storage: S) -> Self {
        Self {
            id,
            successor: id,
            predecessor: id,
            fingers: FingerTable::new(id, bits as usize),
            storage,
        }
    }

    #[inline]
    pub fn id(&self) -> Identifier {
        self.id
    }

    #[inline]
    pub fn successor(&self) -> Identifier {
        self.successor
    }

    #[inline]
    pub fn predecessor(&self) -> Identifier {
        self.predecessor
    }

    pub fn fingers(&self) -> &FingerTable {
        &self.fingers
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Number of records this node holds.
    pub fn load(&self) -> usize {
        self.storage.len()
    }
}

impl<S: StorageBackend> fmt::Debug for RingNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingNode")
            .field("id", &self.id)
            .field("successor", &self.successor)
            .field("predecessor", &self.predecessor)
            .field("records", &self.storage.len())
            .finish()
    }
}

impl<S> fmt::Display for RingNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.id)
    }
}
