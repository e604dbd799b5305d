//! Finger table of a ring node.
#![warn(missing_docs)]
use std::ops::Index;

use tracing::debug;

use super::ring::ChordRing;
use crate::identifier::Identifier;
use crate::storage::StorageBackend;

/// Routing shortcuts of one node.
///
/// Entry `i` points at the owner of `owner + 2^i`. Entries start empty and
/// are only ever filled by a full rebuild; there is no incremental update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FingerTable {
    owner: Identifier,
    finger: Vec<Option<Identifier>>,
}

impl FingerTable {
    /// Empty table with `size` slots for the node `owner`.
    pub fn new(owner: Identifier, size: usize) -> Self {
        Self {
            owner,
            finger: vec![None; size],
        }
    }

    /// Id of the node this table belongs to.
    pub fn owner(&self) -> Identifier {
        self.owner
    }

    /// Number of slots, filled or not.
    pub fn size(&self) -> usize {
        self.finger.len()
    }

    /// Number of filled slots.
    pub fn len(&self) -> usize {
        self.finger.iter().flatten().count()
    }

    /// True if no slot is filled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// getter
    pub fn get(&self, index: usize) -> Option<Identifier> {
        self.finger.get(index).copied().flatten()
    }

    /// setter, out-of-range indexes are ignored
    pub fn set(&mut self, index: usize, id: Identifier) {
        match self.finger.get_mut(index) {
            Some(slot) => *slot = Some(id),
            None => tracing::error!(index, owner = %self.owner, "finger index out of range"),
        }
    }

    /// Empties every slot.
    pub fn clear(&mut self) {
        self.finger.iter_mut().for_each(|slot| *slot = None);
    }

    /// Filled entries from the longest reach down to the shortest.
    pub fn iter_rev(&self) -> impl Iterator<Item = Identifier> + '_ {
        self.finger.iter().rev().flatten().copied()
    }

    /// get finger list
    pub fn list(&self) -> &[Option<Identifier>] {
        &self.finger
    }
}

impl Index<usize> for FingerTable {
    type Output = Option<Identifier>;
    fn index(&self, index: usize) -> &Self::Output {
        self.finger.get(index).unwrap_or(&None)
    }
}

impl<S: StorageBackend + Default> ChordRing<S> {
    /// Recomputes every finger of node `id` from the current membership.
    ///
    /// Entries are resolved with the linear successor scan rather than with
    /// routing, since routing would consult the tables being rebuilt.
    /// Returns `false` if `id` is not a member.
    pub fn rebuild_finger_table(&mut self, id: Identifier) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.rebuild_finger_table_at(idx);
                true
            }
            None => false,
        }
    }

    /// Recomputes the finger table of every member.
    pub fn rebuild_all_finger_tables(&mut self) {
        for idx in 0..self.nodes.len() {
            self.rebuild_finger_table_at(idx);
        }
        debug!(nodes = self.nodes.len(), "rebuilt all finger tables");
    }

    fn rebuild_finger_table_at(&mut self, idx: usize) {
        let id = self.nodes[idx].id;
        let mut table = FingerTable::new(id, self.space.bits() as usize);
        for i in 0..self.space.bits() {
            if let Some(owner) = self.find_successor_linear(self.space.finger_start(id, i)) {
                table.set(i as usize, owner);
            }
        }
        self.nodes[idx].fingers = table;
    }
}
