//! Per-node key/value storage.
//!
//! Every ring node owns one [`StorageBackend`]. The ring decides *which*
//! node stores a key; the backend only has to keep records for the keys it
//! is handed. [`MemStore`] is the default ordered in-memory backend.

pub mod memory;

pub use memory::MemStore;

use crate::identifier::Identifier;
use crate::record::Record;

/// Ordered key/value store held by a single ring node.
///
/// Several records may live under one key (hash collisions). Backends must
/// keep them in insertion order: `search(key)[0]` is the oldest record
/// still present, and that is the one `update_field` mutates.
pub trait StorageBackend: Send + Sync {
    /// Appends `record` under `key`.
    fn insert(&mut self, key: Identifier, record: Record);

    /// Records stored under `key`, oldest first. Empty if absent.
    fn search(&self, key: Identifier) -> &[Record];

    /// Mutable access to the records under `key` for in-place updates.
    fn search_mut(&mut self, key: Identifier) -> Option<&mut [Record]>;

    /// Removes every record under `key`, returning how many were removed.
    fn delete(&mut self, key: Identifier) -> usize;

    /// Removes and returns every record under `key`.
    fn take(&mut self, key: Identifier) -> Vec<Record>;

    /// Full contents as `(key, record)` pairs in key order, oldest first
    /// within a key. A leaving node hands its store over through this.
    fn enumerate(&self) -> Vec<(Identifier, Record)>;

    /// Distinct keys in key order.
    fn keys(&self) -> Vec<Identifier>;

    /// Total number of records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
