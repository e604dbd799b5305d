//! In-memory ordered storage backend.

use std::collections::BTreeMap;

use super::StorageBackend;
use crate::identifier::Identifier;
use crate::record::Record;

/// `BTreeMap`-backed store. Keys iterate in ascending order, which keeps
/// `enumerate` deterministic and makes range scans cheap.
#[derive(Clone, Debug, Default)]
pub struct MemStore {
    entries: BTreeMap<Identifier, Vec<Record>>,
    records: usize,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemStore {
    fn insert(&mut self, key: Identifier, record: Record) {
        self.entries.entry(key).or_default().push(record);
        self.records += 1;
    }

    fn search(&self, key: Identifier) -> &[Record] {
        self.entries.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    fn search_mut(&mut self, key: Identifier) -> Option<&mut [Record]> {
        self.entries.get_mut(&key).map(Vec::as_mut_slice)
    }

    fn delete(&mut self, key: Identifier) -> usize {
        self.take(key).len()
    }

    fn take(&mut self, key: Identifier) -> Vec<Record> {
        let removed = self.entries.remove(&key).unwrap_or_default();
        self.records -= removed.len();
        removed
    }

    fn enumerate(&self) -> Vec<(Identifier, Record)> {
        self.entries
            .iter()
            .flat_map(|(key, records)| records.iter().map(move |r| (*key, r.clone())))
            .collect()
    }

    fn keys(&self) -> Vec<Identifier> {
        self.entries.keys().copied().collect()
    }

    fn len(&self) -> usize {
        self.records
    }
}
