//! Thread-safe handle over a [`ChordRing`].
//!
//! Writers (joins, leaves, inserts, deletes, updates) serialize behind one
//! write lock. Lookups and routing share a read lock and therefore see the
//! membership and finger tables exactly as they were when the lookup began.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde_json::Value;

use crate::error::Result;
use crate::identifier::Identifier;
use crate::record::Record;
use crate::ring::{ChordRing, JoinOutcome, LeaveOutcome, Lookup, Route, UpdateOutcome};
use crate::storage::{MemStore, StorageBackend};

/// Cloneable, shareable ring. Clones refer to the same ring.
pub struct SharedRing<S = MemStore> {
    inner: Arc<RwLock<ChordRing<S>>>,
}

impl<S> Clone for SharedRing<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: StorageBackend + Default> SharedRing<S> {
    pub fn new(ring: ChordRing<S>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ring)),
        }
    }

    /// Read access for anything not covered by the wrappers below.
    pub fn read(&self) -> RwLockReadGuard<'_, ChordRing<S>> {
        self.inner.read()
    }

    /// Exclusive access; holds off every reader until dropped.
    pub fn write(&self) -> RwLockWriteGuard<'_, ChordRing<S>> {
        self.inner.write()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn find_successor(&self, key: Identifier, start: Option<Identifier>) -> Result<Route> {
        self.inner.read().find_successor(key, start)
    }

    pub fn lookup_by_key(&self, key: Identifier, start: Option<Identifier>) -> Result<Lookup> {
        self.inner.read().lookup_by_key(key, start)
    }

    pub fn lookup_by_name(&self, name: impl AsRef<[u8]>, start: Option<Identifier>) -> Result<Lookup> {
        self.inner.read().lookup_by_name(name, start)
    }

    pub fn insert_by_key(
        &self,
        key: Identifier,
        record: Record,
        start: Option<Identifier>,
    ) -> Result<Route> {
        self.inner.write().insert_by_key(key, record, start)
    }

    pub fn insert_by_name(
        &self,
        name: impl AsRef<[u8]>,
        record: Record,
        start: Option<Identifier>,
    ) -> Result<Route> {
        self.inner.write().insert_by_name(name, record, start)
    }

    pub fn delete_by_key(&self, key: Identifier, start: Option<Identifier>) -> Result<Route> {
        self.inner.write().delete_by_key(key, start)
    }

    pub fn delete_by_name(&self, name: impl AsRef<[u8]>, start: Option<Identifier>) -> Result<Route> {
        self.inner.write().delete_by_name(name, start)
    }

    pub fn update_field(
        &self,
        name: impl AsRef<[u8]>,
        field: impl Into<String>,
        value: impl Into<Value>,
        start: Option<Identifier>,
    ) -> Result<UpdateOutcome> {
        self.inner.write().update_field(name, field, value, start)
    }

    pub fn join(&self, id: Identifier, start: Option<Identifier>) -> Result<JoinOutcome> {
        self.inner.write().join(id, start)
    }

    pub fn leave(&self, id: Identifier, start: Option<Identifier>) -> Result<LeaveOutcome> {
        self.inner.write().leave(id, start)
    }
}

impl<S: StorageBackend + Default> From<ChordRing<S>> for SharedRing<S> {
    fn from(ring: ChordRing<S>) -> Self {
        Self::new(ring)
    }
}
