//! The ring facade: membership list, data operations and construction.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;

use super::finger::FingerTable;
use super::outcome::{Lookup, Route, UpdateOutcome};
use crate::config::RingConfig;
use crate::error::{Result, RingError};
use crate::identifier::{IdSpace, Identifier};
use crate::node::RingNode;
use crate::partitioner::Partitioner;
use crate::record::Record;
use crate::storage::{MemStore, StorageBackend};

/// A Chord ring simulated in one process.
///
/// Owns every [`RingNode`], sorted by identifier. Mutating operations take
/// `&mut self`, so one membership change or write always completes before
/// the next starts; see [`crate::SharedRing`] for concurrent access.
///
/// # Example
///
/// ```rust
/// use chord_core::{Identifier, Record, RingBuilder};
///
/// let mut ring = RingBuilder::new()
///     .bits(8)
///     .add_nodes([10, 36, 59, 101].map(Identifier))
///     .build()
///     .unwrap();
///
/// ring.insert_by_key(Identifier(40), Record::new().with("title", "Heat"), None).unwrap();
/// let found = ring.lookup_by_key(Identifier(40), None).unwrap();
/// assert_eq!(found.node, Some(Identifier(59)));
/// ```
pub struct ChordRing<S = MemStore> {
    pub(crate) space: IdSpace,
    pub(crate) config: RingConfig,
    pub(crate) partitioner: Arc<dyn Partitioner>,
    /// Sorted by id, no duplicates.
    pub(crate) nodes: Vec<RingNode<S>>,
    pub(crate) fallbacks: AtomicU64,
}

impl ChordRing<MemStore> {
    /// Empty ring with in-memory storage.
    pub fn new(config: RingConfig) -> Result<Self> {
        Self::with_config(config)
    }
}

impl<S: StorageBackend + Default> ChordRing<S> {
    /// Empty ring using the partitioner named by `config`.
    pub fn with_config(config: RingConfig) -> Result<Self> {
        let partitioner = config.partitioner.build();
        Self::with_partitioner(config, partitioner)
    }

    /// Empty ring hashing names with a caller-supplied partitioner.
    pub fn with_partitioner(config: RingConfig, partitioner: Arc<dyn Partitioner>) -> Result<Self> {
        config.validate()?;
        let space = IdSpace::new(config.bits)?;
        Ok(Self {
            space,
            config,
            partitioner,
            nodes: Vec::new(),
            fallbacks: AtomicU64::new(0),
        })
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn space(&self) -> IdSpace {
        self.space
    }

    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.partitioner.name()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Member ids in ring order.
    pub fn node_ids(&self) -> Vec<Identifier> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &RingNode<S>> {
        self.nodes.iter()
    }

    pub fn node(&self, id: Identifier) -> Option<&RingNode<S>> {
        self.position(id).map(|i| &self.nodes[i])
    }

    pub fn contains(&self, id: Identifier) -> bool {
        self.position(id).is_some()
    }

    /// Direct access to a node's fingers. Anything written here is only
    /// trusted until the next membership change rebuilds the table; routing
    /// tolerates garbage through its linear-scan fallback.
    pub fn finger_table_mut(&mut self, id: Identifier) -> Option<&mut FingerTable> {
        self.position(id).map(|i| &mut self.nodes[i].fingers)
    }

    /// Times routing abandoned the finger tables for a linear scan.
    pub fn fallbacks(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn total_records(&self) -> usize {
        self.nodes.iter().map(RingNode::load).sum()
    }

    /// Places a logical name on the ring.
    pub fn hash(&self, name: impl AsRef<[u8]>) -> Identifier {
        self.space.wrap(self.partitioner.partition(name.as_ref()))
    }

    #[inline]
    pub(crate) fn position(&self, id: Identifier) -> Option<usize> {
        self.nodes.binary_search_by_key(&id, |n| n.id).ok()
    }

    /// Index routing starts from: the given member, or the lowest id.
    /// `None` only when the ring is empty.
    pub(crate) fn resolve_start(&self, start: Option<Identifier>) -> Result<Option<usize>> {
        if self.nodes.is_empty() {
            return Ok(None);
        }
        match start {
            None => Ok(Some(0)),
            Some(id) => self
                .position(id)
                .map(Some)
                .ok_or(RingError::UnknownStartNode(id)),
        }
    }

    // ------------------------------------------------------------------
    // Data operations
    // ------------------------------------------------------------------

    /// Stores `record` under an already-hashed key. On an empty ring nothing
    /// is stored and the route has no node.
    pub fn insert_by_key(
        &mut self,
        key: Identifier,
        record: Record,
        start: Option<Identifier>,
    ) -> Result<Route> {
        let route = self.find_successor(key, start)?;
        if let Some(owner) = route.node.and_then(|id| self.position(id)) {
            self.nodes[owner].storage.insert(key, record);
        }
        Ok(route)
    }

    pub fn insert_by_name(
        &mut self,
        name: impl AsRef<[u8]>,
        record: Record,
        start: Option<Identifier>,
    ) -> Result<Route> {
        let key = self.hash(name);
        self.insert_by_key(key, record, start)
    }

    pub fn lookup_by_key(&self, key: Identifier, start: Option<Identifier>) -> Result<Lookup> {
        let route = self.find_successor(key, start)?;
        let records = route
            .node
            .and_then(|id| self.node(id))
            .map(|node| node.storage.search(key).to_vec())
            .unwrap_or_default();
        Ok(Lookup {
            node: route.node,
            hops: route.hops,
            records,
        })
    }

    pub fn lookup_by_name(
        &self,
        name: impl AsRef<[u8]>,
        start: Option<Identifier>,
    ) -> Result<Lookup> {
        self.lookup_by_key(self.hash(name), start)
    }

    /// Removes every record under `key` from its owner.
    pub fn delete_by_key(&mut self, key: Identifier, start: Option<Identifier>) -> Result<Route> {
        let route = self.find_successor(key, start)?;
        if let Some(owner) = route.node.and_then(|id| self.position(id)) {
            self.nodes[owner].storage.delete(key);
        }
        Ok(route)
    }

    pub fn delete_by_name(
        &mut self,
        name: impl AsRef<[u8]>,
        start: Option<Identifier>,
    ) -> Result<Route> {
        let key = self.hash(name);
        self.delete_by_key(key, start)
    }

    /// Sets `field` on the oldest record stored under `key`, in place.
    pub fn update_field_by_key(
        &mut self,
        key: Identifier,
        field: impl Into<String>,
        value: impl Into<Value>,
        start: Option<Identifier>,
    ) -> Result<UpdateOutcome> {
        let route = self.find_successor(key, start)?;
        let updated = route
            .node
            .and_then(|id| self.position(id))
            .and_then(|i| self.nodes[i].storage.search_mut(key))
            .and_then(|records| records.first_mut())
            .map(|record| record.set(field, value))
            .is_some();
        Ok(UpdateOutcome {
            updated,
            hops: route.hops,
        })
    }

    pub fn update_field(
        &mut self,
        name: impl AsRef<[u8]>,
        field: impl Into<String>,
        value: impl Into<Value>,
        start: Option<Identifier>,
    ) -> Result<UpdateOutcome> {
        let key = self.hash(name);
        self.update_field_by_key(key, field, value, start)
    }
}

impl<S: StorageBackend> fmt::Debug for ChordRing<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChordRing")
            .field("bits", &self.space.bits())
            .field("partitioner", &self.partitioner.name())
            .field("nodes", &self.nodes)
            .finish()
    }
}

/// Builder for a populated ring.
///
/// Nodes join in the order they were added, each paying the usual routing
/// and migration costs; the result is identical to calling
/// [`ChordRing::join`] by hand.
#[derive(Debug, Default)]
pub struct RingBuilder {
    config: RingConfig,
    partitioner: Option<Arc<dyn Partitioner>>,
    nodes: Vec<Identifier>,
}

impl RingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: RingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn bits(mut self, bits: u8) -> Self {
        self.config.bits = bits;
        self
    }

    /// Overrides the partitioner chosen by the config.
    pub fn partitioner(mut self, partitioner: impl Partitioner) -> Self {
        self.partitioner = Some(Arc::new(partitioner));
        self
    }

    pub fn hop_budget(mut self, factor: usize, minimum: usize) -> Self {
        self.config.hop_budget_factor = factor;
        self.config.min_hop_budget = minimum;
        self
    }

    pub fn add_node(mut self, id: Identifier) -> Self {
        self.nodes.push(id);
        self
    }

    pub fn add_nodes(mut self, ids: impl IntoIterator<Item = Identifier>) -> Self {
        self.nodes.extend(ids);
        self
    }

    /// Builds a ring with in-memory storage.
    pub fn build(self) -> Result<ChordRing> {
        self.build_with::<MemStore>()
    }

    /// Builds a ring whose nodes use storage backend `S`.
    pub fn build_with<S: StorageBackend + Default>(self) -> Result<ChordRing<S>> {
        let partitioner = self
            .partitioner
            .unwrap_or_else(|| self.config.partitioner.build());
        let mut ring = ChordRing::<S>::with_partitioner(self.config, partitioner)?;
        for id in self.nodes {
            ring.join(id, None)?;
        }
        Ok(ring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PartitionerKind;
    use crate::partitioner::Xxh3Partitioner;
    use serde_json::json;

    fn id(v: u128) -> Identifier {
        Identifier(v)
    }

    fn paper_ring() -> ChordRing {
        RingBuilder::new()
            .bits(8)
            .add_nodes([10, 36, 59, 101].map(Identifier))
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_ring_operations() {
        let mut ring = ChordRing::new(RingConfig::with_bits(8)).unwrap();
        let route = ring.insert_by_key(id(5), Record::new(), None).unwrap();
        assert_eq!(route, Route::none());
        assert_eq!(ring.total_records(), 0);

        let found = ring.lookup_by_name("anything", None).unwrap();
        assert!(found.is_empty());
        assert_eq!(found.node, None);

        let update = ring.update_field("anything", "year", 1999, None).unwrap();
        assert!(!update.updated);
        assert_eq!(update.hops, 0);

        assert_eq!(ring.delete_by_key(id(5), None).unwrap(), Route::none());
    }

    #[test]
    fn test_insert_lookup_by_key() {
        let mut ring = paper_ring();
        let record = Record::new().with("title", "Heat");
        let route = ring.insert_by_key(id(40), record.clone(), None).unwrap();
        assert_eq!(route.node, Some(id(59)));

        let node = ring.node(id(59)).unwrap();
        assert_eq!(node.storage().search(id(40)), &[record.clone()]);

        let found = ring.lookup_by_key(id(40), None).unwrap();
        assert_eq!(found.records, vec![record]);
        assert_eq!(found.node, Some(id(59)));
    }

    #[test]
    fn test_insert_rejects_out_of_range_key() {
        let mut ring = paper_ring();
        let err = ring.insert_by_key(id(256), Record::new(), None).unwrap_err();
        assert_eq!(err, RingError::KeyOutOfRange { key: 256, bits: 8 });
    }

    #[test]
    fn test_unknown_start_node() {
        let ring = paper_ring();
        let err = ring.lookup_by_key(id(40), Some(id(11))).unwrap_err();
        assert_eq!(err, RingError::UnknownStartNode(id(11)));
    }

    #[test]
    fn test_update_field_mutates_stored_record() {
        let mut ring = paper_ring();
        ring.insert_by_name("Heat", Record::new().with("year", 1995), None).unwrap();

        let outcome = ring.update_field("Heat", "year", 1996, None).unwrap();
        assert!(outcome.updated);

        let found = ring.lookup_by_name("Heat", None).unwrap();
        assert_eq!(found.records[0].get("year"), Some(&json!(1996)));
    }

    #[test]
    fn test_update_field_missing_key() {
        let mut ring = paper_ring();
        let outcome = ring.update_field("Ronin", "year", 1998, None).unwrap();
        assert!(!outcome.updated);
    }

    #[test]
    fn test_update_touches_only_first_colliding_record() {
        let mut ring = paper_ring();
        ring.insert_by_key(id(40), Record::new().with("title", "a"), None).unwrap();
        ring.insert_by_key(id(40), Record::new().with("title", "b"), None).unwrap();

        ring.update_field_by_key(id(40), "seen", true, None).unwrap();

        let found = ring.lookup_by_key(id(40), None).unwrap();
        assert_eq!(found.records.len(), 2);
        assert_eq!(found.records[0].get("seen"), Some(&json!(true)));
        assert_eq!(found.records[1].get("seen"), None);
    }

    #[test]
    fn test_delete_by_name() {
        let mut ring = paper_ring();
        ring.insert_by_name("Heat", Record::new(), None).unwrap();
        assert_eq!(ring.total_records(), 1);

        let route = ring.delete_by_name("Heat", None).unwrap();
        assert!(route.node.is_some());
        assert_eq!(ring.total_records(), 0);
        assert!(ring.lookup_by_name("Heat", None).unwrap().is_empty());
    }

    #[test]
    fn test_hash_stays_in_space() {
        let ring = paper_ring();
        for name in ["Heat", "Ronin", "Alien", "Brazil"] {
            assert!(ring.hash(name).value() <= 255);
        }
        assert_eq!(ring.hash("Heat"), ring.hash("Heat"));
    }

    #[test]
    fn test_builder_partitioner_override() {
        let ring = RingBuilder::new()
            .with_config(RingConfig {
                partitioner: PartitionerKind::Sip,
                ..RingConfig::with_bits(16)
            })
            .partitioner(Xxh3Partitioner)
            .build()
            .unwrap();
        assert_eq!(ring.partitioner_name(), "Xxh3Partitioner");
        assert_eq!(ring.space().bits(), 16);
    }

    #[test]
    fn test_builder_rejects_duplicates() {
        let err = RingBuilder::new()
            .bits(8)
            .add_node(id(10))
            .add_node(id(10))
            .build()
            .unwrap_err();
        assert_eq!(err, RingError::DuplicateNode(id(10)));
    }
}
