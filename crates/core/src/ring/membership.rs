//! Joins, leaves and key migration.
//!
//! Every membership change leaves the ring in the same shape: members sorted
//! by id, each linked to its neighbours, every stored key held by its
//! successor, and every finger table rebuilt from scratch.

use tracing::{debug, info};

use super::outcome::{JoinOutcome, LeaveOutcome};
use super::ring::ChordRing;
use crate::error::{Result, RingError};
use crate::identifier::{IdSpace, Identifier};
use crate::node::RingNode;
use crate::storage::StorageBackend;

impl<S: StorageBackend + Default> ChordRing<S> {
    /// Adds a node with an empty store and pulls in the keys it now owns
    /// from its successor.
    ///
    /// Fails with [`RingError::DuplicateNode`] if `id` is already a member
    /// and [`RingError::KeyOutOfRange`] if it does not fit the ring.
    pub fn join(&mut self, id: Identifier, start: Option<Identifier>) -> Result<JoinOutcome> {
        let id = self.space.checked(id.0)?;
        if self.contains(id) {
            return Err(RingError::DuplicateNode(id));
        }

        let locate_hops = match self.resolve_start(start)? {
            Some(start) => self.route(id, start).hops,
            None => 0,
        };

        let idx = self.nodes.partition_point(|n| n.id < id);
        self.nodes
            .insert(idx, RingNode::new(id, self.space.bits(), S::default()));
        self.relink();

        let (migrate_hops, moved) = if self.nodes.len() > 1 {
            self.redistribute(idx)
        } else {
            (0, 0)
        };

        self.rebuild_all_finger_tables();

        info!(node = %id, locate_hops, migrate_hops, moved, size = self.nodes.len(), "node joined");
        Ok(JoinOutcome {
            node: id,
            locate_hops,
            migrate_hops,
            moved,
        })
    }

    /// Removes a node, handing all of its records to its successor.
    ///
    /// An unknown `id` is not an error: the outcome reports `left == false`.
    pub fn leave(&mut self, id: Identifier, start: Option<Identifier>) -> Result<LeaveOutcome> {
        let Some(idx) = self.position(id) else {
            debug!(node = %id, "leave requested for unknown node");
            return Ok(LeaveOutcome::not_found());
        };

        if self.nodes.len() == 1 {
            self.nodes.clear();
            info!(node = %id, "last node left, ring is empty");
            return Ok(LeaveOutcome {
                left: true,
                routing_hops: 0,
                moved: 0,
            });
        }

        let routing_hops = match self.resolve_start(start)? {
            Some(start) => self.route(id, start).hops,
            None => 0,
        };

        let successor = (idx + 1) % self.nodes.len();
        let handed = self.nodes[idx].storage.enumerate();
        let moved = handed.len();
        let target = &mut self.nodes[successor].storage;
        for (key, record) in handed {
            target.insert(key, record);
        }
        metrics::counter!("chord_keys_migrated_total").increment(moved as u64);

        // The departing node (and its copy of the records) goes with it.
        let heir = self.nodes[successor].id;
        self.nodes.remove(idx);
        self.relink();
        self.rebuild_all_finger_tables();

        info!(node = %id, heir = %heir, routing_hops, moved, size = self.nodes.len(), "node left");
        Ok(LeaveOutcome {
            left: true,
            routing_hops,
            moved,
        })
    }

    /// Points every node at its neighbours in sorted order.
    pub(crate) fn relink(&mut self) {
        let n = self.nodes.len();
        if n == 0 {
            return;
        }
        let ids: Vec<Identifier> = self.nodes.iter().map(|node| node.id).collect();
        for (i, node) in self.nodes.iter_mut().enumerate() {
            node.successor = ids[(i + 1) % n];
            node.predecessor = ids[(i + n - 1) % n];
        }
    }

    /// Moves the keys in `(pred, new]` from the successor of the node at
    /// `idx` into it. Returns `(migrate_hops, moved_records)`.
    ///
    /// Each moved key is routed from the successor to account for the cost a
    /// real transfer would pay; the destination is already known.
    fn redistribute(&mut self, idx: usize) -> (usize, usize) {
        let (pred, id) = (self.nodes[idx].predecessor, self.nodes[idx].id);
        let successor = (idx + 1) % self.nodes.len();

        let owned: Vec<Identifier> = self.nodes[successor]
            .storage
            .keys()
            .into_iter()
            .filter(|&key| IdSpace::in_interval(key, pred, id))
            .collect();

        let mut hops = 0;
        let mut moved = 0;
        for key in owned {
            let per_record = self.route(key, successor).hops;
            let records = self.nodes[successor].storage.take(key);
            hops += per_record * records.len();
            moved += records.len();
            for record in records {
                self.nodes[idx].storage.insert(key, record);
            }
        }

        if moved > 0 {
            metrics::counter!("chord_keys_migrated_total").increment(moved as u64);
            debug!(
                from = %self.nodes[successor].id,
                to = %id,
                moved,
                hops,
                "migrated keys to joining node"
            );
        }
        (hops, moved)
    }
}
