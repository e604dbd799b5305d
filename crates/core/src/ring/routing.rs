//! Successor lookup.
//!
//! Routing walks the ring with finger-table jumps. Under a well-formed ring
//! that takes `O(log n)` hops; if the walk exceeds its hop budget or runs
//! into an identifier that is no longer a member, it gives up and answers
//! with a linear scan of the membership list, which is always correct.

use std::sync::atomic::Ordering;

use tracing::{trace, warn};

use super::outcome::Route;
use super::ring::ChordRing;
use crate::error::Result;
use crate::identifier::{IdSpace, Identifier};
use crate::node::RingNode;
use crate::storage::StorageBackend;

impl<S: StorageBackend + Default> ChordRing<S> {
    /// Finds the node owning `key`, starting at `start` (the lowest-id node
    /// by default), and reports the hops taken.
    ///
    /// Returns a [`Route`] without a node on an empty ring.
    pub fn find_successor(&self, key: Identifier, start: Option<Identifier>) -> Result<Route> {
        let key = self.space.checked(key.0)?;
        let route = match self.resolve_start(start)? {
            Some(start) => self.route(key, start),
            None => Route::none(),
        };
        metrics::histogram!("chord_routing_hops").record(route.hops as f64);
        Ok(route)
    }

    /// Owner of `key` by scanning the sorted membership: the smallest id
    /// `>= key`, wrapping to the first node.
    pub fn find_successor_linear(&self, key: Identifier) -> Option<Identifier> {
        let idx = self.nodes.partition_point(|n| n.id < key);
        self.nodes.get(idx).or(self.nodes.first()).map(|n| n.id)
    }

    /// The finger of `node` reaching furthest without passing `key`, or the
    /// node's successor when no finger lies in `(node, key)`.
    pub fn closest_preceding_finger(&self, node: &RingNode<S>, key: Identifier) -> Identifier {
        match node
            .fingers
            .iter_rev()
            .find(|&finger| IdSpace::in_open_interval(finger, node.id, key))
        {
            Some(finger) if finger != node.id => finger,
            _ => node.successor,
        }
    }

    /// Finger-table walk from `self.nodes[start]`. Never fails: exhausting
    /// the hop budget or meeting a stale reference ends in a linear scan.
    pub(crate) fn route(&self, key: Identifier, start: usize) -> Route {
        let budget = self.config.hop_budget(self.nodes.len());
        let mut current = &self.nodes[start];
        let mut hops = 0;

        loop {
            if key == current.id {
                return Route::found(current.id, hops);
            }

            let successor = current.successor;
            if IdSpace::in_interval(key, current.id, successor) {
                if self.position(successor).is_some() {
                    return Route::found(successor, hops + 1);
                }
                return self.diverge(key, hops + 1, "stale successor");
            }

            let next = self.closest_preceding_finger(current, key);
            hops += 1;
            trace!(%key, from = %current.id, to = %next, hops, "routing hop");

            current = match self.position(next) {
                Some(idx) => &self.nodes[idx],
                None => return self.diverge(key, hops, "stale finger"),
            };

            if hops > budget {
                return self.diverge(key, hops, "hop budget exhausted");
            }
        }
    }

    fn diverge(&self, key: Identifier, hops: usize, reason: &'static str) -> Route {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("chord_routing_fallbacks_total").increment(1);
        warn!(%key, hops, reason, "finger routing diverged, falling back to linear scan");
        Route {
            node: self.find_successor_linear(key),
            hops,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::identifier::Identifier;
    use crate::ring::RingBuilder;
    use crate::ChordRing;

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
    fn test_find_successor_paper_example() {
        let ring = paper_ring();
        assert_eq!(ring.find_successor(id(40), None).unwrap().node, Some(id(59)));
        assert_eq!(ring.find_successor(id(200), None).unwrap().node, Some(id(10)));
        assert_eq!(ring.find_successor(id(0), None).unwrap().node, Some(id(10)));
        assert_eq!(ring.find_successor(id(101), None).unwrap().node, Some(id(101)));
        assert_eq!(ring.fallbacks(), 0);
    }

    #[test]
    fn test_exact_match_costs_no_hop() {
        let ring = paper_ring();
        let route = ring.find_successor(id(10), None).unwrap();
        assert_eq!(route.node, Some(id(10)));
        assert_eq!(route.hops, 0);
    }

    #[test]
    fn test_immediate_successor_costs_one_hop() {
        let ring = paper_ring();
        let route = ring.find_successor(id(20), Some(id(10))).unwrap();
        assert_eq!(route.node, Some(id(36)));
        assert_eq!(route.hops, 1);
    }

    #[test]
    fn test_finger_jump_counts_hops() {
        // From 10, key 90: fingers of 10 cover 11..138; 10+64=74 is owned
        // by 101, which passes the key, so the walk jumps to 59 (10+32=42)
        // and 59's successor 101 owns 90.
        let ring = paper_ring();
        let route = ring.find_successor(id(90), Some(id(10))).unwrap();
        assert_eq!(route.node, Some(id(101)));
        assert_eq!(route.hops, 2);
    }

    #[test]
    fn test_closest_preceding_finger() {
        let ring = paper_ring();
        let node = ring.node(id(10)).unwrap();
        assert_eq!(ring.closest_preceding_finger(node, id(90)), id(59));
        // Nothing lies strictly between 10 and 20: fall back to successor.
        assert_eq!(ring.closest_preceding_finger(node, id(20)), id(36));
    }

    #[test]
    fn test_linear_scan() {
        let ring = paper_ring();
        assert_eq!(ring.find_successor_linear(id(37)), Some(id(59)));
        assert_eq!(ring.find_successor_linear(id(59)), Some(id(59)));
        assert_eq!(ring.find_successor_linear(id(102)), Some(id(10)));

        let empty = ChordRing::new(crate::RingConfig::with_bits(8)).unwrap();
        assert_eq!(empty.find_successor_linear(id(1)), None);
    }

    #[test]
    fn test_empty_ring_route() {
        let ring = ChordRing::new(crate::RingConfig::with_bits(8)).unwrap();
        let route = ring.find_successor(id(3), Some(id(10))).unwrap();
        assert_eq!(route.node, None);
        assert_eq!(route.hops, 0);
    }

    #[test]
    fn test_single_node_owns_everything() {
        let ring = RingBuilder::new().bits(8).add_node(id(77)).build().unwrap();
        for key in [0u128, 76, 77, 78, 255] {
            let route = ring.find_successor(id(key), None).unwrap();
            assert_eq!(route.node, Some(id(77)));
            assert!(route.hops <= 1);
        }
    }

    #[test]
    fn test_stale_successor_falls_back() {
        let mut ring = paper_ring();
        ring.nodes[0].successor = id(200);
        let route = ring.find_successor(id(20), Some(id(10))).unwrap();
        assert_eq!(route.node, Some(id(36)));
        assert_eq!(ring.fallbacks(), 1);
    }

    #[test]
    fn test_stale_finger_falls_back() {
        let mut ring = paper_ring();
        for i in 0..8 {
            ring.finger_table_mut(id(10)).unwrap().set(i, id(50));
        }
        let route = ring.find_successor(id(90), Some(id(10))).unwrap();
        assert_eq!(route.node, Some(id(101)));
        assert_eq!(ring.fallbacks(), 1);
    }

    #[test]
    fn test_hop_budget_exhaustion_falls_back() {
        // Twenty nodes, fingers wiped: only successor steps remain, which
        // overruns a budget of four hops.
        let mut ring = RingBuilder::new()
            .bits(8)
            .hop_budget(0, 4)
            .add_nodes((0..20).map(|i| Identifier(i * 10 + 5)))
            .build()
            .unwrap();
        for node in ring.node_ids() {
            ring.finger_table_mut(node).unwrap().clear();
        }
        let before = ring.fallbacks();

        let route = ring.find_successor(id(190), Some(id(5))).unwrap();
        assert_eq!(route.node, Some(id(195)));
        assert_eq!(route.hops, 5);
        assert_eq!(ring.fallbacks(), before + 1);
    }
}
