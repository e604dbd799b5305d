//! Results of ring operations.
//!
//! Each carries the overlay hop count of the routing it needed. "Nothing
//! there" (empty ring, unknown node, missing key) is an outcome, not an
//! error.

use serde::Serialize;

use crate::identifier::Identifier;
use crate::record::Record;

/// Where routing ended and what it cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Owner of the key, `None` on an empty ring.
    pub node: Option<Identifier>,
    pub hops: usize,
}

impl Route {
    pub(crate) fn none() -> Self {
        Self {
            node: None,
            hops: 0,
        }
    }

    pub(crate) fn found(node: Identifier, hops: usize) -> Self {
        Self {
            node: Some(node),
            hops,
        }
    }
}

/// Records found under a key.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Lookup {
    pub node: Option<Identifier>,
    pub hops: usize,
    /// Oldest first; several when names collide on one key.
    pub records: Vec<Record>,
}

impl Lookup {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    /// False when no record exists under the key.
    pub updated: bool,
    pub hops: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct JoinOutcome {
    pub node: Identifier,
    /// Hops to locate the new node's successor before attaching.
    pub locate_hops: usize,
    /// Hops spent routing the migrated keys.
    pub migrate_hops: usize,
    /// Records moved from the successor into the new node.
    pub moved: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LeaveOutcome {
    /// False when no node with that id was a member.
    pub left: bool,
    pub routing_hops: usize,
    /// Records handed over to the successor.
    pub moved: usize,
}

impl LeaveOutcome {
    pub(crate) fn not_found() -> Self {
        Self {
            left: false,
            routing_hops: 0,
            moved: 0,
        }
    }
}
