//! Core library for the Chord ring simulator.
//!
//! This crate provides the pieces of a Chord-style distributed hash table
//! running in a single process:
//! - Identifier space and circular interval arithmetic
//! - Pluggable partitioners (hash primitives)
//! - Per-node storage backends and records
//! - Finger-table routing with a linear-scan fallback
//! - Membership changes with key migration
//! - A lock-guarded handle for concurrent use

pub mod config;
pub mod error;
pub mod identifier;
pub mod node;
pub mod partitioner;
pub mod record;
pub mod ring;
pub mod shared;
pub mod storage;

pub use config::{PartitionerKind, RingConfig};
pub use error::{Result, RingError};
pub use identifier::{IdSpace, Identifier};
pub use node::RingNode;
pub use partitioner::Partitioner;
pub use record::Record;
pub use ring::{ChordRing, JoinOutcome, LeaveOutcome, Lookup, RingBuilder, Route, UpdateOutcome};
pub use shared::SharedRing;
pub use storage::{MemStore, StorageBackend};
