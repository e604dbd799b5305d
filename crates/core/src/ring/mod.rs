//! Chord ring implementation.
//!
//! The ring keeps its members sorted by identifier and answers "who owns
//! this key" by finger-table routing, counting overlay hops as it goes.
//! Membership changes relink neighbours, migrate keys and rebuild every
//! finger table before returning.

pub mod finger;
mod membership;
pub mod outcome;
#[allow(clippy::module_inception)]
pub mod ring;
mod routing;

pub use finger::FingerTable;
pub use outcome::{JoinOutcome, LeaveOutcome, Lookup, Route, UpdateOutcome};
pub use ring::{ChordRing, RingBuilder};
