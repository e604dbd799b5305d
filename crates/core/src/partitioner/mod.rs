//! Partitioner abstraction for the ring.
//!
//! Partitioners turn logical names (titles, node labels) into ring
//! identifiers. The hash primitive itself is pluggable; the ring only relies
//! on it being deterministic.

pub mod blake3;
pub mod sip;
pub mod traits;
pub mod xxh3;

pub use self::blake3::Blake3Partitioner;
pub use self::sip::SipPartitioner;
pub use self::traits::Partitioner;
pub use self::xxh3::Xxh3Partitioner;
