//! XXH3 partitioner.

use crate::partitioner::traits::Partitioner;
use xxhash_rust::xxh3::xxh3_128;

/// Non-cryptographic 128-bit XXH3. Fastest of the built-in partitioners.
#[derive(Clone, Copy, Debug, Default)]
pub struct Xxh3Partitioner;

impl Partitioner for Xxh3Partitioner {
    fn partition(&self, key: &[u8]) -> u128 {
        xxh3_128(key)
    }

    fn name(&self) -> &'static str {
        "Xxh3Partitioner"
    }
}
