//! BLAKE3 partitioner.

use crate::partitioner::traits::Partitioner;

/// Uses the leading 16 bytes of the BLAKE3 digest.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Partitioner;

impl Partitioner for Blake3Partitioner {
    fn partition(&self, key: &[u8]) -> u128 {
        let digest = ::blake3::hash(key);
        let mut head = [0u8; 16];
        head.copy_from_slice(&digest.as_bytes()[..16]);
        u128::from_be_bytes(head)
    }

    fn name(&self) -> &'static str {
        "Blake3Partitioner"
    }
}
