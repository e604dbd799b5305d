//! SipHash partitioner.

use crate::partitioner::traits::Partitioner;
use siphasher::sip128::{Hasher128, SipHasher13};
use std::hash::Hasher;

/// SipHash-1-3 with the 128-bit output and zero keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct SipPartitioner;

impl Partitioner for SipPartitioner {
    fn partition(&self, key: &[u8]) -> u128 {
        let mut hasher = SipHasher13::new();
        hasher.write(key);
        hasher.finish128().as_u128()
    }

    fn name(&self) -> &'static str {
        "SipPartitioner"
    }
}
