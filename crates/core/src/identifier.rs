//! Identifier space of the ring.
//!
//! Identifiers are points on a circle of `2^m` positions. Node ids and keys
//! share the same space; a key is owned by the first node at or after it in
//! clockwise order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RingError};

/// Largest supported ring width.
pub const MAX_BITS: u8 = 128;

/// A point on the ring.
///
/// Newtype over `u128` so comparisons and hashing stay trivial. The value is
/// only meaningful together with the [`IdSpace`] that produced it.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Identifier(pub u128);

impl Identifier {
    #[inline]
    pub fn value(self) -> u128 {
        self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Identifier {
    fn from(value: u128) -> Self {
        Identifier(value)
    }
}

/// Circular identifier space `[0, 2^bits)`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct IdSpace {
    bits: u8,
    mask: u128,
}

impl IdSpace {
    /// Creates a space of `bits` width. `bits` must be in `1..=128`.
    pub fn new(bits: u8) -> Result<Self> {
        if bits == 0 || bits > MAX_BITS {
            return Err(RingError::InvalidConfig(format!(
                "ring width must be between 1 and {MAX_BITS} bits, got {bits}"
            )));
        }
        let mask = if bits == MAX_BITS {
            u128::MAX
        } else {
            (1u128 << bits) - 1
        };
        Ok(Self { bits, mask })
    }

    #[inline]
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Largest identifier in the space.
    #[inline]
    pub fn max_id(&self) -> Identifier {
        Identifier(self.mask)
    }

    /// Reduces an arbitrary value into the space (`value mod 2^bits`).
    #[inline]
    pub fn wrap(&self, value: u128) -> Identifier {
        Identifier(value & self.mask)
    }

    #[inline]
    pub fn contains(&self, value: u128) -> bool {
        value <= self.mask
    }

    /// Accepts a raw key only if it already lies in the space.
    pub fn checked(&self, value: u128) -> Result<Identifier> {
        if self.contains(value) {
            Ok(Identifier(value))
        } else {
            Err(RingError::KeyOutOfRange {
                key: value,
                bits: self.bits,
            })
        }
    }

    /// Start of finger `index` for node `id`: `(id + 2^index) mod 2^bits`.
    #[inline]
    pub fn finger_start(&self, id: Identifier, index: u8) -> Identifier {
        debug_assert!(index < self.bits);
        self.wrap(id.0.wrapping_add(1u128 << index))
    }

    /// Clockwise distance from `from` to `to`.
    #[inline]
    pub fn distance(&self, from: Identifier, to: Identifier) -> u128 {
        to.0.wrapping_sub(from.0) & self.mask
    }

    /// True iff `key` lies in the circular arc `(start, end]`.
    ///
    /// When `start >= end` the arc wraps through zero, so `start == end`
    /// covers the whole ring.
    #[inline]
    pub fn in_interval(key: Identifier, start: Identifier, end: Identifier) -> bool {
        if start < end {
            start < key && key <= end
        } else {
            key > start || key <= end
        }
    }

    /// True iff `key` lies in the circular open arc `(start, end)`.
    ///
    /// `start == end` denotes the whole ring minus `start` itself.
    #[inline]
    pub fn in_open_interval(key: Identifier, start: Identifier, end: Identifier) -> bool {
        if start < end {
            start < key && key < end
        } else {
            key > start || key < end
        }
    }
}
