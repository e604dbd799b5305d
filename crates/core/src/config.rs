//! Ring configuration.
//!
//! Loaded from JSON (or built in code) and consumed by
//! [`crate::ring::RingBuilder`]. Every field has a default, so `{}` is a
//! valid configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RingError};
use crate::identifier::IdSpace;
use crate::partitioner::{Blake3Partitioner, Partitioner, SipPartitioner, Xxh3Partitioner};

/// Built-in hash primitives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionerKind {
    #[default]
    Blake3,
    Xxh3,
    Sip,
}

impl PartitionerKind {
    pub fn build(self) -> Arc<dyn Partitioner> {
        match self {
            PartitionerKind::Blake3 => Arc::new(Blake3Partitioner),
            PartitionerKind::Xxh3 => Arc::new(Xxh3Partitioner),
            PartitionerKind::Sip => Arc::new(SipPartitioner),
        }
    }
}

impl fmt::Display for PartitionerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PartitionerKind::Blake3 => "blake3",
            PartitionerKind::Xxh3 => "xxh3",
            PartitionerKind::Sip => "sip",
        };
        f.write_str(name)
    }
}

impl FromStr for PartitionerKind {
    type Err = RingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "blake3" => Ok(PartitionerKind::Blake3),
            "xxh3" => Ok(PartitionerKind::Xxh3),
            "sip" => Ok(PartitionerKind::Sip),
            other => Err(RingError::InvalidConfig(format!(
                "unknown partitioner `{other}` (expected blake3, xxh3 or sip)"
            ))),
        }
    }
}

/// Tunables of a [`crate::ChordRing`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Ring width `m`: identifiers live in `[0, 2^m)`.
    pub bits: u8,
    /// Hash used to place names on the ring.
    pub partitioner: PartitionerKind,
    /// Finger routing gives up after `hop_budget_factor * ring size` hops...
    pub hop_budget_factor: usize,
    /// ...or `min_hop_budget` hops, whichever is larger.
    pub min_hop_budget: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            bits: 40,
            partitioner: PartitionerKind::default(),
            hop_budget_factor: 4,
            min_hop_budget: 4,
        }
    }
}

impl RingConfig {
    pub fn with_bits(bits: u8) -> Self {
        Self {
            bits,
            ..Self::default()
        }
    }

    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: RingConfig =
            serde_json::from_str(text).map_err(|e| RingError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        IdSpace::new(self.bits)?;
        if self.min_hop_budget == 0 {
            return Err(RingError::InvalidConfig(
                "min_hop_budget must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Hops finger routing may take on a ring of `ring_size` nodes before
    /// the linear scan takes over.
    #[inline]
    pub fn hop_budget(&self, ring_size: usize) -> usize {
        self.min_hop_budget
            .max(self.hop_budget_factor.saturating_mul(ring_size))
    }
}
