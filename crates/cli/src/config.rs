//! Command-line configuration.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chord_core::{PartitionerKind, RingConfig};
use clap::Parser;

use crate::commands::Command;

/// Simulate a Chord ring and report routing costs.
#[derive(Debug, Parser)]
#[command(name = "chord-sim", version, about)]
pub struct CliConfig {
    /// JSON ring configuration (fields: bits, partitioner, hop_budget_factor, min_hop_budget).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Ring width in bits; overrides the config file.
    #[arg(long, global = true)]
    pub bits: Option<u8>,

    /// Hash used to place names: blake3, xxh3 or sip.
    #[arg(long, global = true)]
    pub partitioner: Option<PartitionerKind>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Config file (if any) with command-line overrides applied.
    pub fn ring_config(&self) -> anyhow::Result<RingConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                RingConfig::from_json(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => RingConfig::default(),
        };
        if let Some(bits) = self.bits {
            config.bits = bits;
        }
        if let Some(partitioner) = self.partitioner {
            config.partitioner = partitioner;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let config = self.ring_config()?;
        let result = self.command.execute(config)?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        Ok(())
    }
}
