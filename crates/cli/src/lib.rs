//! CLI tool for driving a simulated Chord ring.
//!
//! Provides commands for:
//! - Running a join/insert/lookup/leave workload and reporting hop costs
//! - Routing a single key across a hand-picked ring

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;

use tracing_subscriber::EnvFilter;

/// Installs the `tracing` subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
