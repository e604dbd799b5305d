//! CLI entry point for the Chord ring simulator.

use chord_cli::CliConfig;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    chord_cli::init_logging(&config.log_level);
    config.run()
}
