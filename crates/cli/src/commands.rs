//! Subcommands and their JSON reports.

use anyhow::{bail, Context};
use chord_core::{
    ChordRing, Identifier, JoinOutcome, LeaveOutcome, Record, RingBuilder, RingConfig, RingError,
};
use clap::Subcommand;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a ring, load records, then churn membership and report hop costs.
    Simulate {
        /// Nodes joined before loading, placed by hashing `node-<i>`.
        #[arg(long, default_value_t = 32)]
        nodes: usize,

        /// Records inserted, named `movie-<i>`.
        #[arg(long, default_value_t = 1000)]
        keys: usize,

        /// Node id joining after the load; repeatable.
        #[arg(long = "join")]
        joins: Vec<u128>,

        /// Node id leaving after the joins; repeatable.
        #[arg(long = "leave")]
        leaves: Vec<u128>,
    },

    /// Route one key across a ring made of the given node ids.
    Route {
        /// Member node id; repeatable.
        #[arg(long = "node", required = true)]
        nodes: Vec<u128>,

        /// Name to hash, or a raw identifier with `--raw`.
        #[arg(long)]
        key: String,

        /// Treat `key` as an identifier instead of a name.
        #[arg(long)]
        raw: bool,

        /// Node the walk starts from; the lowest id by default.
        #[arg(long)]
        start: Option<u128>,
    },
}

/// Report printed after a command.
#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CommandResult {
    Simulate(SimulationReport),
    Route(RouteReport),
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub bits: u8,
    pub partitioner: &'static str,
    pub nodes: usize,
    pub records: usize,
    pub insert: HopStats,
    pub lookup: HopStats,
    pub update: HopStats,
    pub joins: Vec<JoinOutcome>,
    pub leaves: Vec<LeaveOutcome>,
    /// Records no longer reachable by name after churn.
    pub lost: usize,
    pub fallbacks: u64,
    pub max_load: usize,
    pub min_load: usize,
}

#[derive(Debug, Serialize)]
pub struct RouteReport {
    pub key: Identifier,
    pub owner: Option<Identifier>,
    pub hops: usize,
    /// Owner according to a scan of the membership list.
    pub expected: Option<Identifier>,
}

/// Hop totals for one kind of operation.
#[derive(Debug, Default, Serialize)]
pub struct HopStats {
    pub operations: usize,
    pub total_hops: usize,
    pub max_hops: usize,
    pub mean_hops: f64,
}

impl HopStats {
    fn record(&mut self, hops: usize) {
        self.operations += 1;
        self.total_hops += hops;
        self.max_hops = self.max_hops.max(hops);
        self.mean_hops = self.total_hops as f64 / self.operations as f64;
    }
}

impl Command {
    pub fn execute(&self, config: RingConfig) -> anyhow::Result<CommandResult> {
        match self {
            Command::Simulate {
                nodes,
                keys,
                joins,
                leaves,
            } => simulate(config, *nodes, *keys, joins, leaves).map(CommandResult::Simulate),
            Command::Route {
                nodes,
                key,
                raw,
                start,
            } => route(config, nodes, key, *raw, *start).map(CommandResult::Route),
        }
    }
}

fn record_name(i: usize) -> String {
    format!("movie-{i}")
}

fn simulate(
    config: RingConfig,
    nodes: usize,
    keys: usize,
    joins: &[u128],
    leaves: &[u128],
) -> anyhow::Result<SimulationReport> {
    if nodes == 0 {
        bail!("a simulation needs at least one node");
    }
    let mut ring = ChordRing::new(config)?;

    for i in 0..nodes {
        let id = ring.hash(format!("node-{i}"));
        match ring.join(id, None) {
            Ok(_) => {}
            Err(RingError::DuplicateNode(id)) => warn!(node = %id, "node id collision, skipped"),
            Err(e) => return Err(e.into()),
        }
    }
    info!(nodes = ring.len(), keys, "ring built, loading records");

    let mut insert = HopStats::default();
    for i in 0..keys {
        let name = record_name(i);
        let record = Record::new().with("title", name.as_str()).with("index", i);
        insert.record(ring.insert_by_name(&name, record, None)?.hops);
    }

    let mut lookup = HopStats::default();
    let mut update = HopStats::default();
    for i in 0..keys {
        let name = record_name(i);
        lookup.record(ring.lookup_by_name(&name, None)?.hops);
        update.record(ring.update_field(&name, "views", i, None)?.hops);
    }

    let joined = joins
        .iter()
        .map(|&id| ring.join(Identifier(id), None))
        .collect::<Result<Vec<_>, _>>()
        .context("joining extra nodes")?;
    let left = leaves
        .iter()
        .map(|&id| ring.leave(Identifier(id), None))
        .collect::<Result<Vec<_>, _>>()
        .context("removing nodes")?;

    let mut lost = 0;
    for i in 0..keys {
        let found = ring.lookup_by_name(record_name(i), None)?;
        if !found.records.iter().any(|r| r.get("index") == Some(&json!(i))) {
            lost += 1;
        }
    }
    if lost > 0 {
        warn!(lost, "records unreachable after churn");
    }

    let loads: Vec<usize> = ring.nodes().map(|n| n.load()).collect();
    Ok(SimulationReport {
        bits: ring.space().bits(),
        partitioner: ring.partitioner_name(),
        nodes: ring.len(),
        records: ring.total_records(),
        insert,
        lookup,
        update,
        joins: joined,
        leaves: left,
        lost,
        fallbacks: ring.fallbacks(),
        max_load: loads.iter().copied().max().unwrap_or(0),
        min_load: loads.iter().copied().min().unwrap_or(0),
    })
}

fn route(
    config: RingConfig,
    nodes: &[u128],
    key: &str,
    raw: bool,
    start: Option<u128>,
) -> anyhow::Result<RouteReport> {
    let ring = RingBuilder::new()
        .with_config(config)
        .add_nodes(nodes.iter().copied().map(Identifier))
        .build()?;

    let key = if raw {
        let value: u128 = key
            .parse()
            .with_context(|| format!("`{key}` is not an identifier"))?;
        Identifier(value)
    } else {
        ring.hash(key)
    };

    let route = ring.find_successor(key, start.map(Identifier))?;
    Ok(RouteReport {
        key,
        owner: route.node,
        hops: route.hops,
        expected: ring.find_successor_linear(key),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulate_cmd(nodes: usize, keys: usize, joins: Vec<u128>, leaves: Vec<u128>) -> Command {
        Command::Simulate {
            nodes,
            keys,
            joins,
            leaves,
        }
    }

    #[test]
    fn test_simulation_keeps_every_record() {
        let cmd = simulate_cmd(16, 200, vec![12_345, 999_999], vec![12_345]);
        let CommandResult::Simulate(report) = cmd.execute(RingConfig::with_bits(24)).unwrap()
        else {
            panic!("expected a simulation report");
        };

        assert_eq!(report.records, 200);
        assert_eq!(report.lost, 0);
        assert_eq!(report.fallbacks, 0);
        assert_eq!(report.insert.operations, 200);
        assert_eq!(report.joins.len(), 2);
        assert!(report.leaves[0].left);
        assert!(report.lookup.max_hops <= 16);
    }

    #[test]
    fn test_simulation_needs_nodes() {
        assert!(simulate_cmd(0, 10, vec![], vec![])
            .execute(RingConfig::with_bits(16))
            .is_err());
    }

    #[test]
    fn test_join_out_of_range_reported() {
        let cmd = simulate_cmd(4, 10, vec![1 << 20], vec![]);
        assert!(cmd.execute(RingConfig::with_bits(16)).is_err());
    }

    #[test]
    fn test_route_raw_key() {
        let cmd = Command::Route {
            nodes: vec![10, 36, 59, 101],
            key: "40".into(),
            raw: true,
            start: Some(101),
        };
        let CommandResult::Route(report) = cmd.execute(RingConfig::with_bits(8)).unwrap() else {
            panic!("expected a route report");
        };
        assert_eq!(report.owner, Some(Identifier(59)));
        assert_eq!(report.owner, report.expected);
    }

    #[test]
    fn test_route_rejects_bad_identifier() {
        let cmd = Command::Route {
            nodes: vec![10],
            key: "forty".into(),
            raw: true,
            start: None,
        };
        assert!(cmd.execute(RingConfig::with_bits(8)).is_err());
    }

    #[test]
    fn test_report_serializes_with_tag() {
        let cmd = Command::Route {
            nodes: vec![10, 36],
            key: "Heat".into(),
            raw: false,
            start: None,
        };
        let result = cmd.execute(RingConfig::with_bits(8)).unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["command"], "route");
        assert!(value["owner"].is_number());
    }
}
