use crate::error::ConfigError;
use crate::sharding::ShardTable;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_FORWARD_TIMEOUT_MS: u64 = 5_000;

/// One participant in the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardDescriptor {
    pub name: String,
    pub idx: usize,
    pub address: String,
}

/// Contents of the cluster file. Must be identical on every node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default)]
    pub forward_timeout_ms: Option<u64>,
    #[serde(default)]
    pub shards: Vec<ShardDescriptor>,
}

impl ClusterConfig {
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&raw)
    }

    pub fn shard_table(&self, local_name: &str) -> Result<ShardTable, ConfigError> {
        ShardTable::build(&self.shards, local_name)
    }

    pub fn forward_timeout(&self) -> Duration {
        Duration::from_millis(self.forward_timeout_ms.unwrap_or(DEFAULT_FORWARD_TIMEOUT_MS))
    }
}

/// Command line of a shard node.
#[derive(Debug, Clone, Parser)]
#[command(name = "shardkv", about = "Statically sharded key-value node")]
pub struct NodeArgs {
    /// The database location
    #[arg(long, required_unless_present = "in_memory")]
    pub db_path: Option<PathBuf>,

    /// The HTTP host and port
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub http_addr: SocketAddr,

    /// Static sharding config file
    #[arg(long, default_value = "sharding.toml")]
    pub config_file: PathBuf,

    /// The name of the shard served by this process
    #[arg(long)]
    pub shard: String,

    /// Deadline for requests forwarded to other shards (overrides the config file)
    #[arg(long)]
    pub forward_timeout_ms: Option<u64>,

    /// Keep data in memory only (nothing survives a restart)
    #[arg(long)]
    pub in_memory: bool,

    /// Log at debug level
    #[arg(long, short)]
    pub verbose: bool,
}

impl NodeArgs {
    pub fn forward_timeout(&self, config: &ClusterConfig) -> Duration {
        match self.forward_timeout_ms {
            Some(ms) => Duration::from_millis(ms),
            None => config.forward_timeout(),
        }
    }
}
