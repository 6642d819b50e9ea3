//! Cluster Configuration Module
//!
//! Loads the static shard list from a TOML file and describes the node's
//! command line. Validation of the shard list itself lives in `sharding`.
//!
//! ```toml
//! forward_timeout_ms = 2000
//!
//! [[shards]]
//! name = "Minia"
//! idx = 0
//! address = "127.0.0.1:8080"
//!
//! [[shards]]
//! name = "Cairo"
//! idx = 1
//! address = "127.0.0.1:8081"
//! ```

pub mod types;

pub use types::{ClusterConfig, DEFAULT_FORWARD_TIMEOUT_MS, NodeArgs, ShardDescriptor};
