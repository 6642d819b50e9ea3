//! Statically Sharded Key-Value Store
//!
//! A fixed set of nodes, each owning the keys that hash to its shard index. Any node
//! accepts any request and forwards it to the owner when needed. The binary
//! (`main.rs`) wires these modules into an HTTP server.
//!
//! ## Modules
//! - **`config`**: cluster file (TOML) and node command line.
//! - **`sharding`**: the immutable shard table and key ownership (FNV-1a, mod count).
//! - **`storage`**: the local storage engine interface and its disk/memory engines.
//! - **`router`**: local execution, single-hop forwarding and the HTTP handlers.
//! - **`reconciler`**: purging keys that belong to other shards after a topology change.
//! - **`error`**: error types for each layer.

pub mod config;
pub mod error;
pub mod reconciler;
pub mod router;
pub mod sharding;
pub mod storage;
