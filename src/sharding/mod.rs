//! Shard Membership Module
//!
//! Decides which shard owns a key. The table is built once from the cluster
//! configuration and never changes while the process is running.
//!
//! ## Core Concepts
//! - **Ownership**: `fnv1a(key) mod count`, computed over the UTF-8 bytes of the key.
//!   Every node must agree on this function, otherwise requests ping-pong or get lost.
//! - **Validation**: indices must densely cover `0..count` and the local shard name must
//!   match exactly one descriptor. An invalid table never serves traffic.

pub mod table;

pub use table::{ShardTable, fnv1a_hash64};

#[cfg(test)]
mod tests;
