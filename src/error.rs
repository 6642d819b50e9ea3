//! Error types shared across the node.
//!
//! Each layer owns one enum: configuration problems are fatal at startup,
//! storage and forwarding problems are returned to whoever issued the request.
//! `NotFound` is deliberately absent: a missing key is a normal `Get` outcome.

use std::time::Duration;
use thiserror::Error;

/// Malformed or inconsistent cluster configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no shards configured")]
    NoShards,
    #[error("duplicate shard index: {0}")]
    DuplicateIndex(usize),
    #[error("shard {0} is not found")]
    MissingIndex(usize),
    #[error("shard {0:?} was not found")]
    UnknownLocalShard(String),
    #[error("shard name {0:?} is configured more than once")]
    DuplicateName(String),
    #[error("could not read config file {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("could not parse config: {0}")]
    Parse(String),
}

/// Failure of the local storage engine.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(#[from] fjall::Error),
    #[error("stored key is not valid UTF-8")]
    InvalidKey,
    #[error("stored value for {0:?} is not valid UTF-8")]
    InvalidValue(String),
    #[error("storage task failed: {0}")]
    Task(String),
}

/// Failure while proxying a request to the owning shard.
#[derive(Error, Debug)]
pub enum ForwardingError {
    #[error("no address configured for shard {0}")]
    UnknownShard(usize),
    #[error("request to shard {shard} at {address} failed: {source}")]
    Transport {
        shard: usize,
        address: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to shard {shard} at {address} timed out after {timeout:?}")]
    Timeout {
        shard: usize,
        address: String,
        timeout: Duration,
    },
    #[error("shard {shard} responded with status {status}: {body}")]
    Status {
        shard: usize,
        status: u16,
        body: String,
    },
    #[error("shard {shard} sent a malformed response: {reason}")]
    Malformed { shard: usize, reason: String },
}

/// Error returned by router operations.
#[derive(Error, Debug)]
pub enum KvError {
    /// Values cross the HTTP surface as text, so only UTF-8 values are accepted.
    #[error("value for {0:?} is not valid UTF-8")]
    NonUtf8Value(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Forwarding(#[from] ForwardingError),
}
