//! Request Protocol
//!
//! Endpoints, headers and JSON bodies of the node's HTTP surface. Peers talk to
//! each other through the very same endpoints: a forwarded request is the
//! client's request replayed against the owner.

use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Read a key from whichever shard owns it.
pub const ENDPOINT_GET: &str = "/get";
/// Store a value under a key on the owning shard (GET or POST).
pub const ENDPOINT_SET: &str = "/set";
/// Remove a key from the owning shard (GET or POST).
pub const ENDPOINT_DELETE: &str = "/delete";
/// Drop local keys owned by other shards. Affects the receiving node only.
pub const ENDPOINT_PURGE: &str = "/purge";
/// Identity and key count of the receiving node.
pub const ENDPOINT_HEALTH: &str = "/health";

// --- Headers ---

/// Number of forwarding hops a request has already taken.
pub const HEADER_HOPS: &str = "x-shard-hops";
/// Correlates the log lines of a request across shards.
pub const HEADER_REQUEST_ID: &str = "x-request-id";
/// Index of the shard that executed the operation.
pub const HEADER_SERVED_BY: &str = "x-shard-served-by";
/// Set on relayed responses: the shard the request was forwarded to.
pub const HEADER_REDIRECTED_TO: &str = "x-shard-redirected-to";

// --- Data Transfer Objects ---

/// Query string of the key endpoints.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct KeyParams {
    pub key: Option<String>,
    pub value: Option<String>,
}

/// Result of a read. `found: false` with `value: None` is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Option<String>,
    pub found: bool,
    pub shard: usize,
}

/// Acknowledgment of a set or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResponse {
    pub key: String,
    pub shard: usize,
    pub success: bool,
}

/// Body of every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub name: String,
    pub shard: usize,
    pub count: usize,
    pub keys: usize,
}
