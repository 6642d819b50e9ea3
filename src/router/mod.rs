//! Request Routing Module
//!
//! Every node runs the same router. A request for a key owned by this shard is
//! executed against local storage; any other key is forwarded to its owner and the
//! owner's response is handed back to the caller untouched.
//!
//! ## Forwarding rules
//! - **Verbatim**: method, query string, body and content type are replayed unchanged.
//! - **Single hop**: there is no retry and no fallback shard. If the owner is down,
//!   its whole key range is unavailable and callers get an explicit error.
//! - **Bounded**: every forwarded request carries the node's forward timeout.
//! - **Loop guard**: forwarded requests are marked with `x-shard-hops`; a marked
//!   request for a key this shard does not own is rejected with 421 instead of
//!   bouncing between nodes that disagree about the shard table.
//! - **Cancellation**: if the client goes away, the handler future is dropped and the
//!   in-flight forward with it.

pub mod handlers;
pub mod peer;
pub mod protocol;
pub mod router;

pub use handlers::build_router;
pub use peer::{ForwardedResponse, PeerClient};
pub use router::{Lookup, Route, ShardRouter, WriteAck};
