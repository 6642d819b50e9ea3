use super::protocol::{HEADER_HOPS, HEADER_REQUEST_ID, HEADER_SERVED_BY};
use crate::error::ForwardingError;
use crate::sharding::ShardTable;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, StatusCode};
use std::time::Duration;

/// A peer's answer, kept raw so it can be relayed without reinterpretation.
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub shard: usize,
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub served_by: Option<HeaderValue>,
    pub body: Vec<u8>,
}

impl ForwardedResponse {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Issues single-hop requests to other shards. No retries, no fallback shard.
#[derive(Debug, Clone)]
pub struct PeerClient {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl PeerClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Replays `method path_and_query` (and its body) against `shard` and returns whatever
    /// it answered, whatever the status. Only transport failures and timeouts are errors here.
    #[allow(clippy::too_many_arguments)]
    pub async fn forward(
        &self,
        table: &ShardTable,
        shard: usize,
        method: Method,
        path_and_query: &str,
        content_type: Option<HeaderValue>,
        body: Vec<u8>,
        request_id: &str,
    ) -> Result<ForwardedResponse, ForwardingError> {
        let address = table
            .address_of(shard)
            .ok_or(ForwardingError::UnknownShard(shard))?;
        let url = format!("http://{}{}", address, path_and_query);

        let mut request = self
            .http_client
            .request(method, url)
            .header(HEADER_HOPS, "1")
            .header(HEADER_REQUEST_ID, request_id)
            .timeout(self.timeout);
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.classify(shard, address, e))?;

        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let served_by = response.headers().get(HEADER_SERVED_BY).cloned();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.classify(shard, address, e))?
            .to_vec();

        Ok(ForwardedResponse {
            shard,
            status,
            content_type,
            served_by,
            body,
        })
    }

    fn classify(&self, shard: usize, address: &str, error: reqwest::Error) -> ForwardingError {
        if error.is_timeout() {
            ForwardingError::Timeout {
                shard,
                address: address.to_string(),
                timeout: self.timeout,
            }
        } else {
            ForwardingError::Transport {
                shard,
                address: address.to_string(),
                source: error,
            }
        }
    }
}
