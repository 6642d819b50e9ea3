use super::peer::{ForwardedResponse, PeerClient};
use super::protocol::{ENDPOINT_DELETE, ENDPOINT_GET, ENDPOINT_SET, GetResponse, WriteResponse};
use crate::error::{ForwardingError, KvError, StorageError};
use crate::reconciler::{PurgeReport, Reconciler};
use crate::sharding::ShardTable;
use crate::storage::StorageEngine;

use reqwest::Method;
use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Where a key's operations have to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Local,
    Remote(usize),
}

/// Result of `get`. `value: None` means the key does not exist on its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub value: Option<Vec<u8>>,
    pub shard: usize,
    pub redirected: bool,
}

impl Lookup {
    pub fn found(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteAck {
    pub shard: usize,
    pub redirected: bool,
}

/// Serves keys owned by this shard and forwards everything else to its owner.
pub struct ShardRouter {
    table: Arc<ShardTable>,
    storage: Arc<dyn StorageEngine>,
    peers: PeerClient,
    reconciler: Reconciler,
}

impl ShardRouter {
    pub fn new(
        table: ShardTable,
        storage: Arc<dyn StorageEngine>,
        forward_timeout: Duration,
    ) -> Self {
        let table = Arc::new(table);
        let reconciler = Reconciler::new(table.clone(), storage.clone());
        Self {
            table,
            storage,
            peers: PeerClient::new(forward_timeout),
            reconciler,
        }
    }

    pub fn table(&self) -> &ShardTable {
        &self.table
    }

    pub fn storage(&self) -> &Arc<dyn StorageEngine> {
        &self.storage
    }

    pub fn current_index(&self) -> usize {
        self.table.current_index()
    }

    pub fn route(&self, key: &str) -> Route {
        if self.table.is_local(key) {
            Route::Local
        } else {
            Route::Remote(self.table.resolve_shard(key))
        }
    }

    // Storage calls may fsync, so they run on the blocking pool rather than on a
    // runtime worker shared with other requests.

    pub async fn get_local(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let key = key.to_string();
        self.with_storage(move |storage| storage.get(&key)).await
    }

    pub async fn set_local(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let key = key.to_string();
        let value = value.to_vec();
        self.with_storage(move |storage| storage.set(&key, &value)).await
    }

    pub async fn delete_local(&self, key: &str) -> Result<(), StorageError> {
        let key = key.to_string();
        self.with_storage(move |storage| storage.delete(&key)).await
    }

    pub async fn len_local(&self) -> Result<usize, StorageError> {
        self.with_storage(|storage| storage.len()).await
    }

    async fn with_storage<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn StorageEngine) -> Result<T, StorageError> + Send + 'static,
    {
        let storage = self.storage.clone();
        tokio::task::spawn_blocking(move || op(storage.as_ref()))
            .await
            .map_err(|e| StorageError::Task(e.to_string()))?
    }

    /// Replays a request against `shard`. The raw answer is returned for relaying.
    /// `body` is sent as is, tagged with `content_type` when present.
    pub async fn forward(
        &self,
        shard: usize,
        method: Method,
        path_and_query: &str,
        content_type: Option<HeaderValue>,
        body: Vec<u8>,
        request_id: &str,
    ) -> Result<ForwardedResponse, ForwardingError> {
        tracing::info!(
            "Redirecting from shard {} to shard {} [{}] {} {}",
            self.table.current_index(),
            shard,
            request_id,
            method,
            path_and_query
        );

        let forwarded = self
            .peers
            .forward(
                &self.table,
                shard,
                method,
                path_and_query,
                content_type,
                body,
                request_id,
            )
            .await;

        if let Err(e) = &forwarded {
            tracing::error!("Forward to shard {} failed [{}]: {}", shard, request_id, e);
        }
        forwarded
    }

    pub async fn get(&self, key: &str) -> Result<Lookup, KvError> {
        match self.route(key) {
            Route::Local => Ok(Lookup {
                value: self.get_local(key).await?,
                shard: self.table.current_index(),
                redirected: false,
            }),
            Route::Remote(shard) => {
                let path = format!("{}?key={}", ENDPOINT_GET, urlencoding::encode(key));
                let response: GetResponse = self.forward_json(shard, Method::GET, &path).await?;

                if response.found != response.value.is_some() {
                    return Err(ForwardingError::Malformed {
                        shard,
                        reason: format!("found={} disagrees with the returned value", response.found),
                    }
                    .into());
                }

                Ok(Lookup {
                    value: response.value.map(String::into_bytes),
                    shard: response.shard,
                    redirected: true,
                })
            }
        }
    }

    /// Stores `value` on the owner of `key`. Non-UTF-8 values are refused on every
    /// node so the stored bytes never depend on which node took the request.
    pub async fn set(&self, key: &str, value: &[u8]) -> Result<WriteAck, KvError> {
        let Ok(value) = std::str::from_utf8(value) else {
            return Err(KvError::NonUtf8Value(key.to_string()));
        };

        match self.route(key) {
            Route::Local => {
                self.set_local(key, value.as_bytes()).await?;
                Ok(self.local_ack())
            }
            Route::Remote(shard) => {
                let path = format!(
                    "{}?key={}&value={}",
                    ENDPOINT_SET,
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                );
                let response: WriteResponse = self.forward_json(shard, Method::POST, &path).await?;
                Ok(WriteAck {
                    shard: response.shard,
                    redirected: true,
                })
            }
        }
    }

    pub async fn delete(&self, key: &str) -> Result<WriteAck, KvError> {
        match self.route(key) {
            Route::Local => {
                self.delete_local(key).await?;
                Ok(self.local_ack())
            }
            Route::Remote(shard) => {
                let path = format!("{}?key={}", ENDPOINT_DELETE, urlencoding::encode(key));
                let response: WriteResponse = self.forward_json(shard, Method::POST, &path).await?;
                Ok(WriteAck {
                    shard: response.shard,
                    redirected: true,
                })
            }
        }
    }

    /// Drops local keys owned by other shards. Runs on the blocking pool since it
    /// walks the whole keyspace.
    pub async fn purge(&self) -> Result<PurgeReport, KvError> {
        let reconciler = self.reconciler.clone();
        let report = tokio::task::spawn_blocking(move || reconciler.purge_misplaced_keys())
            .await
            .map_err(|e| StorageError::Task(e.to_string()))??;
        Ok(report)
    }

    fn local_ack(&self) -> WriteAck {
        WriteAck {
            shard: self.table.current_index(),
            redirected: false,
        }
    }

    async fn forward_json<T: DeserializeOwned>(
        &self,
        shard: usize,
        method: Method,
        path_and_query: &str,
    ) -> Result<T, ForwardingError> {
        let request_id = Uuid::new_v4().to_string();
        let forwarded = self
            .forward(shard, method, path_and_query, None, Vec::new(), &request_id)
            .await?;

        if !forwarded.status.is_success() {
            return Err(ForwardingError::Status {
                shard,
                status: forwarded.status.as_u16(),
                body: forwarded.body_text(),
            });
        }

        serde_json::from_slice(&forwarded.body).map_err(|e| ForwardingError::Malformed {
            shard,
            reason: e.to_string(),
        })
    }
}
