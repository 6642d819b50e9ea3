//! Reconciliation Module
//!
//! After the shard count changes, keys that used to live here may now belong to
//! another shard. `purge_misplaced_keys` drops them locally. Nothing is copied to the
//! new owner; moving data is left to the operator.
//!
//! The sweep is not a snapshot: it scans, then deletes key by key while ordinary
//! traffic keeps flowing.

use crate::error::StorageError;
use crate::sharding::ShardTable;
use crate::storage::StorageEngine;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of one purge pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeReport {
    pub shard: usize,
    pub scanned: usize,
    pub purged: usize,
    /// Keys judged misplaced whose delete failed.
    pub failed: Vec<String>,
}

impl PurgeReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Clone)]
pub struct Reconciler {
    table: Arc<ShardTable>,
    storage: Arc<dyn StorageEngine>,
}

impl Reconciler {
    pub fn new(table: Arc<ShardTable>, storage: Arc<dyn StorageEngine>) -> Self {
        Self { table, storage }
    }

    /// Deletes every local key owned by another shard. Only a failed scan is an error;
    /// failed deletes are collected in the report and the sweep carries on.
    pub fn purge_misplaced_keys(&self) -> Result<PurgeReport, StorageError> {
        let current = self.table.current_index();
        let keys = self.storage.keys()?;

        let mut report = PurgeReport {
            shard: current,
            scanned: keys.len(),
            ..Default::default()
        };

        for key in keys {
            let owner = self.table.resolve_shard(&key);
            if owner == current {
                continue;
            }

            match self.storage.delete(&key) {
                Ok(()) => {
                    tracing::debug!("PURGE: Dropped {:?} (owned by shard {})", key, owner);
                    report.purged += 1;
                }
                Err(e) => {
                    tracing::warn!("PURGE: Failed to delete {:?}: {}", key, e);
                    report.failed.push(key);
                }
            }
        }

        tracing::info!(
            "Purge on shard {}: scanned {}, purged {}, failed {}",
            current,
            report.scanned,
            report.purged,
            report.failed.len()
        );

        Ok(report)
    }
}
