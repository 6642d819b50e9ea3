use super::StorageEngine;
use crate::error::StorageError;

use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;

const DEFAULT_PARTITION: &str = "default";

/// Durable engine backed by a single fjall partition.
pub struct DiskEngine {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskEngine {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let keyspace = Config::new(path).open()?;
        let partition =
            keyspace.open_partition(DEFAULT_PARTITION, PartitionCreateOptions::default())?;
        tracing::info!("Opened storage at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
        })
    }

    fn sync(&self) -> Result<(), StorageError> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

impl StorageEngine for DiskEngine {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.partition.get(key.as_bytes())?.map(|value| value.to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.partition.insert(key.as_bytes(), value)?;
        self.sync()
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.partition.remove(key.as_bytes())?;
        self.sync()
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for item in self.partition.iter() {
            let (key, _) = item?;
            let key = String::from_utf8(key.to_vec()).map_err(|_| StorageError::InvalidKey)?;
            keys.push(key);
        }
        Ok(keys)
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.partition.len()?)
    }
}
