use super::StorageEngine;
use crate::error::StorageError;

use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    local_data: Arc<DashMap<String, Vec<u8>>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageEngine for MemoryEngine {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.local_data.get(key).map(|value| value.clone()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.local_data.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.local_data.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self
            .local_data
            .iter()
            .map(|entry| entry.key().clone())
            .collect())
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.local_data.len())
    }
}
