//! Local Storage Module
//!
//! The router only needs a small capability from the node's storage: point reads,
//! durable point writes, deletes and a full key scan for purging.
//!
//! ## Engines
//! - **`DiskEngine`**: fjall keyspace on disk; every write is synced before it returns.
//! - **`MemoryEngine`**: concurrent map, used for tests and throwaway nodes.
//!
//! Absence and emptiness are distinct: `Ok(Some(vec![]))` is a stored empty value,
//! `Ok(None)` means the key does not exist.

pub mod disk;
pub mod memory;

pub use disk::DiskEngine;
pub use memory::MemoryEngine;

use crate::error::StorageError;

pub trait StorageEngine: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    /// Must be durable before returning `Ok`.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
    /// Removing an absent key succeeds.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
    /// Every key currently stored, in no particular order.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
    fn len(&self) -> Result<usize, StorageError>;

    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests;
