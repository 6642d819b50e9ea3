use crate::config::ShardDescriptor;
use crate::error::ConfigError;
use std::collections::HashMap;

/// Immutable mapping from shard index to address, plus the identity of the local shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardTable {
    count: usize,
    current_index: usize,
    current_name: String,
    addrs: Vec<String>,
}

impl ShardTable {
    /// Validates the descriptors and builds the table for the shard named `local_name`.
    pub fn build(shards: &[ShardDescriptor], local_name: &str) -> Result<Self, ConfigError> {
        if shards.is_empty() {
            return Err(ConfigError::NoShards);
        }

        let count = shards.len();
        let mut by_index: HashMap<usize, &str> = HashMap::with_capacity(count);
        let mut current_index = None;

        for shard in shards {
            if by_index.insert(shard.idx, shard.address.as_str()).is_some() {
                return Err(ConfigError::DuplicateIndex(shard.idx));
            }
            if shard.name == local_name {
                if current_index.is_some() {
                    return Err(ConfigError::DuplicateName(shard.name.clone()));
                }
                current_index = Some(shard.idx);
            }
        }

        let mut addrs = Vec::with_capacity(count);
        for idx in 0..count {
            match by_index.get(&idx) {
                Some(addr) => addrs.push(addr.to_string()),
                None => return Err(ConfigError::MissingIndex(idx)),
            }
        }

        let current_index =
            current_index.ok_or_else(|| ConfigError::UnknownLocalShard(local_name.to_string()))?;

        Ok(Self {
            count,
            current_index,
            current_name: local_name.to_string(),
            addrs,
        })
    }

    /// Index of the shard that owns `key`. Depends on the key and the shard count only.
    pub fn resolve_shard(&self, key: &str) -> usize {
        (fnv1a_hash64(key.as_bytes()) % self.count as u64) as usize
    }

    pub fn is_local(&self, key: &str) -> bool {
        self.resolve_shard(key) == self.current_index
    }

    pub fn address_of(&self, index: usize) -> Option<&str> {
        self.addrs.get(index).map(String::as_str)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_name(&self) -> &str {
        &self.current_name
    }
}

/// 64-bit FNV-1a. Changing it re-homes almost every key in the cluster.
pub fn fnv1a_hash64(data: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 14695981039346656037;
    const FNV_PRIME: u64 = 1099511628211;
    let mut hash = FNV_OFFSET;
    for byte in data {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
