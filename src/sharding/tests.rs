//! Shard Table Tests
//!
//! ## Test Scopes
//! - **Validation**: duplicate, missing and unknown shards are rejected at build time.
//! - **Resolution**: the owner of a key is deterministic and always in range.

#[cfg(test)]
mod tests {
    use crate::config::ShardDescriptor;
    use crate::error::ConfigError;
    use crate::sharding::{ShardTable, fnv1a_hash64};
    use std::collections::HashMap;

    fn shard(name: &str, idx: usize, address: &str) -> ShardDescriptor {
        ShardDescriptor {
            name: name.to_string(),
            idx,
            address: address.to_string(),
        }
    }

    fn two_shards() -> Vec<ShardDescriptor> {
        vec![
            shard("Minia", 0, "127.0.0.1:8080"),
            shard("Cairo", 1, "127.0.0.1:8081"),
        ]
    }

    // ============================================================
    // TABLE CONSTRUCTION
    // ============================================================

    #[test]
    fn test_build_valid_table() {
        let table = ShardTable::build(&two_shards(), "Cairo").unwrap();

        assert_eq!(table.count(), 2);
        assert_eq!(table.current_index(), 1);
        assert_eq!(table.current_name(), "Cairo");
        assert_eq!(table.address_of(0), Some("127.0.0.1:8080"));
        assert_eq!(table.address_of(1), Some("127.0.0.1:8081"));
        assert_eq!(table.address_of(2), None);
    }

    #[test]
    fn test_build_accepts_unordered_descriptors() {
        let shards = vec![
            shard("Cairo", 1, "127.0.0.1:8081"),
            shard("Giza", 2, "127.0.0.1:8082"),
            shard("Minia", 0, "127.0.0.1:8080"),
        ];

        let table = ShardTable::build(&shards, "Giza").unwrap();

        assert_eq!(table.count(), 3);
        assert_eq!(table.current_index(), 2);
        assert_eq!(table.address_of(0), Some("127.0.0.1:8080"));
    }

    #[test]
    fn test_duplicate_index_is_rejected() {
        let shards = vec![
            shard("Minia", 0, "127.0.0.1:8080"),
            shard("Cairo", 1, "127.0.0.1:8081"),
            shard("Giza", 1, "127.0.0.1:8082"),
        ];

        let err = ShardTable::build(&shards, "Minia").unwrap_err();
        assert_eq!(err, ConfigError::DuplicateIndex(1));
    }

    #[test]
    fn test_gap_in_indices_is_rejected() {
        let shards = vec![
            shard("Minia", 0, "127.0.0.1:8080"),
            shard("Cairo", 2, "127.0.0.1:8081"),
        ];

        let err = ShardTable::build(&shards, "Minia").unwrap_err();
        assert_eq!(err, ConfigError::MissingIndex(1));
    }

    #[test]
    fn test_unknown_local_shard_is_rejected() {
        let err = ShardTable::build(&two_shards(), "Luxor").unwrap_err();
        assert_eq!(err, ConfigError::UnknownLocalShard("Luxor".to_string()));
    }

    #[test]
    fn test_ambiguous_local_name_is_rejected() {
        let shards = vec![
            shard("Minia", 0, "127.0.0.1:8080"),
            shard("Minia", 1, "127.0.0.1:8081"),
        ];

        let err = ShardTable::build(&shards, "Minia").unwrap_err();
        assert_eq!(err, ConfigError::DuplicateName("Minia".to_string()));
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let err = ShardTable::build(&[], "Minia").unwrap_err();
        assert_eq!(err, ConfigError::NoShards);
    }

    // ============================================================
    // KEY RESOLUTION
    // ============================================================

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(fnv1a_hash64(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a_hash64(b"a"), 0xaf63dc4c8601ec8c);
        assert_eq!(fnv1a_hash64(b"foobar"), 0x85944171f73967e8);
    }

    #[test]
    fn test_resolve_is_deterministic_across_tables() {
        let first = ShardTable::build(&two_shards(), "Minia").unwrap();
        let second = ShardTable::build(&two_shards(), "Cairo").unwrap();

        for i in 0..1000 {
            let key = format!("key-{}", i);
            assert_eq!(first.resolve_shard(&key), first.resolve_shard(&key));
            assert_eq!(
                first.resolve_shard(&key),
                second.resolve_shard(&key),
                "Tables with the same shards must agree on {}",
                key
            );
        }
    }

    #[test]
    fn test_known_keys_land_on_expected_shards() {
        let table = ShardTable::build(&two_shards(), "Minia").unwrap();

        assert_eq!(table.resolve_shard("Giza"), 0);
        assert_eq!(table.resolve_shard("Minia"), 1);
        assert!(table.is_local("Giza"));
        assert!(!table.is_local("Minia"));
    }

    #[test]
    fn test_every_key_is_routable() {
        for count in 1..=7 {
            let shards: Vec<ShardDescriptor> = (0..count)
                .map(|i| shard(&format!("shard-{}", i), i, &format!("127.0.0.1:{}", 9000 + i)))
                .collect();
            let table = ShardTable::build(&shards, "shard-0").unwrap();

            for i in 0..500 {
                let key = format!("book_{}", i);
                assert!(table.resolve_shard(&key) < count);
            }
        }
    }

    #[test]
    fn test_keys_spread_over_all_shards() {
        let shards: Vec<ShardDescriptor> = (0..5)
            .map(|i| shard(&format!("shard-{}", i), i, "127.0.0.1:9000"))
            .collect();
        let table = ShardTable::build(&shards, "shard-0").unwrap();

        let mut counts: HashMap<usize, usize> = HashMap::new();
        for i in 0..10000 {
            *counts.entry(table.resolve_shard(&format!("key-{}", i))).or_insert(0) += 1;
        }

        assert_eq!(counts.len(), 5, "Every shard should own some keys");
        for (shard, owned) in counts {
            assert!(owned > 1500, "Shard {} only owns {} keys", shard, owned);
        }
    }
}
