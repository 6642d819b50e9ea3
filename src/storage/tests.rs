//! Storage Module Tests
//!
//! Both engines run through the same scenarios so they stay interchangeable
//! behind `StorageEngine`. The disk engine additionally has to survive a reopen.

#[cfg(test)]
mod tests {
    use crate::storage::{DiskEngine, MemoryEngine, StorageEngine};
    use std::collections::HashSet;

    fn check_roundtrip(engine: &dyn StorageEngine) {
        engine.set("a", b"v").unwrap();
        assert_eq!(engine.get("a").unwrap(), Some(b"v".to_vec()));

        engine.set("a", b"updated").unwrap();
        assert_eq!(engine.get("a").unwrap(), Some(b"updated".to_vec()));
    }

    fn check_absent_vs_empty(engine: &dyn StorageEngine) {
        engine.set("empty", b"").unwrap();

        assert_eq!(engine.get("empty").unwrap(), Some(Vec::new()));
        assert_eq!(engine.get("never-set").unwrap(), None);
    }

    fn check_delete(engine: &dyn StorageEngine) {
        engine.set("x", b"1").unwrap();
        engine.delete("x").unwrap();
        assert_eq!(engine.get("x").unwrap(), None);

        // Deleting again is not an error
        engine.delete("x").unwrap();
    }

    fn check_scan(engine: &dyn StorageEngine) {
        for i in 0..50 {
            engine.set(&format!("key-{:02}", i), b"value").unwrap();
        }

        let keys: HashSet<String> = engine.keys().unwrap().into_iter().collect();
        assert_eq!(keys.len(), 50);
        assert!(keys.contains("key-00"));
        assert!(keys.contains("key-49"));
        assert_eq!(engine.len().unwrap(), 50);
        assert!(!engine.is_empty().unwrap());
    }

    // ============================================================
    // MEMORY ENGINE
    // ============================================================

    #[test]
    fn test_memory_roundtrip() {
        check_roundtrip(&MemoryEngine::new());
    }

    #[test]
    fn test_memory_absent_vs_empty() {
        check_absent_vs_empty(&MemoryEngine::new());
    }

    #[test]
    fn test_memory_delete() {
        check_delete(&MemoryEngine::new());
    }

    #[test]
    fn test_memory_scan() {
        let engine = MemoryEngine::new();
        assert!(engine.is_empty().unwrap());
        check_scan(&engine);
    }

    #[test]
    fn test_memory_clones_share_data() {
        let engine = MemoryEngine::new();
        let clone = engine.clone();

        engine.set("shared", b"yes").unwrap();
        assert_eq!(clone.get("shared").unwrap(), Some(b"yes".to_vec()));
    }

    // ============================================================
    // DISK ENGINE
    // ============================================================

    #[test]
    fn test_disk_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        check_roundtrip(&DiskEngine::open(dir.path()).unwrap());
    }

    #[test]
    fn test_disk_absent_vs_empty() {
        let dir = tempfile::tempdir().unwrap();
        check_absent_vs_empty(&DiskEngine::open(dir.path()).unwrap());
    }

    #[test]
    fn test_disk_delete() {
        let dir = tempfile::tempdir().unwrap();
        check_delete(&DiskEngine::open(dir.path()).unwrap());
    }

    #[test]
    fn test_disk_scan() {
        let dir = tempfile::tempdir().unwrap();
        check_scan(&DiskEngine::open(dir.path()).unwrap());
    }

    #[test]
    fn test_disk_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let engine = DiskEngine::open(dir.path()).unwrap();
            engine.set("Giza", b"pyramids").unwrap();
            engine.set("gone", b"soon").unwrap();
            engine.delete("gone").unwrap();
        }

        let engine = DiskEngine::open(dir.path()).unwrap();
        assert_eq!(engine.get("Giza").unwrap(), Some(b"pyramids".to_vec()));
        assert_eq!(engine.get("gone").unwrap(), None);
    }
}
