//! Tests for Engine
//!
//! These tests verify:
//! - Basic get/set operations and miss behavior
//! - Append-only growth of the data file
//! - Persistence and recovery across reopen
//! - Rejection of corrupt data files on open
//! - Concurrent access patterns
//! - Engine lifecycle (open/close) and configuration

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::Arc;
use std::thread;

use caskkv::config::{Config, SyncStrategy};
use caskkv::engine::Engine;
use caskkv::record::HEADER_SIZE;
use caskkv::{CaskError, Store};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .path(temp_dir.path().join("test.db"))
        .sync_strategy(SyncStrategy::EveryWrite)
        .build();
    let engine = Engine::open(config).unwrap();
    (temp_dir, engine)
}

fn record_size(key: &str, value: &str) -> u64 {
    (HEADER_SIZE + key.len() + value.len()) as u64
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_engine_open_creates_file_and_directories() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("dir").join("data.db");

    let engine = Engine::open_path(&path).unwrap();

    assert!(path.exists());
    assert!(engine.is_empty());
    assert_eq!(engine.write_pos(), 0);
    assert_eq!(engine.path(), path.as_path());
}

#[test]
fn test_engine_set_get() {
    let (_temp, engine) = setup_temp_engine();

    engine.set("hello", "world").unwrap();

    assert_eq!(engine.get("hello").unwrap(), Some("world".to_string()));
}

#[test]
fn test_engine_get_nonexistent_key() {
    let (_temp, engine) = setup_temp_engine();

    assert_eq!(engine.get("nonexistent").unwrap(), None);
}

#[test]
fn test_engine_empty_value_is_not_a_miss() {
    let (_temp, engine) = setup_temp_engine();

    engine.set("blank", "").unwrap();

    assert_eq!(engine.get("blank").unwrap(), Some(String::new()));
    assert_eq!(engine.get("absent").unwrap(), None);
}

#[test]
fn test_engine_set_overwrite() {
    let (_temp, engine) = setup_temp_engine();

    engine.set("key", "value1").unwrap();
    engine.set("key", "value2").unwrap();

    assert_eq!(engine.get("key").unwrap(), Some("value2".to_string()));
    assert_eq!(engine.len(), 1);
}

#[test]
fn test_engine_multiple_keys() {
    let (_temp, engine) = setup_temp_engine();

    engine.set("key1", "value1").unwrap();
    engine.set("key2", "value2").unwrap();
    engine.set("key3", "value3").unwrap();

    assert_eq!(engine.get("key1").unwrap(), Some("value1".to_string()));
    assert_eq!(engine.get("key2").unwrap(), Some("value2".to_string()));
    assert_eq!(engine.get("key3").unwrap(), Some("value3".to_string()));
    assert_eq!(engine.keys(), vec!["key1", "key2", "key3"]);
    assert!(engine.contains_key("key2"));
    assert!(!engine.contains_key("key4"));
}

// =============================================================================
// Append-Only Growth Tests
// =============================================================================

#[test]
fn test_engine_file_size_is_sum_of_records() {
    let (_temp, engine) = setup_temp_engine();
    let pairs = [("a", "1"), ("bb", "22"), ("a", "333"), ("ccc", "")];

    let mut expected = 0;
    for (key, value) in pairs {
        engine.set(key, value).unwrap();
        expected += record_size(key, value);
    }

    assert_eq!(engine.write_pos(), expected);
    assert_eq!(fs::metadata(engine.path()).unwrap().len(), expected);
}

#[test]
fn test_engine_overwrite_never_rewrites_existing_bytes() {
    let (_temp, engine) = setup_temp_engine();

    engine.set("key", "first").unwrap();
    let before = fs::read(engine.path()).unwrap();

    engine.set("key", "second").unwrap();
    let after = fs::read(engine.path()).unwrap();

    assert_eq!(&after[..before.len()], before.as_slice());
    assert_eq!(after.len() as u64, record_size("key", "first") + record_size("key", "second"));
}

#[test]
fn test_engine_stats_report_dead_bytes() {
    let (_temp, engine) = setup_temp_engine();

    engine.set("k", "v1").unwrap();
    engine.set("k", "v2").unwrap();
    engine.set("other", "x").unwrap();

    let stats = engine.stats();
    assert_eq!(stats.keys, 2);
    assert_eq!(stats.file_size, 2 * record_size("k", "v1") + record_size("other", "x"));
    assert_eq!(stats.live_bytes, record_size("k", "v2") + record_size("other", "x"));
    assert_eq!(stats.dead_bytes, record_size("k", "v1"));
}

// =============================================================================
// Persistence & Recovery Tests
// =============================================================================

#[test]
fn test_engine_persistence_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("persist.db");

    {
        let engine = Engine::open_path(&path).unwrap();
        engine.set("k1", "v1").unwrap();
        engine.set("k2", "v2").unwrap();
        engine.set("k1", "v1-updated").unwrap();
        engine.close().unwrap();
    }

    let engine = Engine::open_path(&path).unwrap();
    assert_eq!(engine.get("k1").unwrap(), Some("v1-updated".to_string()));
    assert_eq!(engine.get("k2").unwrap(), Some("v2".to_string()));

    let recovery = engine.recovery_result();
    assert_eq!(recovery.records_replayed, 3);
    assert_eq!(recovery.keys_loaded, 2);
    assert_eq!(recovery.bytes_scanned, engine.write_pos());
}

#[test]
fn test_engine_recovery_without_close() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("crash.db");

    {
        let engine = Engine::open_path(&path).unwrap();
        engine.set("survivor", "yes").unwrap();
        // Dropped without close()
    }

    let engine = Engine::open_path(&path).unwrap();
    assert_eq!(engine.get("survivor").unwrap(), Some("yes".to_string()));
}

#[test]
fn test_engine_writes_after_reopen_append() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("append.db");

    {
        let engine = Engine::open_path(&path).unwrap();
        engine.set("a", "1").unwrap();
        engine.close().unwrap();
    }
    {
        let engine = Engine::open_path(&path).unwrap();
        engine.set("b", "2").unwrap();
        assert_eq!(engine.write_pos(), record_size("a", "1") + record_size("b", "2"));
        engine.close().unwrap();
    }

    let engine = Engine::open_path(&path).unwrap();
    assert_eq!(engine.get("a").unwrap(), Some("1".to_string()));
    assert_eq!(engine.get("b").unwrap(), Some("2".to_string()));
}

#[test]
fn test_engine_rejects_truncated_tail() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("torn.db");

    {
        let engine = Engine::open_path(&path).unwrap();
        engine.set("k1", "v1").unwrap();
        engine.set("k2", "v2").unwrap();
        engine.close().unwrap();
    }

    let len = fs::metadata(&path).unwrap().len();
    let file = OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(len - 1).unwrap();

    let result = Engine::open_path(&path);
    assert!(matches!(result, Err(CaskError::Recovery { .. })));
}

#[test]
fn test_engine_rejects_trailing_garbage() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("garbage.db");

    {
        let engine = Engine::open_path(&path).unwrap();
        engine.set("k", "v").unwrap();
        engine.close().unwrap();
    }

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&[0xAB; 5]).unwrap();

    let result = Engine::open_path(&path);
    match result {
        Err(CaskError::Recovery { offset, .. }) => assert_eq!(offset, record_size("k", "v")),
        Err(e) => panic!("expected recovery error, got {}", e),
        Ok(_) => panic!("expected recovery error, open succeeded"),
    }
}

#[test]
fn test_engine_get_after_external_truncation() {
    let (_temp, engine) = setup_temp_engine();
    engine.set("k", "v").unwrap();

    let file = OpenOptions::new().write(true).open(engine.path()).unwrap();
    file.set_len(0).unwrap();

    let result = engine.get("k");
    assert!(matches!(result, Err(CaskError::Storage(_))));

    // Misses never touch the file
    assert_eq!(engine.get("absent").unwrap(), None);
}

// =============================================================================
// Lifecycle & Configuration Tests
// =============================================================================

#[test]
fn test_engine_open_on_directory_fails() {
    let temp_dir = TempDir::new().unwrap();

    let result = Engine::open_path(temp_dir.path());

    assert!(matches!(result, Err(CaskError::Open { .. })));
}

#[test]
fn test_engine_open_without_create_dirs() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .path(temp_dir.path().join("missing").join("data.db"))
        .create_dirs(false)
        .build();

    let result = Engine::open(config);

    assert!(matches!(result, Err(CaskError::Open { .. })));
}

#[test]
fn test_engine_rejects_zero_sync_count() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .path(temp_dir.path().join("data.db"))
        .sync_strategy(SyncStrategy::EveryNWrites { count: 0 })
        .build();

    let result = Engine::open(config);

    assert!(matches!(result, Err(CaskError::Config(_))));
}

#[test]
fn test_engine_batched_sync_persists_on_close() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .path(temp_dir.path().join("batched.db"))
        .sync_strategy(SyncStrategy::EveryNWrites { count: 100 })
        .build();

    {
        let engine = Engine::open(config.clone()).unwrap();
        for i in 0..10 {
            engine.set(&format!("key{}", i), &format!("value{}", i)).unwrap();
        }
        engine.sync().unwrap();
        engine.close().unwrap();
    }

    let engine = Engine::open(config).unwrap();
    assert_eq!(engine.len(), 10);
    assert_eq!(engine.get("key7").unwrap(), Some("value7".to_string()));
}

#[test]
fn test_engine_through_store_trait() {
    fn exercise<S: Store>(store: S) {
        store.set("trait", "object").unwrap();
        assert_eq!(store.get("trait").unwrap(), Some("object".to_string()));
        assert_eq!(store.get("nope").unwrap(), None);
        store.close().unwrap();
    }

    let (_temp, engine) = setup_temp_engine();
    exercise(engine);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_engine_concurrent_writers() {
    let (_temp, engine) = setup_temp_engine();
    let engine = Arc::new(engine);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..50 {
                    engine
                        .set(&format!("t{}-k{}", t, i), &format!("v{}", i))
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.len(), 200);
    assert_eq!(engine.get("t3-k49").unwrap(), Some("v49".to_string()));
    assert_eq!(fs::metadata(engine.path()).unwrap().len(), engine.write_pos());
}

#[test]
fn test_engine_concurrent_readers_and_writer() {
    let (_temp, engine) = setup_temp_engine();
    let engine = Arc::new(engine);
    engine.set("shared", "v0").unwrap();

    let writer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for i in 1..=100 {
                engine.set("shared", &format!("v{}", i)).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..100 {
                    let value = engine.get("shared").unwrap().unwrap();
                    let n: u32 = value[1..].parse().unwrap();
                    assert!(n <= 100);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(engine.get("shared").unwrap(), Some("v100".to_string()));
}

#[test]
fn test_engine_last_writer_is_indexed() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("order.db");
    let engine = Arc::new(Engine::open_path(&path).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..25 {
                    engine.set("contended", &format!("{}-{}", t, i)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // The live value must be the one recovery picks: the last record on disk
    let live = engine.get("contended").unwrap();
    drop(engine);

    let reopened = Engine::open_path(&path).unwrap();
    assert_eq!(reopened.get("contended").unwrap(), live);
}
