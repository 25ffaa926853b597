//! KeyDir implementation
//!
//! HashMap-based key directory. Synchronization is the engine's job.

use std::collections::HashMap;

use super::KeyDirEntry;

/// In-memory key directory
#[derive(Debug, Default)]
pub struct KeyDir {
    entries: HashMap<String, KeyDirEntry>,

    /// Sum of `total_size` over all entries
    live_bytes: u64,
}

impl KeyDir {
    /// Create a new empty KeyDir
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for a key
    pub fn get(&self, key: &str) -> Option<KeyDirEntry> {
        self.entries.get(key).copied()
    }

    /// Insert or overwrite the entry for a key, returning the previous one
    pub fn insert(&mut self, key: String, entry: KeyDirEntry) -> Option<KeyDirEntry> {
        let previous = self.entries.insert(key, entry);
        if let Some(old) = previous {
            self.live_bytes -= old.total_size;
        }
        self.live_bytes += entry.total_size;
        previous
    }

    /// Check whether a key has an entry
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes of the data file still referenced by an entry
    pub fn live_bytes(&self) -> u64 {
        self.live_bytes
    }

    /// Iterate over all keys (unordered)
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
