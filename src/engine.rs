//! Engine Module
//!
//! The storage engine that ties the data file and the key directory together.
//!
//! ## Responsibilities
//! - Recover the key directory from the data file on open
//! - Append records and publish their locations (write path)
//! - Single-seek point lookups (read path)
//! - Serialize concurrent callers so no torn state is observable

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::datafile::{DataFileReader, DataFileWriter, Recovery, RecoveryResult};
use crate::error::{CaskError, Result};
use crate::keydir::{KeyDir, KeyDirEntry};
use crate::record::encode_record;

/// The main storage engine
///
/// ## Concurrency Model: Serialized Writes / Concurrent Index Reads
///
/// - **Writes** (set): Serialized by the `writer` mutex
///   - The mutex is held across append → key directory update, so the index
///     order for a key always matches the file order
///   - An entry is published only after its bytes are written, so a reader
///     never sees an offset past the written end of file
///
/// - **Reads** (get): Key directory lookup under a shared read lock, then a
///   seek + read on the dedicated read handle under the `reader` mutex
///   - Records are immutable, so an entry copied out of the index stays
///     readable even if a newer record for the key lands meanwhile
///
/// Lock order is always `writer` → `keydir`.
///
/// Only one engine may own a data file at a time; multi-process access is
/// not supported.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Append handle on the data file (exclusive access needed)
    writer: Mutex<DataFileWriter>,

    /// Read handle on the data file (seeking needs exclusive access)
    reader: Mutex<DataFileReader>,

    /// In-memory index: key → location of its latest record
    keydir: RwLock<KeyDir>,

    /// Stats from the recovery scan performed by `open`
    recovery: RecoveryResult,
}

/// Point-in-time space accounting for the data file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    /// Number of live keys
    pub keys: usize,

    /// Data file length in bytes
    pub file_size: u64,

    /// Bytes occupied by the latest record of each key
    pub live_bytes: u64,

    /// Bytes occupied by superseded records (reclaimable by compaction)
    pub dead_bytes: u64,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create parent directories if configured
    /// 2. Open/create the data file for appending
    /// 3. Recover the key directory by replaying the whole file
    /// 4. Open the read handle and start serving requests
    ///
    /// A corrupt or truncated data file rejects the open with
    /// [`CaskError::Recovery`]; the engine never serves a partial index.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let path = config.path.as_path();

        // Step 1: Parent directories
        if config.create_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| CaskError::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }

        // Step 2: Append handle (creates the file if absent)
        let writer = DataFileWriter::open(path, config.sync_strategy)?;

        // Step 3: Rebuild the key directory
        let (keydir, recovery) = Recovery::recover(path).inspect_err(|e| {
            error!(path = %path.display(), error = %e, "Recovery rejected data file");
        })?;

        if recovery.bytes_scanned != writer.write_pos() {
            return Err(CaskError::recovery(
                recovery.bytes_scanned,
                format!(
                    "data file changed during recovery: scanned {} bytes, file holds {}",
                    recovery.bytes_scanned,
                    writer.write_pos()
                ),
            ));
        }

        // Step 4: Read handle
        let reader = DataFileReader::open(path)?;

        info!(
            path = %path.display(),
            keys = recovery.keys_loaded,
            write_pos = writer.write_pos(),
            "Engine opened"
        );

        Ok(Self {
            config,
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
            keydir: RwLock::new(keydir),
            recovery,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data file
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::builder().path(path.as_ref()).build();
        Self::open(config)
    }

    /// Get the value stored for a key
    ///
    /// Returns `Ok(None)` when the key has never been set. An empty string
    /// is a legitimate value and is returned as `Some("")`.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = match self.keydir.read().get(key) {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let record = self.reader.lock().read_record(&entry)?;
        Ok(Some(record.value))
    }

    /// Set a key-value pair
    ///
    /// Steps:
    /// 1. Stamp the current time and encode the record
    /// 2. Acquire the writer and append at the end of the file
    /// 3. Point the key directory at the new record
    ///
    /// If the append fails the key directory is left untouched.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        check_len("key", key)?;
        check_len("value", value)?;

        let timestamp = current_timestamp();
        let (total_size, bytes) = encode_record(timestamp, key, value);

        let mut writer = self.writer.lock();
        let write_offset = writer.append(&bytes)?;

        let previous = self.keydir.write().insert(
            key.to_string(),
            KeyDirEntry {
                write_offset,
                total_size,
                timestamp,
            },
        );
        debug!(key, write_offset, total_size, overwrote = previous.is_some(), "Set key");

        Ok(())
    }

    /// Force the data file to disk
    pub fn sync(&self) -> Result<()> {
        self.writer.lock().sync()
    }

    /// Close the engine gracefully
    ///
    /// Syncs the data file and releases both handles. The key directory is
    /// dropped with the engine.
    pub fn close(self) -> Result<()> {
        let Engine { config, writer, .. } = self;
        writer.into_inner().close()?;
        info!(path = %config.path.display(), "Engine closed");
        Ok(())
    }

    // =========================================================================
    // Accessors (for tooling and tests)
    // =========================================================================

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.keydir.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keydir.read().is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keydir.read().contains_key(key)
    }

    /// Snapshot of all live keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.keydir.read().keys().map(str::to_string).collect();
        keys.sort_unstable();
        keys
    }

    /// Space accounting for the data file
    pub fn stats(&self) -> EngineStats {
        let writer = self.writer.lock();
        let keydir = self.keydir.read();
        let file_size = writer.write_pos();

        EngineStats {
            keys: keydir.len(),
            file_size,
            live_bytes: keydir.live_bytes(),
            dead_bytes: file_size - keydir.live_bytes(),
        }
    }

    /// Offset where the next record will be appended
    pub fn write_pos(&self) -> u64 {
        self.writer.lock().write_pos()
    }

    /// Stats from the recovery scan performed by `open`
    pub fn recovery_result(&self) -> RecoveryResult {
        self.recovery
    }

    /// Get the data file path
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Seconds since the Unix epoch, truncated to the record's 32-bit field
fn current_timestamp() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

fn check_len(field: &'static str, s: &str) -> Result<()> {
    if s.len() > u32::MAX as usize {
        return Err(CaskError::RecordTooLarge {
            field,
            len: s.len(),
        });
    }
    Ok(())
}
