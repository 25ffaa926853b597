//! Data File Writer
//!
//! Handles appending records to the data file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::SyncStrategy;
use crate::error::{CaskError, Result};

/// Appends encoded records to the data file
///
/// The file is opened in append mode, so every write lands at the current
/// end of file. `write_pos` mirrors the file length after every successful
/// append.
pub struct DataFileWriter {
    file: File,
    path: PathBuf,
    write_pos: u64,
    sync_strategy: SyncStrategy,
    writes_since_sync: usize,
    /// Set when a failed append could not be rolled back; the next append
    /// retries the rollback before writing.
    needs_rollback: bool,
}

impl DataFileWriter {
    /// Open or create the data file for appending
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let open_err = |source: std::io::Error| CaskError::Open {
            path: path.to_path_buf(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_err)?;
        let write_pos = file.metadata().map_err(open_err)?.len();

        Ok(Self {
            file,
            path: path.to_path_buf(),
            write_pos,
            sync_strategy,
            writes_since_sync: 0,
            needs_rollback: false,
        })
    }

    /// Append an encoded record, returning the offset it was written at
    ///
    /// On failure the file is truncated back to its previous length so no
    /// torn record is left behind.
    pub fn append(&mut self, bytes: &[u8]) -> Result<u64> {
        if self.needs_rollback {
            self.file.set_len(self.write_pos).map_err(CaskError::Storage)?;
            self.needs_rollback = false;
        }

        let offset = self.write_pos;
        if let Err(e) = self.write_and_maybe_sync(bytes) {
            self.rollback(offset);
            return Err(CaskError::Storage(e));
        }

        self.write_pos += bytes.len() as u64;
        debug!(offset, len = bytes.len(), "Appended record");
        Ok(offset)
    }

    fn write_and_maybe_sync(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.file.write_all(bytes)?;
        self.writes_since_sync += 1;

        let due = match self.sync_strategy {
            SyncStrategy::EveryWrite => true,
            SyncStrategy::EveryNWrites { count } => self.writes_since_sync >= count,
        };
        if due {
            self.file.sync_data()?;
            self.writes_since_sync = 0;
        }
        Ok(())
    }

    fn rollback(&mut self, offset: u64) {
        if let Err(e) = self.file.set_len(offset) {
            warn!(
                path = %self.path.display(),
                offset,
                error = %e,
                "Failed to roll back torn append"
            );
            self.needs_rollback = true;
        }
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush().map_err(CaskError::Storage)?;
        self.file.sync_all().map_err(CaskError::Storage)?;
        self.writes_since_sync = 0;
        Ok(())
    }

    /// Sync and release the file handle
    pub fn close(mut self) -> Result<()> {
        self.file.flush().map_err(CaskError::Close)?;
        self.file.sync_all().map_err(CaskError::Close)?;
        Ok(())
    }

    /// Offset where the next record will be appended
    pub fn write_pos(&self) -> u64 {
        self.write_pos
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
