//! Data File Reader
//!
//! Positional reads of single records for point lookups.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{CaskError, Result};
use crate::keydir::KeyDirEntry;
use crate::record::{decode_record, Record};

/// Read handle on the data file
///
/// Separate from the writer's handle: reads seek freely without disturbing
/// the append position.
pub struct DataFileReader {
    file: File,
}

impl DataFileReader {
    /// Open the data file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| CaskError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { file })
    }

    /// Read exactly `len` bytes starting at `offset`
    ///
    /// A short read (the file shrank underneath us) is a storage error.
    pub fn read_at(&mut self, offset: u64, len: u64) -> Result<Vec<u8>> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(CaskError::Storage)?;

        let mut buf = vec![0u8; len as usize];
        self.file.read_exact(&mut buf).map_err(CaskError::Storage)?;
        Ok(buf)
    }

    /// Read and decode the record a key directory entry points at
    pub fn read_record(&mut self, entry: &KeyDirEntry) -> Result<Record> {
        let bytes = self.read_at(entry.write_offset, entry.total_size)?;
        decode_record(&bytes)
    }
}
