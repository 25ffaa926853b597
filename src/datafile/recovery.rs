//! Data File Recovery
//!
//! Rebuilds the key directory by replaying the data file from offset 0.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{CaskError, Result};
use crate::keydir::{KeyDir, KeyDirEntry};
use crate::record::{decode_header, HEADER_SIZE};

/// Replays a data file into a fresh key directory
pub struct Recovery;

/// Result of a recovery scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Records decoded, including ones superseded by later writes
    pub records_replayed: u64,

    /// Distinct keys in the rebuilt key directory
    pub keys_loaded: usize,

    /// Bytes consumed by the scan; equals the file length on success
    pub bytes_scanned: u64,
}

impl Recovery {
    /// Recover the key directory from a data file
    ///
    /// This will:
    /// 1. Read one header at a time from offset 0
    /// 2. Read the key and skip the value (values stay on disk)
    /// 3. Upsert the key's entry, so later records win
    /// 4. Stop at a clean end of file
    ///
    /// A partial header, a record whose declared sizes run past the end of
    /// the file, any other read error, or a non-UTF-8 key rejects the whole
    /// recovery.
    pub fn recover(path: &Path) -> Result<(KeyDir, RecoveryResult)> {
        let file = File::open(path).map_err(|source| CaskError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let file_len = file
            .metadata()
            .map_err(|e| CaskError::recovery(0, format!("failed to stat data file: {}", e)))?
            .len();

        let mut reader = BufReader::new(file);
        let mut keydir = KeyDir::new();
        let mut result = RecoveryResult::default();
        let mut offset = 0u64;

        loop {
            let mut header_buf = [0u8; HEADER_SIZE];
            let read = read_full(&mut reader, &mut header_buf).map_err(|e| {
                CaskError::recovery(offset, format!("failed to read header: {}", e))
            })?;
            if read == 0 {
                break;
            }
            if read < HEADER_SIZE {
                return Err(CaskError::recovery(
                    offset,
                    format!(
                        "truncated header: expected {} bytes, found {}",
                        HEADER_SIZE, read
                    ),
                ));
            }

            let header = decode_header(&header_buf);
            let total_size = header.total_size();
            let remaining = file_len.saturating_sub(offset);
            if total_size > remaining {
                return Err(CaskError::recovery(
                    offset,
                    format!(
                        "truncated record: header declares {} bytes, only {} remain",
                        total_size, remaining
                    ),
                ));
            }

            let mut key_buf = vec![0u8; header.key_size as usize];
            reader.read_exact(&mut key_buf).map_err(|e| {
                CaskError::recovery(offset, format!("failed to read key: {}", e))
            })?;
            let key = String::from_utf8(key_buf).map_err(|e| {
                CaskError::recovery(offset, format!("key is not valid UTF-8: {}", e))
            })?;

            reader
                .seek_relative(header.value_size as i64)
                .map_err(|e| CaskError::recovery(offset, format!("failed to skip value: {}", e)))?;

            debug!(key = %key, offset, total_size, "Loaded key");
            keydir.insert(
                key,
                KeyDirEntry {
                    write_offset: offset,
                    total_size,
                    timestamp: header.timestamp,
                },
            );

            offset += total_size;
            result.records_replayed += 1;
        }

        result.keys_loaded = keydir.len();
        result.bytes_scanned = offset;

        info!(
            path = %path.display(),
            records = result.records_replayed,
            keys = result.keys_loaded,
            bytes = result.bytes_scanned,
            "Recovery complete"
        );

        Ok((keydir, result))
    }

    /// Verify a data file without opening a store on it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        let (_, result) = Self::recover(path)?;
        Ok(result)
    }
}

/// Fill `buf` from `reader`, returning fewer bytes only at end of file
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
