//! Record codec
//!
//! Encoding and decoding functions for data file records.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::HEADER_SIZE;
use crate::error::{CaskError, Result};

/// Fixed-size header that precedes every record's key and value bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Seconds since the Unix epoch at write time
    pub timestamp: u32,
    pub key_size: u32,
    pub value_size: u32,
}

impl RecordHeader {
    /// Total on-disk size of the record this header describes
    pub fn total_size(&self) -> u64 {
        HEADER_SIZE as u64 + self.key_size as u64 + self.value_size as u64
    }
}

/// A decoded record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub timestamp: u32,
    pub key: String,
    pub value: String,
}

/// Encode a record to bytes
///
/// Format: timestamp (4) + key_size (4) + value_size (4) + key + value.
/// Returns the total encoded size alongside the bytes.
///
/// Key and value lengths must fit in a `u32`; the engine checks this before
/// calling.
pub fn encode_record(timestamp: u32, key: &str, value: &str) -> (u64, Bytes) {
    debug_assert!(key.len() <= u32::MAX as usize);
    debug_assert!(value.len() <= u32::MAX as usize);

    let total_size = HEADER_SIZE + key.len() + value.len();
    let mut buf = BytesMut::with_capacity(total_size);

    buf.put_u32_le(timestamp);
    buf.put_u32_le(key.len() as u32);
    buf.put_u32_le(value.len() as u32);
    buf.put_slice(key.as_bytes());
    buf.put_slice(value.as_bytes());

    (total_size as u64, buf.freeze())
}

/// Decode a record header
///
/// Total over any header-sized buffer: callers only pass bytes read from a
/// record boundary.
pub fn decode_header(bytes: &[u8; HEADER_SIZE]) -> RecordHeader {
    let mut buf = &bytes[..];
    RecordHeader {
        timestamp: buf.get_u32_le(),
        key_size: buf.get_u32_le(),
        value_size: buf.get_u32_le(),
    }
}

/// Decode a full record, slicing the buffer by the sizes in its own header
pub fn decode_record(bytes: &[u8]) -> Result<Record> {
    let header_bytes: &[u8; HEADER_SIZE] = bytes
        .get(..HEADER_SIZE)
        .and_then(|h| <&[u8; HEADER_SIZE]>::try_from(h).ok())
        .ok_or_else(|| {
            CaskError::Decode(format!(
                "Incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            ))
        })?;
    let header = decode_header(header_bytes);

    if (bytes.len() as u64) < header.total_size() {
        return Err(CaskError::Decode(format!(
            "Incomplete record: expected {} bytes, got {}",
            header.total_size(),
            bytes.len()
        )));
    }

    let key_end = HEADER_SIZE + header.key_size as usize;
    let value_end = key_end + header.value_size as usize;

    let key = String::from_utf8(bytes[HEADER_SIZE..key_end].to_vec())
        .map_err(|e| CaskError::Decode(format!("Key is not valid UTF-8: {}", e)))?;
    let value = String::from_utf8(bytes[key_end..value_end].to_vec())
        .map_err(|e| CaskError::Decode(format!("Value is not valid UTF-8: {}", e)))?;

    Ok(Record {
        timestamp: header.timestamp,
        key,
        value,
    })
}
