//! Key Directory Module
//!
//! In-memory index from key to the location of its most recent record.
//!
//! ## Responsibilities
//! - O(1) lookup of a key's record offset and size
//! - Last-write-wins: a newer record for a key replaces the older entry
//! - Track live bytes so dead space in the data file can be reported
//!
//! The key directory holds locations, never values. It has no persistence of
//! its own and is rebuilt from the data file on every open.

mod table;

pub use table::KeyDir;

/// Location of a key's most recent record in the data file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDirEntry {
    /// Byte offset where the record's header begins
    pub write_offset: u64,

    /// Encoded size of the record (header + key + value)
    pub total_size: u64,

    /// Copy of the record's timestamp
    pub timestamp: u32,
}
