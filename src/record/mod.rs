//! Record Module
//!
//! Bit-exact conversion between a (timestamp, key, value) triple and its
//! on-disk bytes.
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ Record 1                                             │
//! │ ┌───────────┬───────────┬───────────┬─────┬───────┐ │
//! │ │ TS (4)    │ KeyLen(4) │ ValLen(4) │ Key │ Value │ │
//! │ └───────────┴───────────┴───────────┴─────┴───────┘ │
//! ├──────────────────────────────────────────────────────┤
//! │ Record 2                                             │
//! │ ┌───────────┬───────────┬───────────┬─────┬───────┐ │
//! │ │ TS (4)    │ KeyLen(4) │ ValLen(4) │ Key │ Value │ │
//! │ └───────────┴───────────┴───────────┴─────┴───────┘ │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Integers are little-endian. Records are densely packed: no file header,
//! no footer, no padding, no checksum.

mod codec;

pub use codec::{decode_header, decode_record, encode_record, Record, RecordHeader};

/// Header size: Timestamp (4) + KeySize (4) + ValueSize (4) = 12 bytes
pub const HEADER_SIZE: usize = 12;
