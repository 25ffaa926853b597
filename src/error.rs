//! Error types for CaskKV
//!
//! Provides a unified error type for all operations. A missing key is not an
//! error: lookups return `Ok(None)`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using CaskError
pub type Result<T> = std::result::Result<T, CaskError>;

/// Unified error type for CaskKV operations
#[derive(Debug, Error)]
pub enum CaskError {
    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Failed to open data file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Recovery failed at offset {offset}: {reason}")]
    Recovery { offset: u64, reason: String },

    #[error("Failed to close data file: {0}")]
    Close(#[source] io::Error),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(#[source] io::Error),

    #[error("Record too large: {field} is {len} bytes (max {max})", max = u32::MAX)]
    RecordTooLarge { field: &'static str, len: usize },

    // -------------------------------------------------------------------------
    // Encoding Errors
    // -------------------------------------------------------------------------
    #[error("Decode error: {0}")]
    Decode(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CaskError {
    pub(crate) fn recovery(offset: u64, reason: impl Into<String>) -> Self {
        CaskError::Recovery {
            offset,
            reason: reason.into(),
        }
    }
}
