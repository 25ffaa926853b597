//! Data File Module
//!
//! The append-only data file that holds the entire persisted state.
//!
//! ## Responsibilities
//! - Append encoded records at the end of the file, never in place
//! - Positional reads of a single record for point lookups
//! - Startup recovery: replay every record to rebuild the key directory
//!
//! ## Failure Model
//! - A failed append rolls the file back to its previous length
//! - A truncated or malformed record stream rejects recovery outright;
//!   the index is never built from a prefix of the file
//!
//! See [`crate::record`] for the record layout.

mod writer;
mod reader;
mod recovery;

pub use writer::DataFileWriter;
pub use reader::DataFileReader;
pub use recovery::{Recovery, RecoveryResult};
