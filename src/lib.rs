//! # CaskKV
//!
//! A log-structured key-value store with:
//! - An append-only data file: every write is a single O(1) append
//! - An in-memory key directory: every read is at most one disk seek
//! - Fail-fast startup recovery that replays the whole file
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Store trait / caskkv-cli                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Engine                                │
//! │        (Serialized Writes / Concurrent Index Reads)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Data File  │          │   KeyDir    │
//!   │  (Append)   │◄─────────│  (RwLock)   │
//!   └──────┬──────┘  offset  └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │   Record    │
//!   │   Codec     │
//!   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use caskkv::Engine;
//!
//! let store = Engine::open_path("books.db")?;
//! store.set("othello", "shakespeare")?;
//! assert_eq!(store.get("othello")?.as_deref(), Some("shakespeare"));
//! store.close()?;
//! # Ok::<(), caskkv::CaskError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod keydir;
pub mod datafile;
pub mod engine;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CaskError, Result};
pub use config::{Config, SyncStrategy};
pub use engine::{Engine, EngineStats};
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of CaskKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
