//! Store capability
//!
//! The minimal get/set/close surface callers program against.

use crate::engine::Engine;
use crate::error::Result;

/// A string key-value store
pub trait Store {
    /// Get the value for a key, `None` if it was never set
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a key-value pair, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Release the store; it cannot be used afterwards
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

impl Store for Engine {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Engine::get(self, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Engine::set(self, key, value)
    }

    fn close(self) -> Result<()> {
        Engine::close(self)
    }
}
