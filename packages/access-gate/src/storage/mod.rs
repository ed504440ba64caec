//! Client-local key-value storage
//!
//! Both stores sit on top of a [`KeyValueStorage`] backend: `localStorage` in
//! the browser, [`MemoryStorage`] in tests and during server-side rendering.

mod memory;

#[cfg(feature = "web")]
mod browser;

pub use memory::MemoryStorage;

#[cfg(feature = "web")]
pub use browser::BrowserStorage;

use thiserror::Error;

/// Storage backend errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Client-local storage is unavailable")]
    Unavailable,

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Synchronous string key-value storage.
///
/// Writes and removals are batched so a multi-field record lands in one step.
pub trait KeyValueStorage {
    /// Read a single key
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write every entry in one step
    fn set_batch(&self, entries: &[(&str, String)]) -> Result<(), StorageError>;

    /// Remove every key in one step. Missing keys are ignored.
    fn remove_batch(&self, keys: &[&str]) -> Result<(), StorageError>;
}
