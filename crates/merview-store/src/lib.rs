//! Persistent key-value settings storage for merview.
//!
//! Hosts give plugins a small persistent store to load and save a
//! configuration object. This crate abstracts that store:
//!
//! - [`SettingsStore`]: raw byte values addressed by key
//! - [`SettingsStoreExt`]: typed JSON access on top of any store
//!
//! # Implementations
//!
//! - [`FileStore`]: one JSON file per key under a directory, written atomically
//! - [`MemoryStore`]: in-process map, for tests and embedders without disk
//!
//! # Example
//!
//! ```
//! use merview_store::{MemoryStore, SettingsStore};
//!
//! let store = MemoryStore::new();
//! store.save("settings", br#"{"theme":"dark"}"#).unwrap();
//! assert_eq!(store.load("settings").unwrap(), Some(br#"{"theme":"dark"}"#.to_vec()));
//! assert_eq!(store.load("missing").unwrap(), None);
//! ```

mod error;
mod ext;
mod file;

use std::collections::HashMap;
use std::sync::Mutex;

pub use error::StoreError;
pub use ext::SettingsStoreExt;
pub use file::FileStore;

/// Key-value storage for small settings objects.
///
/// Unlike a cache, a store is authoritative: failures are reported to the
/// caller instead of being treated as a miss.
pub trait SettingsStore: Send + Sync {
    /// Load the raw value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing has been saved under `key` yet.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Save `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

/// In-memory [`SettingsStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_owned(), value.to_vec());
        Ok(())
    }
}
