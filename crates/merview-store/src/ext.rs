//! Extension trait for [`SettingsStore`] with typed JSON access.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{SettingsStore, StoreError};

/// Typed convenience methods for [`SettingsStore`].
///
/// Implemented for every store through a blanket impl, so [`SettingsStore`]
/// stays object-safe and free of serde.
///
/// # Example
///
/// ```
/// use merview_store::{MemoryStore, SettingsStoreExt};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Prefs { theme: String }
///
/// let store = MemoryStore::new();
/// store.save_json("prefs", &Prefs { theme: "forest".into() }).unwrap();
/// let prefs: Option<Prefs> = store.load_json("prefs").unwrap();
/// assert_eq!(prefs.unwrap().theme, "forest");
/// ```
pub trait SettingsStoreExt: SettingsStore {
    /// Load and deserialize a JSON value.
    ///
    /// Returns `Ok(None)` when nothing is stored under `key`.
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(bytes) = self.load(key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Serialize `value` as pretty-printed JSON and save it.
    fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.save(key, &bytes)
    }
}

impl<S: SettingsStore + ?Sized> SettingsStoreExt for S {}
