//! Persisted user settings.

use merview_store::{SettingsStore, SettingsStoreExt, StoreError};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Theme};

/// Store key the settings object lives under.
pub const SETTINGS_KEY: &str = "settings";

/// User-adjustable settings, persisted between sessions.
///
/// Missing fields take their defaults, so settings written by an older
/// version still load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Theme applied to diagrams rendered after it is set.
    pub theme: Theme,
}

impl Settings {
    /// Load settings from `store`, applying defaults.
    ///
    /// A missing entry yields the defaults. An entry that cannot be decoded
    /// (e.g. an unknown theme name) is logged and replaced by the defaults;
    /// the stored bytes are left untouched until the next save.
    ///
    /// # Errors
    ///
    /// Returns an error if the store itself fails.
    pub fn load(store: &dyn SettingsStore) -> Result<Self, ConfigError> {
        match store.load_json::<Self>(SETTINGS_KEY) {
            Ok(Some(settings)) => Ok(settings),
            Ok(None) => Ok(Self::default()),
            Err(StoreError::Json(e)) => {
                tracing::warn!(error = %e, "stored settings are invalid, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist settings to `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails to write.
    pub fn save(&self, store: &dyn SettingsStore) -> Result<(), ConfigError> {
        store.save_json(SETTINGS_KEY, self)?;
        tracing::debug!(theme = %self.theme, "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use merview_store::{FileStore, MemoryStore};
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_uses_defaults() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store).unwrap(), Settings::default());
        assert_eq!(Settings::load(&store).unwrap().theme, Theme::Default);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let settings = Settings { theme: Theme::Forest };
        settings.save(&store).unwrap();

        assert_eq!(Settings::load(&store).unwrap(), settings);
    }

    #[test]
    fn test_load_fills_missing_fields() {
        let store = MemoryStore::new();
        store.save(SETTINGS_KEY, b"{}").unwrap();
        assert_eq!(Settings::load(&store).unwrap().theme, Theme::Default);
    }

    #[test]
    fn test_load_ignores_unknown_fields() {
        let store = MemoryStore::new();
        store
            .save(SETTINGS_KEY, br#"{"theme":"dark","fontSize":14}"#)
            .unwrap();
        assert_eq!(Settings::load(&store).unwrap().theme, Theme::Dark);
    }

    #[test]
    fn test_load_invalid_falls_back_to_defaults() {
        let store = MemoryStore::new();
        store.save(SETTINGS_KEY, br#"{"theme":"neon"}"#).unwrap();
        assert_eq!(Settings::load(&store).unwrap(), Settings::default());
    }

    #[test]
    fn test_file_store_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join(".merview"));

        Settings { theme: Theme::Neutral }.save(&store).unwrap();

        let raw = std::fs::read_to_string(tmp.path().join(".merview/settings.json")).unwrap();
        assert!(raw.contains(r#""theme": "neutral""#), "got: {raw}");
        assert_eq!(Settings::load(&store).unwrap().theme, Theme::Neutral);
    }
}
