//! Store error type.

/// Error from a [`SettingsStore`](crate::SettingsStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error while reading or writing the backing file.
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value is not valid JSON for the requested type.
    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Key cannot be mapped to a storage location.
    #[error("invalid settings key: {0:?}")]
    InvalidKey(String),

    /// A previous writer panicked while holding the store lock.
    #[error("settings store lock poisoned")]
    Poisoned,
}
