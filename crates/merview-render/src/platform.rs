//! Host platform services used by toolbar actions.

use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;

use arboard::{Clipboard, ImageData};

use crate::error::PlatformError;
use crate::raster::RasterImage;

/// Clipboard, file export and user notices.
///
/// Implementations must be shareable across threads: static documents are
/// enhanced in parallel and every widget talks to the same platform.
pub trait Platform: Send + Sync {
    /// Put text on the clipboard.
    fn write_text(&self, text: &str) -> Result<(), PlatformError>;

    /// Put an image on the clipboard.
    fn write_image(&self, image: &RasterImage) -> Result<(), PlatformError>;

    /// Save `bytes` as a file named `name`, returning where it was written.
    fn save_file(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, PlatformError>;

    /// Show a short-lived message to the user.
    fn notify(&self, message: &str);
}

/// [`Platform`] backed by the OS clipboard and an export directory.
///
/// A clipboard handle is opened per action.
#[derive(Debug, Clone)]
pub struct SystemPlatform {
    export_dir: PathBuf,
}

impl SystemPlatform {
    #[must_use]
    pub fn new(export_dir: PathBuf) -> Self {
        Self { export_dir }
    }

    fn with_clipboard(
        f: impl FnOnce(&mut Clipboard) -> Result<(), arboard::Error>,
    ) -> Result<(), PlatformError> {
        let mut clipboard =
            Clipboard::new().map_err(|e| PlatformError::Clipboard(e.to_string()))?;
        f(&mut clipboard).map_err(|e| PlatformError::Clipboard(e.to_string()))
    }
}

impl Platform for SystemPlatform {
    fn write_text(&self, text: &str) -> Result<(), PlatformError> {
        Self::with_clipboard(|clipboard| clipboard.set_text(text.to_owned()))
    }

    fn write_image(&self, image: &RasterImage) -> Result<(), PlatformError> {
        Self::with_clipboard(|clipboard| {
            clipboard.set_image(ImageData {
                width: image.width as usize,
                height: image.height as usize,
                bytes: Cow::Borrowed(&image.rgba),
            })
        })
    }

    fn save_file(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, PlatformError> {
        fs::create_dir_all(&self.export_dir)?;
        let path = self.export_dir.join(name);
        fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "exported file");
        Ok(path)
    }

    fn notify(&self, message: &str) {
        tracing::info!(target: "merview::notice", "{message}");
    }
}
