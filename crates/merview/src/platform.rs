//! Terminal-facing platform.

use std::path::PathBuf;

use merview_render::{Platform, PlatformError, RasterImage, SystemPlatform};

use crate::output::Output;

/// [`SystemPlatform`] that also shows notices on the terminal.
pub(crate) struct CliPlatform {
    inner: SystemPlatform,
    output: Output,
}

impl CliPlatform {
    pub(crate) fn new(export_dir: PathBuf) -> Self {
        Self {
            inner: SystemPlatform::new(export_dir),
            output: Output::new(),
        }
    }
}

impl Platform for CliPlatform {
    fn write_text(&self, text: &str) -> Result<(), PlatformError> {
        self.inner.write_text(text)
    }

    fn write_image(&self, image: &RasterImage) -> Result<(), PlatformError> {
        self.inner.write_image(image)
    }

    fn save_file(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, PlatformError> {
        self.inner.save_file(name, bytes)
    }

    fn notify(&self, message: &str) {
        self.inner.notify(message);
        self.output.success(message);
    }
}
