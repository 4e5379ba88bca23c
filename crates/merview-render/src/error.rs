//! Error types for rendering, rasterization and platform actions.

/// Backend failed to turn diagram source into SVG.
///
/// Never propagated past the renderer: its message is shown inline in the
/// diagram region.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{program} exited with {status}: {stderr}")]
    Command {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("renderer output is not valid UTF-8")]
    InvalidUtf8,
    /// Renderer rejected the source.
    #[error("{0}")]
    Rejected(String),
}

/// SVG to PNG conversion failed.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("failed to parse SVG: {0}")]
    SvgParse(String),
    #[error("failed to allocate {width}x{height} pixmap")]
    PixmapAlloc { width: u32, height: u32 },
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("invalid raster size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

/// Clipboard or file export failed.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("clipboard error: {0}")]
    Clipboard(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Raster(#[from] RasterError),
}
