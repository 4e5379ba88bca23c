//! SVG to PNG conversion.
//!
//! Diagrams are drawn onto an opaque white pixmap of exactly the requested
//! size; the SVG is stretched independently on each axis to fill it.

use tiny_skia::{Color, Pixmap, Transform};

use crate::error::RasterError;
use crate::measure::{Dimensions, parse_svg, resolve_raster_dimensions};

/// A rasterized diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// PNG-encoded image.
    pub png: Vec<u8>,
    /// Raw RGBA8 pixels, row-major. Fully opaque.
    pub rgba: Vec<u8>,
}

impl RasterImage {
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Rasterize `svg` at exactly `size`.
///
/// Output is deterministic for a given SVG and size.
pub fn rasterize(svg: &str, size: Dimensions) -> Result<RasterImage, RasterError> {
    let Dimensions { width, height } = size;
    if width == 0 || height == 0 {
        return Err(RasterError::InvalidSize { width, height });
    }

    let tree = parse_svg(svg)?;
    let mut pixmap = Pixmap::new(width, height).ok_or(RasterError::PixmapAlloc { width, height })?;
    pixmap.fill(Color::WHITE);

    let declared = tree.size();
    #[allow(clippy::cast_precision_loss)]
    let transform = Transform::from_scale(
        width as f32 / declared.width(),
        height as f32 / declared.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    let png = pixmap.encode_png().map_err(|_| RasterError::PngEncode)?;
    tracing::debug!(%size, bytes = png.len(), "rasterized diagram");

    Ok(RasterImage {
        width,
        height,
        png,
        // Opaque background: premultiplied and straight alpha coincide
        rgba: pixmap.take(),
    })
}

/// Rasterize `svg` at `scale`, sizing it with
/// [`resolve_raster_dimensions`].
///
/// Toolbar actions pass the size measured at render time. Without one the
/// SVG is measured again, then its `viewBox` is used, then the default size.
pub fn svg_to_png(
    svg: &str,
    provided: Option<Dimensions>,
    scale: f32,
) -> Result<RasterImage, RasterError> {
    rasterize(svg, resolve_raster_dimensions(svg, provided, scale))
}
