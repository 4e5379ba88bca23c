//! Diagram measurement.
//!
//! Backends return SVG whose declared size often differs from the area its
//! geometry actually covers. Measurement parses the markup with `usvg` and
//! reads the bounding box of the drawn content, falling back to the root
//! `viewBox` and finally to a fixed default when the markup cannot be
//! measured.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::error::RasterError;

/// Smallest size a rendered diagram is reported at.
pub const MIN_RENDERED: Dimensions = Dimensions::new(150, 100);

/// Smallest size per axis when measuring for rasterization.
pub const MIN_RASTER_SIDE: u32 = 50;

/// Size used when nothing can be measured.
pub const FALLBACK: Dimensions = Dimensions::new(800, 600);

/// Pixel size of a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Round floating-point sizes to whole pixels, at least 1 per axis.
    #[must_use]
    pub fn from_f32(width: f32, height: f32) -> Self {
        Self {
            width: round_px(width).max(1),
            height: round_px(height).max(1),
        }
    }

    /// Raise each axis to at least the corresponding axis of `min`.
    #[must_use]
    pub fn at_least(self, min: Dimensions) -> Self {
        Self {
            width: self.width.max(min.width),
            height: self.height.max(min.height),
        }
    }

    /// Multiply by `scale`, rounding to whole pixels.
    #[must_use]
    pub fn scaled(self, scale: f32) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let (w, h) = (self.width as f32 * scale, self.height as f32 * scale);
        Self {
            width: round_px(w),
            height: round_px(h),
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn round_px(value: f32) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.round().min(u32::MAX as f32) as u32
}

/// System fonts, loaded once and shared by every parse.
static FONTS: LazyLock<Arc<usvg::fontdb::Database>> = LazyLock::new(|| {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    tracing::debug!(faces = db.len(), "loaded system fonts");
    Arc::new(db)
});

/// Parse SVG markup into a render tree.
pub(crate) fn parse_svg(svg: &str) -> Result<usvg::Tree, RasterError> {
    let mut opt = usvg::Options::default();
    opt.fontdb = Arc::clone(&FONTS);
    // Mermaid's default stack starts with trebuchet, which few systems have
    opt.font_family = "Arial".to_owned();
    usvg::Tree::from_str(svg, &opt).map_err(|e| RasterError::SvgParse(e.to_string()))
}

/// Size of the drawn content, or `None` if the markup has no measurable
/// geometry.
fn content_size(svg: &str) -> Option<(f32, f32)> {
    let tree = match parse_svg(svg) {
        Ok(tree) => tree,
        Err(e) => {
            tracing::debug!(error = %e, "cannot measure SVG");
            return None;
        }
    };
    let root = tree.root();
    if !root.has_children() {
        return None;
    }

    let usable = |w: f32, h: f32| w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0;
    let stroke = root.abs_stroke_bounding_box();
    if usable(stroke.width(), stroke.height()) {
        return Some((stroke.width(), stroke.height()));
    }
    let fill = root.abs_bounding_box();
    usable(fill.width(), fill.height()).then(|| (fill.width(), fill.height()))
}

/// Width and height from the first `viewBox` attribute.
///
/// Values may be separated by whitespace or commas.
pub fn view_box_size(svg: &str) -> Option<(f32, f32)> {
    static VIEW_BOX: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"\bviewBox\s*=\s*["']([^"']*)["']"#).expect("invalid viewBox regex")
    });
    static SEPARATOR: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[\s,]+").expect("invalid separator regex"));

    let raw = VIEW_BOX.captures(svg)?.get(1)?.as_str();
    let values: Vec<f32> = SEPARATOR
        .split(raw.trim())
        .filter(|s| !s.is_empty())
        .map(str::parse::<f32>)
        .collect::<Result<_, _>>()
        .ok()?;
    let [_, _, width, height] = values[..] else {
        return None;
    };
    (width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0)
        .then_some((width, height))
}

/// Measure a freshly rendered diagram.
///
/// Uses the content bounding box, else the `viewBox`, else [`FALLBACK`];
/// the result is never smaller than [`MIN_RENDERED`].
#[must_use]
pub fn measure_rendered(svg: &str) -> Dimensions {
    let measured = content_size(svg)
        .or_else(|| view_box_size(svg))
        .map_or(FALLBACK, |(w, h)| Dimensions::from_f32(w, h));
    let dims = measured.at_least(MIN_RENDERED);
    tracing::debug!(%dims, "measured diagram");
    dims
}

/// Pixel size of a raster export at `scale`.
///
/// `provided` dimensions (measured at render time) win. Otherwise the SVG is
/// measured again with a [`MIN_RASTER_SIDE`] floor per axis, falling back to
/// the `viewBox` and then [`FALLBACK`].
#[must_use]
pub fn resolve_raster_dimensions(svg: &str, provided: Option<Dimensions>, scale: f32) -> Dimensions {
    let base = provided.unwrap_or_else(|| {
        if let Some((w, h)) = content_size(svg) {
            Dimensions::from_f32(w, h).at_least(Dimensions::new(MIN_RASTER_SIDE, MIN_RASTER_SIDE))
        } else {
            view_box_size(svg).map_or(FALLBACK, |(w, h)| Dimensions::from_f32(w, h))
        }
    });
    base.scaled(scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LARGE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300" viewBox="0 0 400 300"><rect x="10" y="20" width="300" height="200" fill="blue"/></svg>"#;
    const TINY: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20" viewBox="0 0 40 20"><rect width="20" height="10" fill="red"/></svg>"#;
    const EMPTY: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0,0,640,480"></svg>"#;

    #[test]
    fn test_measure_uses_content_bounds() {
        assert_eq!(measure_rendered(LARGE), Dimensions::new(300, 200));
    }

    #[test]
    fn test_measure_applies_floor() {
        assert_eq!(measure_rendered(TINY), Dimensions::new(150, 100));
    }

    #[test]
    fn test_measure_floor_per_axis() {
        let wide = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 500 40"><rect width="500" height="30"/></svg>"#;
        assert_eq!(measure_rendered(wide), Dimensions::new(500, 100));
    }

    #[test]
    fn test_measure_falls_back_to_view_box() {
        assert_eq!(measure_rendered(EMPTY), Dimensions::new(640, 480));
    }

    #[test]
    fn test_measure_falls_back_to_default() {
        assert_eq!(measure_rendered("not svg at all"), FALLBACK);
        assert_eq!(measure_rendered(""), FALLBACK);
    }

    #[test]
    fn test_view_box_separators() {
        assert_eq!(view_box_size(r#"<svg viewBox="0 0 10 20">"#), Some((10.0, 20.0)));
        assert_eq!(view_box_size(r#"<svg viewBox="-5,-5, 30 ,40">"#), Some((30.0, 40.0)));
        assert_eq!(view_box_size(r#"<svg viewBox="0 0 10">"#), None);
        assert_eq!(view_box_size(r#"<svg viewBox="0 0 0 20">"#), None);
        assert_eq!(view_box_size("<svg>"), None);
    }

    #[test]
    fn test_resolve_prefers_provided() {
        let provided = Some(Dimensions::new(321, 123));
        assert_eq!(
            resolve_raster_dimensions(LARGE, provided, 1.0),
            Dimensions::new(321, 123)
        );
        assert_eq!(
            resolve_raster_dimensions(LARGE, provided, 2.0),
            Dimensions::new(642, 246)
        );
    }

    #[test]
    fn test_resolve_measures_with_small_floor() {
        assert_eq!(
            resolve_raster_dimensions(TINY, None, 1.0),
            Dimensions::new(50, 50)
        );
        assert_eq!(
            resolve_raster_dimensions(LARGE, None, 0.5),
            Dimensions::new(150, 100)
        );
    }

    #[test]
    fn test_resolve_fallbacks() {
        assert_eq!(
            resolve_raster_dimensions(EMPTY, None, 1.0),
            Dimensions::new(640, 480)
        );
        assert_eq!(resolve_raster_dimensions("garbage", None, 1.0), FALLBACK);
    }

    #[test]
    fn test_dimensions_display() {
        assert_eq!(Dimensions::new(300, 200).to_string(), "300×200");
    }
}
