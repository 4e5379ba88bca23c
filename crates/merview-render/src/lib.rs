//! Mermaid diagram rendering for merview.
//!
//! This crate turns diagram source into an interactive preview:
//! - [`DiagramRenderer`] calls an external backend, injects the SVG into a
//!   surface element and attaches a four-button toolbar
//! - [`RenderedWidget::click`] performs the toolbar actions (copy code, copy
//!   image, export PNG, export SVG) through a [`Platform`]
//! - [`static_view`] finds diagrams in already rendered HTML and feeds them
//!   through the same renderer
//!
//! # Architecture
//!
//! The crate is organized into modules:
//! - [`backend`]: `DiagramBackend` trait with Kroki and command-line implementations
//! - [`measure`]: SVG bounding-box measurement with viewBox fallbacks
//! - [`raster`]: SVG to PNG conversion on a white background
//! - [`platform`]: clipboard, file export and notices
//! - [`static_view`]: enhancement of rendered documents
//!
//! # Example
//!
//! ```ignore
//! use merview_dom::Element;
//! use merview_render::{DiagramRenderer, KrokiBackend, RenderOptions};
//!
//! let renderer = DiagramRenderer::new(Box::new(KrokiBackend::new("https://kroki.io")))
//!     .with_options(RenderOptions::default());
//!
//! let mut surface = Element::new("div");
//! let widget = renderer.render(&mut surface, "graph TD; A-->B");
//! assert!(widget.is_armed());
//! ```

pub mod backend;
mod error;
mod id;
pub mod measure;
mod options;
pub mod platform;
pub mod raster;
mod renderer;
pub mod static_view;
mod widget;

pub use backend::{CommandBackend, DiagramBackend, KrokiBackend};
pub use error::{PlatformError, RasterError, RenderError};
pub use id::generate_diagram_id;
pub use measure::Dimensions;
pub use options::RenderOptions;
pub use platform::{Platform, SystemPlatform};
pub use raster::RasterImage;
pub use renderer::DiagramRenderer;
pub use static_view::{Enhanced, RecoveryPolicy, enhance_document};
pub use widget::{ActionOutcome, ArmedControls, Controls, RenderedWidget, ToolbarAction};
