//! Diagram renderer: backend call, surface population and toolbar wiring.

use merview_dom::{Element, parse_fragment};
use merview_scanner::PreviewWidget;

use crate::backend::DiagramBackend;
use crate::id::generate_diagram_id;
use crate::measure::measure_rendered;
use crate::options::RenderOptions;
use crate::widget::{ArmedControls, RenderedWidget, ToolbarAction};

/// Class added to every populated surface.
pub const CONTAINER_CLASS: &str = "mermaid-preview-container";
/// Region holding the SVG or the error message.
pub const DIAGRAM_CLASS: &str = "mermaid-diagram";
/// Region holding the buttons.
pub const TOOLBAR_CLASS: &str = "mermaid-toolbar";
pub const BUTTON_CLASS: &str = "mermaid-btn";
pub const ERROR_CLASS: &str = "mermaid-error";
/// Outer element of a live-preview widget.
pub const EDITOR_WIDGET_CLASS: &str = "mermaid-editor-widget";
pub const HEADER_CLASS: &str = "mermaid-preview-header";

/// Measured size stored on the rendered `<svg>`.
pub const ACCURATE_WIDTH_ATTR: &str = "data-accurate-width";
pub const ACCURATE_HEIGHT_ATTR: &str = "data-accurate-height";

/// Renders diagram source into surfaces.
///
/// Holds no mutable state; one renderer can serve many surfaces from many
/// threads. Options are fixed per renderer: to change the theme, build a new
/// renderer with [`with_options`](Self::with_options).
pub struct DiagramRenderer {
    backend: Box<dyn DiagramBackend>,
    options: RenderOptions,
}

impl DiagramRenderer {
    #[must_use]
    pub fn new(backend: Box<dyn DiagramBackend>) -> Self {
        Self {
            backend,
            options: RenderOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Populate `surface` with the rendered diagram and its toolbar.
    ///
    /// Prior content of the surface is removed; its attributes are kept. A
    /// backend failure is shown inline and leaves the toolbar inert.
    pub fn render(&self, surface: &mut Element, source: &str) -> RenderedWidget {
        surface.empty();
        surface.add_class(CONTAINER_CLASS);

        let mut diagram = Element::new("div").with_class(DIAGRAM_CLASS);
        let toolbar = build_toolbar();

        let id = generate_diagram_id();
        let widget = match self.backend.render_to_markup(&id, source, &self.options) {
            Ok(markup) => {
                inject_markup(&mut diagram, &markup);

                let dimensions = measure_rendered(&markup);
                if let Some(svg) = diagram.find_descendant_mut("svg") {
                    svg.set_attr(ACCURATE_WIDTH_ATTR, dimensions.width.to_string());
                    svg.set_attr(ACCURATE_HEIGHT_ATTR, dimensions.height.to_string());
                }

                tracing::info!(%id, %dimensions, "rendered diagram");
                RenderedWidget::armed(ArmedControls {
                    source: source.to_owned(),
                    markup,
                    id,
                    dimensions,
                })
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "diagram rendering failed");
                diagram.append(
                    Element::new("div")
                        .with_class(ERROR_CLASS)
                        .with_text(format!("Error rendering mermaid diagram: {e}")),
                );
                RenderedWidget::inert()
            }
        };

        surface.append(diagram);
        surface.append(toolbar);
        widget
    }

    /// Build the element for a live-preview widget: a header followed by
    /// the rendered surface.
    #[must_use]
    pub fn render_preview(&self, preview: &PreviewWidget) -> (Element, RenderedWidget) {
        let mut body = Element::new("div");
        let widget = self.render(&mut body, preview.source());

        let element = Element::new("div")
            .with_class(EDITOR_WIDGET_CLASS)
            .with_children(vec![
                Element::new("div")
                    .with_class(HEADER_CLASS)
                    .with_text(preview.header()),
                body,
            ]);
        (element, widget)
    }
}

fn build_toolbar() -> Element {
    let buttons = ToolbarAction::ALL
        .into_iter()
        .map(|action| {
            Element::new("button")
                .with_class(BUTTON_CLASS)
                .with_attr("data-action", action.data_action())
                .with_text(action.label())
        })
        .collect();
    Element::new("div")
        .with_class(TOOLBAR_CLASS)
        .with_children(buttons)
}

/// Parse `markup` into `region`. Unparseable markup is kept as text.
fn inject_markup(region: &mut Element, markup: &str) {
    match parse_fragment(markup) {
        Ok(fragment) => {
            region.text = fragment.text;
            region.children = fragment.children;
        }
        Err(e) => {
            tracing::debug!(error = %e, "markup is not a well-formed tree, injecting as text");
            region.text = markup.to_owned();
        }
    }
}
