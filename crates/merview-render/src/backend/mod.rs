//! External renderers that turn mermaid source into SVG markup.
//!
//! The layout algorithm is not implemented here: a backend hands the source
//! to a real mermaid implementation and returns whatever SVG it produces.

mod command;
mod kroki;

use std::time::Duration;

use merview_config::{BackendKind, RendererConfig};

pub use command::CommandBackend;
pub use kroki::KrokiBackend;

use crate::error::RenderError;
use crate::options::RenderOptions;

/// Renderer contract: diagram source in, SVG markup out.
pub trait DiagramBackend: Send + Sync {
    /// Render `source` to SVG markup.
    ///
    /// `id` is unique per call and should become the root element id.
    fn render_to_markup(
        &self,
        id: &str,
        source: &str,
        options: &RenderOptions,
    ) -> Result<String, RenderError>;
}

impl<T: DiagramBackend + ?Sized> DiagramBackend for std::sync::Arc<T> {
    fn render_to_markup(
        &self,
        id: &str,
        source: &str,
        options: &RenderOptions,
    ) -> Result<String, RenderError> {
        (**self).render_to_markup(id, source, options)
    }
}

/// Build the backend selected in `config`.
#[must_use]
pub fn from_config(config: &RendererConfig) -> Box<dyn DiagramBackend> {
    let timeout = Duration::from_secs(config.timeout_secs);
    match config.backend {
        BackendKind::Kroki => {
            Box::new(KrokiBackend::new(&config.kroki_url).with_timeout(timeout))
        }
        BackendKind::Command => Box::new(CommandBackend::new(&config.command)),
    }
}

/// Give the root `<svg>` element the requested id.
///
/// Neither Kroki nor the mermaid CLI take an id parameter, so the id is set
/// on the returned markup. Mermaid scopes its embedded stylesheet with
/// `#<id>` selectors; those are renamed along with the attribute.
pub(crate) fn assign_svg_id(markup: &str, id: &str) -> String {
    use std::sync::LazyLock;

    use regex::Regex;

    static SVG_OPEN: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<svg\b[^>]*>").expect("invalid svg regex"));
    static ID_ATTR: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"\sid\s*=\s*"([^"]*)""#).expect("invalid id regex"));

    let Some(open) = SVG_OPEN.find(markup) else {
        return markup.to_owned();
    };
    let tag = open.as_str();
    let previous_id = ID_ATTR
        .captures(tag)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned());
    let new_tag = match previous_id {
        Some(_) => ID_ATTR.replace(tag, format!(r#" id="{id}""#)).into_owned(),
        None => tag.replacen("<svg", &format!(r#"<svg id="{id}""#), 1),
    };

    let mut out = String::with_capacity(markup.len() + id.len() + 6);
    out.push_str(&markup[..open.start()]);
    out.push_str(&new_tag);
    let rest = &markup[open.end()..];
    match previous_id {
        Some(old) if !old.is_empty() => out.push_str(&rest.replace(&format!("#{old}"), &format!("#{id}"))),
        _ => out.push_str(rest),
    }
    out
}
