//! Element tree used as a display surface by merview.
//!
//! The host's visual surface (an editor widget container, or a region of an
//! already-rendered document) is modeled as a plain [`Element`] tree:
//! - [`Element`]: tag, ordered attributes, text, tail and children
//! - [`parse_fragment`]: parse an HTML/SVG fragment into a tree
//! - [`serialize_children`] / [`serialize`]: write a tree back to markup
//!
//! Nodes are addressed by [`NodePath`] (child indices from the root), which
//! lets callers look up parents and siblings without back-pointers.
//!
//! # Example
//!
//! ```
//! use merview_dom::{parse_fragment, serialize_children};
//!
//! let tree = parse_fragment(r#"<div class="mermaid">graph TD; A-->B</div>"#).unwrap();
//! assert_eq!(tree.children[0].text, "graph TD; A-->B");
//! assert_eq!(
//!     serialize_children(&tree),
//!     r#"<div class="mermaid">graph TD; A--&gt;B</div>"#
//! );
//! ```

mod element;
mod entities;
mod error;
mod parser;
mod serializer;

pub use element::{COMMENT_TAG, Element, NodePath};
pub use entities::{convert_html_entities, escape_bare_ampersands};
pub use error::ParseError;
pub use parser::parse_fragment;
pub use serializer::{serialize, serialize_children};

/// HTML elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Whether `tag` is an HTML void element.
pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// Elements whose content is raw text, not markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Whether `tag` holds raw text (no escaping, no child elements).
pub(crate) fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}
