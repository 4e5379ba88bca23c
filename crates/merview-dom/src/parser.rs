//! Fragment parser built on quick-xml.
//!
//! Rendered documents are XHTML-like: diagram SVG is well-formed XML, the
//! surrounding HTML mostly is. The parser is lenient where HTML differs from
//! XML: named entities are converted up front, a bare `&` is escaped, void
//! elements (`<br>`) need no closing tag, `script` and `style` bodies are raw
//! text, and mismatched end tags are skipped instead of failing. Comments are
//! kept as [`COMMENT_TAG`](crate::COMMENT_TAG) nodes.

use std::borrow::Cow;
use std::io::BufRead;
use std::sync::LazyLock;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::Regex;

use crate::element::Element;
use crate::entities::{convert_html_entities, decode_entity, escape_bare_ampersands};
use crate::error::ParseError;
use crate::is_void;

/// Tag of the synthetic wrapper returned by [`parse_fragment`].
const ROOT_TAG: &str = "root";

/// XML declarations and doctypes are not allowed inside the wrapper.
static PROLOG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\?xml[^>]*\?>|<!DOCTYPE[^>\[]*(\[[^\]]*\])?\s*>")
        .expect("invalid prolog regex")
});

/// Comments and raw-text elements. Groups 1 to 3 (open tag, body, close tag)
/// are set for raw-text elements only.
static PROTECTED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<!--.*?-->|(<(?:script|style)\b(?:[^>]*[^/>])?>)(.*?)(</(?:script|style)\s*>)",
    )
    .expect("invalid protected regex")
});

/// Parse a markup fragment into a tree.
///
/// The returned element is a synthetic `root` wrapper whose children are the
/// top-level nodes of the fragment. Text before the first top-level element
/// is stored in the wrapper's `text`.
///
/// # Errors
///
/// Returns an error if the fragment is not parseable even with the lenient
/// rules above (e.g. an unterminated tag).
pub fn parse_fragment(markup: &str) -> Result<Element, ParseError> {
    let markup = PROLOG_PATTERN.replace_all(markup, "");
    let markup = prepare_markup(&markup);
    let wrapped = format!("<{ROOT_TAG}>{markup}</{ROOT_TAG}>");

    let mut reader = Reader::from_str(&wrapped);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;

    // Skip the wrapper's own start tag
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(_) => break,
            Event::Eof => return Ok(Element::new(ROOT_TAG)),
            _ => {}
        }
        buf.clear();
    }

    let mut root = parse_children(&mut reader, ROOT_TAG)?;
    root.tag = ROOT_TAG.to_owned();
    Ok(root)
}

/// Make HTML readable as XML.
///
/// Entity handling only applies outside comments and raw-text bodies; raw
/// bodies are wrapped in CDATA so `<` and `&` survive as text.
fn prepare_markup(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len() + 64);
    let mut last = 0;

    for caps in PROTECTED_PATTERN.captures_iter(markup) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&normalize_entities(&markup[last..whole.start()]));

        match (caps.get(1), caps.get(2), caps.get(3)) {
            (Some(open), Some(body), Some(close)) => {
                out.push_str(&normalize_entities(open.as_str()));
                if !body.as_str().is_empty() {
                    out.push_str("<![CDATA[");
                    out.push_str(&body.as_str().replace("]]>", "]]]]><![CDATA[>"));
                    out.push_str("]]>");
                }
                out.push_str(close.as_str());
            }
            _ => out.push_str(whole.as_str()),
        }
        last = whole.end();
    }

    out.push_str(&normalize_entities(&markup[last..]));
    out
}

fn normalize_entities(segment: &str) -> String {
    escape_bare_ampersands(&convert_html_entities(segment))
}

/// Parse children until the end tag of `parent_tag` (or end of input).
fn parse_children<R: BufRead>(
    reader: &mut Reader<R>,
    parent_tag: &str,
) -> Result<Element, ParseError> {
    let mut buf = Vec::new();
    let mut node = Element::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let tag = decode_tag(reader, e.name().as_ref());
                let attrs = decode_attrs(reader, &e);
                let mut child = if is_void(&tag) {
                    Element::default()
                } else {
                    parse_children(reader, &tag)?
                };
                child.tag = tag;
                child.attrs = attrs;
                node.children.push(child);
            }
            Event::Empty(e) => {
                let child = Element {
                    tag: decode_tag(reader, e.name().as_ref()),
                    attrs: decode_attrs(reader, &e),
                    ..Default::default()
                };
                node.children.push(child);
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?.into_owned();
                append_text(&mut node, &text);
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?.into_owned();
                append_text(&mut node, &decode_entity(&entity));
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                append_text(&mut node, &text);
            }
            Event::End(e) => {
                let end_tag = decode_tag(reader, e.name().as_ref());
                if end_tag.eq_ignore_ascii_case(parent_tag) {
                    return Ok(node);
                }
                // Stray end tag (e.g. `</br>`), ignore
            }
            Event::Eof => return Ok(node),
            Event::Comment(e) => {
                let body = String::from_utf8_lossy(&e).into_owned();
                node.children.push(Element::comment(body));
            }
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
        buf.clear();
    }
}

fn decode_tag<R: BufRead>(reader: &Reader<R>, name: &[u8]) -> String {
    reader
        .decoder()
        .decode(name)
        .map_or_else(|_| String::from_utf8_lossy(name).into_owned(), Cow::into_owned)
}

fn decode_attrs<R: BufRead>(reader: &Reader<R>, e: &BytesStart) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    for attr in e.html_attributes().flatten() {
        let key = reader
            .decoder()
            .decode(attr.key.as_ref())
            .map_or_else(
                |_| String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                Cow::into_owned,
            );
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            Cow::into_owned,
        );
        attrs.push((key, value));
    }
    attrs
}

/// Append text to node's text or last child's tail.
fn append_text(node: &mut Element, text: &str) {
    if let Some(last_child) = node.children.last_mut() {
        last_child.tail.push_str(text);
    } else {
        node.text.push_str(text);
    }
}
