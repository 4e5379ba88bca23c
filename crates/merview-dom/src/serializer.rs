//! Tree serializer.
//!
//! Void elements self-close and every other element gets an explicit end tag
//! even when empty. Comments are written back as they were read; `script` and
//! `style` bodies are written unescaped, as HTML expects.

use std::fmt::Write;

use crate::element::Element;
use crate::{is_raw_text, is_void};

/// Serialize an element (including its tail).
#[must_use]
pub fn serialize(node: &Element) -> String {
    let mut out = String::with_capacity(1024);
    serialize_node(node, &mut out);
    out
}

/// Serialize the content of an element: its text and children, without the
/// element's own tags. Used to undo the wrapper added by
/// [`parse_fragment`](crate::parse_fragment).
#[must_use]
pub fn serialize_children(node: &Element) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(&escape_text(&node.text));
    for child in &node.children {
        serialize_node(child, &mut out);
    }
    out
}

fn serialize_node(node: &Element, out: &mut String) {
    if node.is_comment() {
        out.push_str("<!--");
        out.push_str(&node.text);
        out.push_str("-->");
        out.push_str(&escape_text(&node.tail));
        return;
    }

    out.push('<');
    out.push_str(&node.tag);

    for (key, value) in &node.attrs {
        write!(out, r#" {}="{}""#, key, escape_attr(value)).unwrap();
    }

    if is_void(&node.tag) {
        out.push_str(" />");
    } else {
        out.push('>');
        if is_raw_text(&node.tag) {
            out.push_str(&node.text);
        } else {
            out.push_str(&escape_text(&node.text));
        }
        for child in &node.children {
            serialize_node(child, out);
        }
        write!(out, "</{}>", node.tag).unwrap();
    }

    out.push_str(&escape_text(&node.tail));
}

fn escape_text(text: &str) -> String {
    escape_xml(text, false)
}

fn escape_attr(text: &str) -> String {
    escape_xml(text, true)
}

fn escape_xml(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            '\'' if escape_quotes => result.push_str("&apos;"),
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_fragment;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_with_children_and_tail() {
        let strong = Element::new("strong").with_text("Bold").with_tail(" text");
        let p = Element::new("p").with_children(vec![strong]);

        assert_eq!(serialize(&p), "<p><strong>Bold</strong> text</p>");
    }

    #[test]
    fn test_serialize_empty_element_keeps_end_tag() {
        let div = Element::new("div").with_class("mermaid-diagram");
        assert_eq!(serialize(&div), r#"<div class="mermaid-diagram"></div>"#);
    }

    #[test]
    fn test_serialize_void_element() {
        let p = Element::new("p")
            .with_text("Before")
            .with_children(vec![Element::new("br").with_tail("After")]);
        assert_eq!(serialize(&p), "<p>Before<br />After</p>");
    }

    #[test]
    fn test_escape_special_chars() {
        let code = Element::new("code")
            .with_attr("data-original-code", r#"A["x"]"#)
            .with_text("A --> B & C");
        assert_eq!(
            serialize(&code),
            r#"<code data-original-code="A[&quot;x&quot;]">A --&gt; B &amp; C</code>"#
        );
    }

    #[test]
    fn test_comment_round_trip() {
        let html = "<!-- keep me --><p>x</p><!--a & b-->tail";
        let tree = parse_fragment(html).unwrap();
        assert_eq!(serialize_children(&tree), html);
    }

    #[test]
    fn test_raw_text_round_trip() {
        let html = r#"<script>if (a < b && c) {}</script><style>a > b { color: red; }</style><div class="mermaid">graph TD</div>"#;
        let tree = parse_fragment(html).unwrap();
        assert_eq!(serialize_children(&tree), html);
    }

    #[test]
    fn test_bare_ampersand_is_escaped_once() {
        let tree = parse_fragment("<p>Q & A</p>").unwrap();
        assert_eq!(serialize_children(&tree), "<p>Q &amp; A</p>");
    }

    #[test]
    fn test_reparse_is_stable() {
        let html = r#"<div class="a"><p>One<br />two</p><svg viewBox="0 0 1 1"><rect width="1"></rect></svg></div>tail"#;
        let tree = parse_fragment(html).unwrap();
        assert_eq!(serialize_children(&tree), html);
    }
}
