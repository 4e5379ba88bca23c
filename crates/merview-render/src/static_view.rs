//! Enhancement of already rendered documents.
//!
//! A finished document may contain diagrams that another component already
//! turned into SVG or left as code blocks. [`enhance_document`] finds them,
//! recovers their source and renders each one again through
//! [`DiagramRenderer`], so static views get the same toolbar as live
//! previews.
//!
//! Recovery is best effort: rendered output does not always carry the
//! original source.

use merview_dom::{Element, NodePath, ParseError, parse_fragment, serialize_children};
use rayon::prelude::*;

use crate::renderer::{CONTAINER_CLASS, DiagramRenderer};
use crate::widget::RenderedWidget;

/// Diagram substituted when no source can be recovered, if allowed.
pub const PLACEHOLDER_SOURCE: &str = "graph TD; A --> B";

/// Attribute some renderers keep the original source in.
pub const ORIGINAL_CODE_ATTR: &str = "data-original-code";

/// The kinds of rendered element that can represent a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementShape {
    /// `<svg>` whose id or class mentions mermaid.
    EmbeddedGraphic,
    /// Element with class `mermaid`.
    MarkedContainer,
    /// `<code class="language-mermaid">` inside a `<pre>`.
    TaggedCodeBlock,
    /// Element with `data-type="mermaid"`.
    GenericContainer,
}

/// What to do when no source can be recovered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryPolicy {
    /// Render [`PLACEHOLDER_SOURCE`] instead of skipping the element.
    ///
    /// Off by default: a placeholder looks like a real diagram and can
    /// mislead the reader.
    pub allow_placeholder: bool,
}

/// Result of [`enhance_document`].
#[derive(Debug)]
pub struct Enhanced {
    /// The document with every recovered diagram replaced by a preview.
    pub html: String,
    /// One widget per enhanced diagram, in document order.
    pub widgets: Vec<RenderedWidget>,
}

/// Classify an element. Code blocks only count inside a `<pre>`.
fn classify(element: &Element, has_pre_ancestor: bool) -> Option<ElementShape> {
    if element.is("svg") {
        let mentions = |name: &str| element.attr(name).is_some_and(|v| v.contains("mermaid"));
        return (mentions("id") || mentions("class")).then_some(ElementShape::EmbeddedGraphic);
    }
    if element.has_class("mermaid") {
        return Some(ElementShape::MarkedContainer);
    }
    if element.is("code") && element.has_class("language-mermaid") && has_pre_ancestor {
        return Some(ElementShape::TaggedCodeBlock);
    }
    if element.attr("data-type") == Some("mermaid") {
        return Some(ElementShape::GenericContainer);
    }
    None
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Recover the diagram source of the element at `path`.
///
/// Each shape has its own chain:
/// - embedded graphic: `<title>`, then a preceding sibling `<code>`, then the
///   original-code attribute (the SVG's own text is label text, not source)
/// - tagged code block: the code text
/// - marked and generic containers: the original-code attribute, then the
///   text content
///
/// The placeholder ends every chain when `policy` allows it.
fn recover_source(
    tree: &Element,
    path: &NodePath,
    shape: ElementShape,
    policy: RecoveryPolicy,
) -> Option<String> {
    let element = tree.get(path)?;
    let recovered = match shape {
        ElementShape::EmbeddedGraphic => element
            .child_by_tag("title")
            .and_then(|title| non_empty(&title.text_content()))
            .or_else(|| {
                path.previous_sibling()
                    .and_then(|sibling| tree.get(&sibling))
                    .filter(|sibling| sibling.is("code"))
                    .and_then(|code| non_empty(&code.text_content()))
            })
            .or_else(|| element.attr(ORIGINAL_CODE_ATTR).and_then(non_empty)),
        ElementShape::TaggedCodeBlock => non_empty(&element.text_content()),
        ElementShape::MarkedContainer | ElementShape::GenericContainer => element
            .attr(ORIGINAL_CODE_ATTR)
            .and_then(non_empty)
            .or_else(|| non_empty(&element.text_content())),
    };

    recovered.or_else(|| {
        if policy.allow_placeholder {
            tracing::warn!(?shape, "no diagram source found, using placeholder");
            Some(PLACEHOLDER_SOURCE.to_owned())
        } else {
            tracing::debug!(?shape, "no diagram source found, skipping element");
            None
        }
    })
}

/// Where the rendered preview goes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    path: NodePath,
    /// Replace the element with a fresh `<div>` instead of reusing it.
    replace: bool,
}

/// Enhancement target for a match.
fn target_for(path: &NodePath, shape: ElementShape, pre_ancestor: Option<&NodePath>) -> Target {
    match shape {
        ElementShape::EmbeddedGraphic => match path.parent() {
            // An SVG at the top level has no parent to reuse
            Some(parent) if !parent.indices().is_empty() => Target {
                path: parent,
                replace: false,
            },
            _ => Target {
                path: path.clone(),
                replace: true,
            },
        },
        // The preview is block content, which does not belong in a `<pre>`
        ElementShape::TaggedCodeBlock => Target {
            path: pre_ancestor.cloned().unwrap_or_else(|| path.clone()),
            replace: true,
        },
        ElementShape::MarkedContainer | ElementShape::GenericContainer => Target {
            path: path.clone(),
            replace: false,
        },
    }
}

/// A diagram found in a document.
#[derive(Debug)]
struct Match {
    shape: ElementShape,
    source: String,
    target: Target,
}

fn overlaps(a: &NodePath, b: &NodePath) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

/// Find diagrams in `tree`, outermost first.
///
/// A match whose target overlaps an earlier match's target is skipped, as is
/// anything inside an already enhanced container.
fn collect_matches(tree: &Element, policy: RecoveryPolicy) -> Vec<Match> {
    let mut matches: Vec<Match> = Vec::new();
    let mut enhanced: Vec<NodePath> = Vec::new();
    // `pre` elements seen so far, for ancestor lookup
    let mut pres: Vec<NodePath> = Vec::new();

    for (path, element) in tree.descendants() {
        if enhanced.iter().any(|done| path.starts_with(done)) {
            continue;
        }
        if element.has_class(CONTAINER_CLASS) {
            enhanced.push(path);
            continue;
        }
        if element.is("pre") {
            pres.push(path.clone());
        }

        let pre_ancestor = pres
            .iter()
            .rev()
            .find(|pre| path.starts_with(pre) && **pre != path);
        let Some(shape) = classify(element, pre_ancestor.is_some()) else {
            continue;
        };

        let target = target_for(&path, shape, pre_ancestor);
        if matches.iter().any(|m| overlaps(&m.target.path, &target.path)) {
            continue;
        }
        let Some(source) = recover_source(tree, &path, shape, policy) else {
            continue;
        };
        matches.push(Match {
            shape,
            source,
            target,
        });
    }

    matches
}

/// Find diagrams in rendered `html` and replace each with an enhanced
/// preview.
///
/// Matches are rendered in parallel; each owns its own target element.
///
/// # Errors
///
/// Returns an error if `html` cannot be parsed.
pub fn enhance_document(
    html: &str,
    renderer: &DiagramRenderer,
    policy: RecoveryPolicy,
) -> Result<Enhanced, ParseError> {
    let mut tree = parse_fragment(html)?;
    let matches = collect_matches(&tree, policy);
    tracing::debug!(matches = matches.len(), "found diagrams in document");

    // Render into detached surfaces, then write back in document order
    let rendered: Vec<(NodePath, Element, RenderedWidget)> = matches
        .par_iter()
        .filter_map(|m| {
            let original = tree.get(&m.target.path)?;
            let mut surface = if m.target.replace {
                Element::new("div")
            } else {
                Element::new(original.tag.clone())
            };
            if !m.target.replace {
                surface.attrs.clone_from(&original.attrs);
            }
            surface.tail.clone_from(&original.tail);

            tracing::debug!(shape = ?m.shape, "enhancing diagram");
            let widget = renderer.render(&mut surface, &m.source);
            Some((m.target.path.clone(), surface, widget))
        })
        .collect();

    let mut widgets = Vec::with_capacity(rendered.len());
    for (path, surface, widget) in rendered {
        if let Some(slot) = tree.get_mut(&path) {
            *slot = surface;
            widgets.push(widget);
        }
    }

    Ok(Enhanced {
        html: serialize_children(&tree),
        widgets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shape_of(html: &str) -> Option<ElementShape> {
        let tree = parse_fragment(html).unwrap();
        let matches = collect_matches(
            &tree,
            RecoveryPolicy {
                allow_placeholder: true,
            },
        );
        matches.first().map(|m| m.shape)
    }

    fn sources(html: &str, policy: RecoveryPolicy) -> Vec<String> {
        let tree = parse_fragment(html).unwrap();
        collect_matches(&tree, policy)
            .into_iter()
            .map(|m| m.source)
            .collect()
    }

    const LENIENT: RecoveryPolicy = RecoveryPolicy {
        allow_placeholder: true,
    };

    #[test]
    fn test_classify_each_shape() {
        assert_eq!(
            shape_of(r#"<div><svg id="mermaid-123"><title>graph TD</title></svg></div>"#),
            Some(ElementShape::EmbeddedGraphic)
        );
        assert_eq!(
            shape_of(r#"<div><svg class="flowchart-mermaid-svg"/></div>"#),
            Some(ElementShape::EmbeddedGraphic)
        );
        assert_eq!(
            shape_of(r#"<div class="mermaid">graph TD</div>"#),
            Some(ElementShape::MarkedContainer)
        );
        assert_eq!(
            shape_of(r#"<pre><code class="language-mermaid">graph TD</code></pre>"#),
            Some(ElementShape::TaggedCodeBlock)
        );
        assert_eq!(
            shape_of(r#"<div data-type="mermaid">graph TD</div>"#),
            Some(ElementShape::GenericContainer)
        );
    }

    #[test]
    fn test_classify_non_matches() {
        assert_eq!(shape_of(r#"<svg id="chart"><title>x</title></svg>"#), None);
        assert_eq!(shape_of(r#"<code class="language-mermaid">graph TD</code>"#), None);
        assert_eq!(shape_of(r#"<div data-type="plantuml">x</div>"#), None);
        assert_eq!(shape_of("<p>graph TD</p>"), None);
    }

    #[test]
    fn test_svg_source_from_title() {
        let html = r#"<div><code>graph LR; X-->Y</code><svg id="mermaid-1" data-original-code="graph TB"><title>graph TD; A-->B</title><text>A</text></svg></div>"#;
        assert_eq!(sources(html, LENIENT), vec!["graph TD; A-->B"]);
    }

    #[test]
    fn test_svg_source_from_sibling_code() {
        let html = r#"<div><code>graph LR; X-->Y</code><svg id="mermaid-1" data-original-code="graph TB"><text>A</text></svg></div>"#;
        assert_eq!(sources(html, LENIENT), vec!["graph LR; X-->Y"]);
    }

    #[test]
    fn test_svg_source_from_attribute() {
        let html = r#"<div><p>x</p><svg id="mermaid-1" data-original-code="graph TB; P-->Q"><text>A</text></svg></div>"#;
        assert_eq!(sources(html, LENIENT), vec!["graph TB; P-->Q"]);
    }

    #[test]
    fn test_svg_label_text_is_not_source() {
        let html = r#"<div><svg id="mermaid-1"><text>Start</text></svg></div>"#;
        assert_eq!(sources(html, LENIENT), vec![PLACEHOLDER_SOURCE]);
        assert!(sources(html, RecoveryPolicy::default()).is_empty());
    }

    #[test]
    fn test_container_prefers_attribute_over_text() {
        let html = r#"<div class="mermaid" data-original-code="graph TD; A-->B">rendered labels</div>"#;
        assert_eq!(sources(html, LENIENT), vec!["graph TD; A-->B"]);

        let html = r#"<div data-type="mermaid">  sequenceDiagram
  A->>B: hi  </div>"#;
        assert_eq!(sources(html, LENIENT), vec!["sequenceDiagram\n  A->>B: hi"]);
    }

    #[test]
    fn test_empty_container_needs_placeholder() {
        let html = r#"<div class="mermaid">   </div>"#;
        assert!(sources(html, RecoveryPolicy::default()).is_empty());
        assert_eq!(sources(html, LENIENT), vec![PLACEHOLDER_SOURCE]);
    }

    #[test]
    fn test_code_block_source_and_target() {
        let html = r#"<pre class="x"><code class="language-mermaid">graph TD;
  A--&gt;B
</code></pre>"#;
        let tree = parse_fragment(html).unwrap();
        let matches = collect_matches(&tree, RecoveryPolicy::default());

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].source, "graph TD;\n  A-->B");
        assert!(tree.get(&matches[0].target.path).unwrap().is("pre"));
    }

    #[test]
    fn test_outermost_match_wins() {
        // The marked container holds an already rendered svg and the code
        let html = r#"<div class="mermaid" data-original-code="graph TD; A-->B"><svg id="mermaid-9"><title>other</title></svg></div>"#;
        let tree = parse_fragment(html).unwrap();
        let matches = collect_matches(&tree, RecoveryPolicy::default());

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].shape, ElementShape::MarkedContainer);
        assert_eq!(matches[0].source, "graph TD; A-->B");
    }

    #[test]
    fn test_svgs_sharing_parent_enhanced_once() {
        let html = r#"<div><svg id="mermaid-1"><title>A</title></svg><svg id="mermaid-2"><title>B</title></svg></div>"#;
        assert_eq!(sources(html, RecoveryPolicy::default()), vec!["A"]);
    }

    #[test]
    fn test_top_level_svg_is_replaced() {
        let html = r#"<svg id="mermaid-1"><title>graph TD</title></svg>"#;
        let tree = parse_fragment(html).unwrap();
        let matches = collect_matches(&tree, RecoveryPolicy::default());
        assert!(matches[0].target.replace);
    }

    #[test]
    fn test_already_enhanced_is_skipped() {
        let html = r#"<div class="mermaid-preview-container"><div class="mermaid-diagram"><svg id="mermaid-1"><title>graph TD</title></svg></div></div>"#;
        assert!(sources(html, LENIENT).is_empty());
    }

    mod enhance {
        use super::*;
        use pretty_assertions::assert_eq;
        use crate::backend::DiagramBackend;
        use crate::error::RenderError;
        use crate::options::RenderOptions;

        struct EchoBackend;

        impl DiagramBackend for EchoBackend {
            fn render_to_markup(
                &self,
                id: &str,
                source: &str,
                _options: &RenderOptions,
            ) -> Result<String, RenderError> {
                if source.contains("broken") {
                    return Err(RenderError::Rejected("Parse error on line 1".to_owned()));
                }
                Ok(format!(
                    r#"<svg id="{id}" viewBox="0 0 200 120"><rect width="200" height="120"/></svg>"#
                ))
            }
        }

        fn renderer() -> DiagramRenderer {
            DiagramRenderer::new(Box::new(EchoBackend))
        }

        #[test]
        fn test_enhance_replaces_code_block_and_keeps_tail() {
            let html = r#"<p>Intro</p><pre><code class="language-mermaid">graph TD</code></pre>after"#;
            let enhanced = enhance_document(html, &renderer(), RecoveryPolicy::default()).unwrap();

            assert_eq!(enhanced.widgets.len(), 1);
            assert!(enhanced.widgets[0].is_armed());
            assert!(enhanced.html.starts_with(r#"<p>Intro</p><div class="mermaid-preview-container">"#));
            assert!(enhanced.html.ends_with("</div>after"));
            assert!(!enhanced.html.contains("<pre>"));
            assert_eq!(enhanced.html.matches(r#"class="mermaid-btn""#).count(), 4);
        }

        #[test]
        fn test_enhance_keeps_container_attributes() {
            let html = r#"<div class="mermaid" id="fig-1">graph TD</div>"#;
            let enhanced = enhance_document(html, &renderer(), RecoveryPolicy::default()).unwrap();

            let tree = parse_fragment(&enhanced.html).unwrap();
            let container = &tree.children[0];
            assert_eq!(container.attr("id"), Some("fig-1"));
            assert!(container.has_class("mermaid"));
            assert!(container.has_class(CONTAINER_CLASS));
        }

        #[test]
        fn test_enhance_is_idempotent() {
            let html = r#"<div><svg id="mermaid-1"><title>graph TD</title></svg></div>"#;
            let once = enhance_document(html, &renderer(), RecoveryPolicy::default()).unwrap();
            let twice = enhance_document(&once.html, &renderer(), RecoveryPolicy::default()).unwrap();

            assert_eq!(once.widgets.len(), 1);
            assert!(twice.widgets.is_empty());
            assert_eq!(twice.html, once.html);
        }

        #[test]
        fn test_enhance_failure_shows_error() {
            let html = r#"<div data-type="mermaid">broken diagram</div><div class="mermaid">graph TD</div>"#;
            let enhanced = enhance_document(html, &renderer(), RecoveryPolicy::default()).unwrap();

            assert_eq!(enhanced.widgets.len(), 2);
            assert!(!enhanced.widgets[0].is_armed());
            assert!(enhanced.widgets[1].is_armed());
            assert!(enhanced.html.contains("Error rendering mermaid diagram: Parse error on line 1"));
        }

        #[test]
        fn test_enhance_without_diagrams_is_unchanged() {
            let html = "<h1>Title</h1><p>Plain <em>text</em></p>";
            let enhanced = enhance_document(html, &renderer(), RecoveryPolicy::default()).unwrap();
            assert!(enhanced.widgets.is_empty());
            assert_eq!(enhanced.html, html);
        }

        #[test]
        fn test_enhance_tolerates_bare_ampersand() {
            let html = r#"<p>Q & A</p><pre><code class="language-mermaid">graph TD; A[R & D]-->B</code></pre>"#;
            let enhanced = enhance_document(html, &renderer(), RecoveryPolicy::default()).unwrap();

            assert_eq!(enhanced.widgets.len(), 1);
            assert!(enhanced.widgets[0].is_armed());
            assert!(enhanced.html.starts_with("<p>Q &amp; A</p><div"));
        }

        #[test]
        fn test_enhance_keeps_comments_and_scripts() {
            let html = r#"<!-- keep me --><script>if (a < b) {}</script><div class="mermaid">graph TD</div><!-- end -->"#;
            let enhanced = enhance_document(html, &renderer(), RecoveryPolicy::default()).unwrap();

            assert_eq!(enhanced.widgets.len(), 1);
            assert!(enhanced.html.starts_with(
                r#"<!-- keep me --><script>if (a < b) {}</script><div class="mermaid mermaid-preview-container">"#
            ));
            assert!(enhanced.html.ends_with("</div><!-- end -->"));
        }

        #[test]
        fn test_enhance_top_level_svg() {
            let html = r#"<svg id="mermaid-1"><title>graph TD</title></svg> trailing"#;
            let enhanced = enhance_document(html, &renderer(), RecoveryPolicy::default()).unwrap();
            assert!(enhanced.html.starts_with(r#"<div class="mermaid-preview-container">"#));
            assert!(enhanced.html.ends_with("</div> trailing"));
        }
    }

    #[test]
    fn test_multiple_independent_matches() {
        let html = r#"<h1>Doc</h1>
<pre><code class="language-mermaid">graph TD</code></pre>
<p>text</p>
<div class="mermaid">pie</div>
<figure><svg class="mermaid"><title>gantt</title></svg></figure>"#;
        assert_eq!(
            sources(html, RecoveryPolicy::default()),
            vec!["graph TD", "pie", "gantt"]
        );
    }
}
