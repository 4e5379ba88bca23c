//! Element tree node.

/// Position of a node in a tree, as child indices from the root.
///
/// The empty path addresses the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// Path of the root node.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of the `index`-th child of this node.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Path of the parent node, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    /// Path of the sibling immediately before this node.
    #[must_use]
    pub fn previous_sibling(&self) -> Option<Self> {
        let (&last, rest) = self.0.split_last()?;
        let index = last.checked_sub(1)?;
        let mut indices = rest.to_vec();
        indices.push(index);
        Some(Self(indices))
    }

    /// Whether `self` is `other` or one of its descendants.
    #[must_use]
    pub fn starts_with(&self, other: &NodePath) -> bool {
        self.0.starts_with(&other.0)
    }

    /// Child indices from the root.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

/// Tag of comment nodes. A comment keeps its body in `text`.
pub const COMMENT_TAG: &str = "!--";

/// A markup element.
///
/// Text follows the lxml convention: `text` is the content before the first
/// child and `tail` is the content after this element's closing tag, up to
/// the next sibling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name (e.g. `div`, `svg`).
    pub tag: String,
    /// Attributes in document order.
    pub attrs: Vec<(String, String)>,
    /// Text before the first child.
    pub text: String,
    /// Text after the closing tag.
    pub tail: String,
    /// Child elements.
    pub children: Vec<Element>,
}

impl Element {
    /// Create an empty element with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Create a comment node.
    #[must_use]
    pub fn comment(body: impl Into<String>) -> Self {
        Self::new(COMMENT_TAG).with_text(body)
    }

    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.tag == COMMENT_TAG
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    #[must_use]
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    /// Attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(key, _)| key == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name.to_owned(), value));
        }
    }

    /// Whitespace-separated entries of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Add a class if not already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let classes = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_owned(),
        };
        self.set_attr("class", classes);
    }

    /// Whether the tag equals `tag`, ignoring ASCII case.
    #[must_use]
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Remove all content (text and children). Attributes and tail are kept.
    pub fn empty(&mut self) {
        self.text.clear();
        self.children.clear();
    }

    /// Append a child and return a mutable reference to it.
    pub fn append(&mut self, child: Element) -> &mut Element {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Concatenated text of this element and all descendants (tail excluded).
    /// Comments contribute nothing but their tail.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// First direct child with the given tag.
    #[must_use]
    pub fn child_by_tag(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(tag))
    }

    /// First descendant (depth-first, excluding self) with the given tag.
    #[must_use]
    pub fn find_descendant(&self, tag: &str) -> Option<&Element> {
        self.children
            .iter()
            .find_map(|c| if c.is(tag) { Some(c) } else { c.find_descendant(tag) })
    }

    /// Mutable variant of [`find_descendant`](Self::find_descendant).
    pub fn find_descendant_mut(&mut self, tag: &str) -> Option<&mut Element> {
        for child in &mut self.children {
            if child.is(tag) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant_mut(tag) {
                return Some(found);
            }
        }
        None
    }

    /// Node at `path`, relative to this element.
    #[must_use]
    pub fn get(&self, path: &NodePath) -> Option<&Element> {
        path.indices()
            .iter()
            .try_fold(self, |node, &i| node.children.get(i))
    }

    /// Mutable node at `path`, relative to this element.
    pub fn get_mut(&mut self, path: &NodePath) -> Option<&mut Element> {
        path.indices()
            .iter()
            .try_fold(self, |node, &i| node.children.get_mut(i))
    }

    /// All descendants in document order, with their paths (root excluded).
    #[must_use]
    pub fn descendants(&self) -> Vec<(NodePath, &Element)> {
        let mut out = Vec::new();
        collect_descendants(self, &NodePath::root(), &mut out);
        out
    }
}

fn collect_text(node: &Element, out: &mut String) {
    if node.is_comment() {
        return;
    }
    out.push_str(&node.text);
    for child in &node.children {
        collect_text(child, out);
        out.push_str(&child.tail);
    }
}

fn collect_descendants<'a>(node: &'a Element, path: &NodePath, out: &mut Vec<(NodePath, &'a Element)>) {
    for (i, child) in node.children.iter().enumerate() {
        let child_path = path.child(i);
        out.push((child_path.clone(), child));
        collect_descendants(child, &child_path, out);
    }
}
