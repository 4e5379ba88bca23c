//! Preview decorations anchored in the editor buffer.

use crate::scan::DiagramBlock;

/// Label shown above every live preview.
const PREVIEW_HEADER: &str = "Mermaid Preview";

/// Widget placed after a mermaid block, rendering its source.
///
/// Two widgets are equal when their source is equal, so the host can keep an
/// already rendered preview when a rebuild produces the same diagram.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewWidget {
    source: String,
}

impl PreviewWidget {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Diagram source the widget renders.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Header label shown above the rendered diagram.
    #[must_use]
    pub fn header(&self) -> &'static str {
        PREVIEW_HEADER
    }
}

/// A widget anchored at a character offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    /// Character offset the widget is placed at.
    pub anchor: usize,
    /// Placement bias relative to the anchor. Always `1`: after the offset.
    pub side: i8,
    pub widget: PreviewWidget,
}

impl From<DiagramBlock> for Decoration {
    fn from(block: DiagramBlock) -> Self {
        Self {
            anchor: block.anchor,
            side: 1,
            widget: PreviewWidget::new(block.source),
        }
    }
}

/// Decorations for a whole buffer, ordered by anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
    decorations: Vec<Decoration>,
}

impl DecorationSet {
    /// Build a set from scanned blocks.
    #[must_use]
    pub fn from_blocks(blocks: Vec<DiagramBlock>) -> Self {
        let mut decorations: Vec<Decoration> = blocks.into_iter().map(Decoration::from).collect();
        decorations.sort_by_key(|d| d.anchor);
        Self { decorations }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Decoration> {
        self.decorations.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    /// Decoration anchored at `anchor`, if any.
    #[must_use]
    pub fn at(&self, anchor: usize) -> Option<&Decoration> {
        self.decorations
            .binary_search_by_key(&anchor, |d| d.anchor)
            .ok()
            .map(|i| &self.decorations[i])
    }
}

impl<'a> IntoIterator for &'a DecorationSet {
    type Item = &'a Decoration;
    type IntoIter = std::slice::Iter<'a, Decoration>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan_blocks;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_widget_equality_by_source() {
        assert_eq!(PreviewWidget::new("graph TD"), PreviewWidget::new("graph TD"));
        assert_ne!(PreviewWidget::new("graph TD"), PreviewWidget::new("graph LR"));
        assert_eq!(PreviewWidget::new("x").header(), "Mermaid Preview");
    }

    #[test]
    fn test_set_from_scan() {
        let text = "```mermaid\nA\n```\n\n```mermaid\nB\n```";
        let set = DecorationSet::from_blocks(scan_blocks(text));

        assert_eq!(set.len(), 2);
        let anchors: Vec<usize> = set.iter().map(|d| d.anchor).collect();
        assert_eq!(anchors, vec![16, 34]);
        assert!(set.iter().all(|d| d.side == 1));

        assert_eq!(set.at(34).unwrap().widget.source(), "B");
        assert!(set.at(17).is_none());
    }

    #[test]
    fn test_empty_set() {
        let set = DecorationSet::from_blocks(Vec::new());
        assert!(set.is_empty());
        assert_eq!(set, DecorationSet::default());
    }
}
