//! Line-based fence scanner.

/// Open and close fence lines, compared after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceTokens {
    /// Line that opens a diagram block.
    pub open: String,
    /// Line that closes it.
    pub close: String,
}

impl FenceTokens {
    /// Tokens for a fenced block tagged with `language`.
    #[must_use]
    pub fn for_language(language: &str) -> Self {
        Self {
            open: format!("```{language}"),
            close: "```".to_owned(),
        }
    }
}

impl Default for FenceTokens {
    fn default() -> Self {
        Self::for_language("mermaid")
    }
}

/// A fenced diagram found in a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    /// Interior lines joined with `\n`, trimmed.
    pub source: String,
    /// Character offset of the end of the closing fence line.
    pub anchor: usize,
}

/// Scan `text` for mermaid blocks.
#[must_use]
pub fn scan_blocks(text: &str) -> Vec<DiagramBlock> {
    scan_blocks_with(text, &FenceTokens::default())
}

/// Scan `text` for blocks delimited by `tokens`.
///
/// Only single-level fences are recognized: an open line inside a block is
/// content. A block that is never closed, or whose trimmed content is empty,
/// produces nothing.
#[must_use]
pub fn scan_blocks_with(text: &str, tokens: &FenceTokens) -> Vec<DiagramBlock> {
    let mut blocks = Vec::new();
    let mut interior: Option<Vec<&str>> = None;
    // Characters consumed so far, including one separator per previous line
    let mut offset = 0;

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            offset += 1;
        }
        offset += line.chars().count();

        let trimmed = line.trim();
        match interior.as_mut() {
            None if trimmed == tokens.open => interior = Some(Vec::new()),
            None => {}
            Some(lines) if trimmed == tokens.close => {
                let source = lines.join("\n").trim().to_owned();
                if !source.is_empty() {
                    blocks.push(DiagramBlock {
                        source,
                        anchor: offset,
                    });
                }
                interior = None;
            }
            Some(lines) => lines.push(line),
        }
    }

    if interior.is_some() {
        tracing::debug!("dropping unterminated fence at end of buffer");
    }
    tracing::debug!(blocks = blocks.len(), "scanned buffer");
    blocks
}
