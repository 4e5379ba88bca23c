//! Mermaid block detection for live editing.
//!
//! [`scan_blocks`] finds fenced mermaid blocks in a text buffer and computes
//! the character offset each block's preview is anchored at. The decoration
//! layer turns a scan into a [`DecorationSet`], and [`LivePreview`] keeps that
//! set in sync with buffer and viewport updates.
//!
//! # Example
//!
//! ```
//! use merview_scanner::scan_blocks;
//!
//! let blocks = scan_blocks("a\n```mermaid\ngraph TD; A-->B\n```\nb");
//! assert_eq!(blocks.len(), 1);
//! assert_eq!(blocks[0].source, "graph TD; A-->B");
//! assert_eq!(blocks[0].anchor, 32);
//! ```

mod decoration;
mod live;
mod scan;

pub use decoration::{Decoration, DecorationSet, PreviewWidget};
pub use live::{LivePreview, RenderTicket, ViewUpdate};
pub use scan::{DiagramBlock, FenceTokens, scan_blocks, scan_blocks_with};
