//! Live-preview session for an editor buffer.
//!
//! The host reports buffer edits and viewport changes through
//! [`LivePreview::update`]. Each rebuild replaces the whole decoration set
//! and starts a new generation. Renders are not cancelled when their
//! decoration goes away: the caller stamps each request with a
//! [`RenderTicket`] and drops results whose ticket is no longer current.

use crate::decoration::{Decoration, DecorationSet};
use crate::scan::{FenceTokens, scan_blocks_with};

/// What changed since the last update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewUpdate {
    /// Buffer content changed.
    pub doc_changed: bool,
    /// Visible range changed.
    pub viewport_changed: bool,
}

impl ViewUpdate {
    /// Whether decorations need to be rebuilt.
    #[must_use]
    pub fn needs_rebuild(self) -> bool {
        self.doc_changed || self.viewport_changed
    }
}

/// Identifies the decoration set a render request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTicket {
    pub generation: u64,
    pub anchor: usize,
}

/// Decorations for one editor buffer, kept in sync with updates.
#[derive(Debug)]
pub struct LivePreview {
    tokens: FenceTokens,
    decorations: DecorationSet,
    generation: u64,
}

impl LivePreview {
    /// Start a session and build decorations for the initial buffer.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self::with_tokens(FenceTokens::default(), text)
    }

    #[must_use]
    pub fn with_tokens(tokens: FenceTokens, text: &str) -> Self {
        let decorations = DecorationSet::from_blocks(scan_blocks_with(text, &tokens));
        Self {
            tokens,
            decorations,
            generation: 0,
        }
    }

    /// Apply a host update. `text` is the full buffer after the update.
    ///
    /// Returns `true` if the decorations were rebuilt. Updates that change
    /// neither the document nor the viewport keep the previous set.
    pub fn update(&mut self, update: ViewUpdate, text: &str) -> bool {
        if !update.needs_rebuild() {
            return false;
        }
        self.decorations = DecorationSet::from_blocks(scan_blocks_with(text, &self.tokens));
        self.generation += 1;
        tracing::debug!(
            generation = self.generation,
            decorations = self.decorations.len(),
            "rebuilt decorations"
        );
        true
    }

    #[must_use]
    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ticket for a render request issued for `decoration` now.
    #[must_use]
    pub fn ticket(&self, decoration: &Decoration) -> RenderTicket {
        RenderTicket {
            generation: self.generation,
            anchor: decoration.anchor,
        }
    }

    /// Whether a result issued under `ticket` still belongs to a displayed
    /// decoration.
    #[must_use]
    pub fn is_current(&self, ticket: &RenderTicket) -> bool {
        ticket.generation == self.generation && self.decorations.at(ticket.anchor).is_some()
    }
}
