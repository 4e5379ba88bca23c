//! `merview watch` command implementation.
//!
//! Keeps an HTML preview page in sync with a markdown file. Each file change
//! rebuilds the decorations and renders them on the rayon pool; results that
//! arrive after a newer rebuild are dropped.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};

use clap::Args;
use merview_dom::{Element, serialize};
use merview_render::DiagramRenderer;
use merview_scanner::{LivePreview, RenderTicket, ViewUpdate};
use notify::{EventKind, RecursiveMode, Watcher};

use super::{RendererArgs, build_renderer};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the watch command.
#[derive(Args)]
pub(crate) struct WatchArgs {
    /// Markdown file to watch.
    file: PathBuf,

    /// Preview page to write (default: the markdown path with `.html`).
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    renderer: RendererArgs,
}

/// Messages handled by the watch loop.
enum Message {
    Changed(notify::Result<notify::Event>),
    Rendered(RenderTicket, Element),
}

/// Rendered widgets of the current generation, by anchor.
struct PreviewPage {
    title: String,
    widgets: BTreeMap<usize, Element>,
}

impl PreviewPage {
    fn new(title: String) -> Self {
        Self {
            title,
            widgets: BTreeMap::new(),
        }
    }

    fn to_html(&self) -> String {
        let title = Element::new("title").with_text(&self.title);
        let mut html = format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\" />{}</head><body>\n",
            serialize(&title)
        );
        for widget in self.widgets.values() {
            let _ = writeln!(html, "{}", serialize(widget));
        }
        html.push_str("</body></html>\n");
        html
    }
}

impl WatchArgs {
    /// Execute the watch command. Runs until interrupted.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.renderer.load_config()?;
        let renderer = Arc::new(build_renderer(&config)?);
        let page_path = self
            .output
            .clone()
            .unwrap_or_else(|| self.file.with_extension("html"));

        let (tx, rx) = mpsc::channel();
        let watcher_tx = tx.clone();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = watcher_tx.send(Message::Changed(res));
        })?;
        watcher.watch(&self.file, RecursiveMode::NonRecursive)?;

        let text = std::fs::read_to_string(&self.file)?;
        let mut preview = LivePreview::new(&text);
        let mut page = PreviewPage::new(title_for(&self.file));
        spawn_renders(&preview, &renderer, &tx);

        output.highlight(&format!(
            "Watching {} -> {} (Ctrl+C to stop)",
            self.file.display(),
            page_path.display()
        ));

        for message in rx {
            match message {
                Message::Changed(Err(e)) => {
                    tracing::warn!(error = %e, "file watcher error");
                }
                Message::Changed(Ok(event)) => {
                    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        continue;
                    }
                    let text = match std::fs::read_to_string(&self.file) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::warn!(path = %self.file.display(), error = %e, "failed to read file");
                            continue;
                        }
                    };
                    let update = ViewUpdate {
                        doc_changed: true,
                        viewport_changed: false,
                    };
                    if preview.update(update, &text) {
                        page.widgets.clear();
                        output.info(&format!(
                            "Changed, rendering {} diagram(s)...",
                            preview.decorations().len()
                        ));
                        spawn_renders(&preview, &renderer, &tx);
                        if preview.decorations().is_empty() {
                            write_page(&page, &page_path, &output);
                        }
                    }
                }
                Message::Rendered(ticket, widget) => {
                    if !preview.is_current(&ticket) {
                        tracing::debug!(?ticket, "dropping stale render");
                        continue;
                    }
                    page.widgets.insert(ticket.anchor, widget);
                    if page.widgets.len() == preview.decorations().len() {
                        write_page(&page, &page_path, &output);
                    }
                }
            }
        }

        Ok(())
    }
}

/// Render every current decoration in the background.
fn spawn_renders(preview: &LivePreview, renderer: &Arc<DiagramRenderer>, tx: &Sender<Message>) {
    for decoration in preview.decorations() {
        let ticket = preview.ticket(decoration);
        let widget = decoration.widget.clone();
        let renderer = Arc::clone(renderer);
        let tx = tx.clone();
        rayon::spawn(move || {
            let (element, _) = renderer.render_preview(&widget);
            let _ = tx.send(Message::Rendered(ticket, element));
        });
    }
}

fn write_page(page: &PreviewPage, path: &Path, output: &Output) {
    match std::fs::write(path, page.to_html()) {
        Ok(()) => output.success(&format!("Updated {}", path.display())),
        Err(e) => output.error(&format!("Failed to write {}: {e}", path.display())),
    }
}

fn title_for(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "merview".to_owned(), |s| s.to_string_lossy().into_owned())
}
