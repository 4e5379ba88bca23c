//! `merview render` command implementation.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use merview_dom::{Element, serialize};
use merview_render::{ActionOutcome, ToolbarAction};

use super::{RendererArgs, build_renderer, read_input};
use crate::error::CliError;
use crate::output::Output;
use crate::platform::CliPlatform;

/// Export format for a rendered diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ExportFormat {
    Png,
    Svg,
}

impl ExportFormat {
    fn action(self) -> ToolbarAction {
        match self {
            Self::Png => ToolbarAction::ExportPng,
            Self::Svg => ToolbarAction::ExportSvg,
        }
    }
}

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Diagram source file (`-` for stdin).
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Write the HTML preview here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also export the diagram to the export directory.
    #[arg(long, value_enum)]
    export: Option<ExportFormat>,

    #[command(flatten)]
    renderer: RendererArgs,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read, or if an export was
    /// requested and the diagram did not render.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.renderer.load_config()?;
        let renderer = build_renderer(&config)?;

        let source = read_input(&self.input)?;
        let mut surface = Element::new("div");
        let widget = renderer.render(&mut surface, &source);

        let html = serialize(&surface);
        if let Some(path) = &self.output {
            std::fs::write(path, &html)?;
            output.info(&format!("Wrote {}", path.display()));
        } else {
            output.emit(&html)?;
        }

        if !widget.is_armed() {
            output.warning("Diagram failed to render; the preview shows the error.");
        }

        if let Some(format) = self.export {
            let platform = CliPlatform::new(config.export_resolved.dir.clone());
            match widget.click(format.action(), &platform) {
                ActionOutcome::Saved(path) => output.info(&format!("  -> {}", path.display())),
                ActionOutcome::Failed(reason) => return Err(CliError::Action(reason)),
                ActionOutcome::Inactive => {
                    return Err(CliError::Render(
                        "nothing to export: the diagram failed to render".to_owned(),
                    ));
                }
                ActionOutcome::Copied => {}
            }
        }

        Ok(())
    }
}
