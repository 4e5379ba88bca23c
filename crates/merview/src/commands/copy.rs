//! `merview copy` command implementation.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use merview_dom::Element;
use merview_render::{ActionOutcome, ToolbarAction};
use merview_scanner::scan_blocks;

use super::{RendererArgs, build_renderer, read_input};
use crate::error::CliError;
use crate::output::Output;
use crate::platform::CliPlatform;

/// Toolbar button to press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ActionArg {
    CopyCode,
    CopyImage,
    ExportPng,
    ExportSvg,
}

impl From<ActionArg> for ToolbarAction {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::CopyCode => Self::CopyCode,
            ActionArg::CopyImage => Self::CopyImage,
            ActionArg::ExportPng => Self::ExportPng,
            ActionArg::ExportSvg => Self::ExportSvg,
        }
    }
}

/// Arguments for the copy command.
#[derive(Args)]
pub(crate) struct CopyArgs {
    /// Markdown file containing the diagram (`-` for stdin).
    file: PathBuf,

    /// Action to run.
    #[arg(value_enum)]
    action: ActionArg,

    /// Which block, counting from 1.
    #[arg(short, long, default_value_t = 1)]
    block: usize,

    #[command(flatten)]
    renderer: RendererArgs,
}

impl CopyArgs {
    /// Execute the copy command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let text = read_input(&self.file)?;
        let blocks = scan_blocks(&text);

        let block = self
            .block
            .checked_sub(1)
            .and_then(|i| blocks.get(i))
            .ok_or_else(|| {
                CliError::Validation(format!(
                    "block {} not found ({} block(s) in {})",
                    self.block,
                    blocks.len(),
                    self.file.display()
                ))
            })?;

        let config = self.renderer.load_config()?;
        let renderer = build_renderer(&config)?;

        // Toolbar actions need a rendered diagram
        let mut surface = Element::new("div");
        let widget = renderer.render(&mut surface, &block.source);
        let platform = CliPlatform::new(config.export_resolved.dir.clone());

        match widget.click(self.action.into(), &platform) {
            ActionOutcome::Copied => Ok(()),
            ActionOutcome::Saved(path) => {
                output.info(&format!("  -> {}", path.display()));
                Ok(())
            }
            ActionOutcome::Failed(reason) => Err(CliError::Action(reason)),
            ActionOutcome::Inactive => Err(CliError::Render(format!(
                "block {} failed to render",
                self.block
            ))),
        }
    }
}
