//! `merview enhance` command implementation.

use std::path::PathBuf;

use clap::Args;
use merview_render::{RecoveryPolicy, enhance_document};

use super::{RendererArgs, build_renderer, read_input};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the enhance command.
#[derive(Args)]
pub(crate) struct EnhanceArgs {
    /// Rendered HTML document (`-` for stdin).
    input: PathBuf,

    /// Write the enhanced document here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render a placeholder diagram when no source can be recovered.
    #[arg(long)]
    placeholder: bool,

    #[command(flatten)]
    renderer: RendererArgs,
}

impl EnhanceArgs {
    /// Execute the enhance command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.renderer.load_config()?;
        let renderer = build_renderer(&config)?;

        let html = read_input(&self.input)?;
        let policy = RecoveryPolicy {
            allow_placeholder: self.placeholder,
        };
        let enhanced = enhance_document(&html, &renderer, policy)?;

        let failed = enhanced.widgets.iter().filter(|w| !w.is_armed()).count();
        if let Some(path) = &self.output {
            std::fs::write(path, &enhanced.html)?;
        } else {
            output.emit(&enhanced.html)?;
        }

        output.success(&format!("Enhanced {} diagram(s)", enhanced.widgets.len()));
        if failed > 0 {
            output.warning(&format!("{failed} diagram(s) failed to render"));
        }
        Ok(())
    }
}
