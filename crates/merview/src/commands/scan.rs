//! `merview scan` command implementation.

use std::path::PathBuf;

use clap::Args;
use merview_scanner::{DiagramBlock, FenceTokens, scan_blocks_with};

use super::read_input;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the scan command.
#[derive(Args)]
pub(crate) struct ScanArgs {
    /// Markdown file to scan (`-` for stdin).
    file: PathBuf,

    /// Fence language to look for.
    #[arg(long, default_value = "mermaid")]
    language: String,
}

impl ScanArgs {
    /// Execute the scan command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        if self.language.trim().is_empty() {
            return Err(CliError::Validation("language must not be empty".to_owned()));
        }

        let text = read_input(&self.file)?;
        let blocks = scan_blocks_with(&text, &FenceTokens::for_language(&self.language));

        if blocks.is_empty() {
            output.warning(&format!("No {} blocks found.", self.language));
            return Ok(());
        }

        output.highlight(&format!("Found {} block(s):", blocks.len()));
        output.emit(&format_blocks(&blocks))?;
        Ok(())
    }
}

fn format_blocks(blocks: &[DiagramBlock]) -> String {
    let mut out = Vec::new();
    for (i, block) in blocks.iter().enumerate() {
        out.push(format!("#{} anchor={}", i + 1, block.anchor));
        out.extend(block.source.lines().map(|line| format!("    {line}")));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use merview_scanner::scan_blocks;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_blocks() {
        let text = "```mermaid\ngraph TD\nA-->B\n```\n\n```mermaid\npie\n```";
        let formatted = format_blocks(&scan_blocks(text));
        assert_eq!(
            formatted,
            "#1 anchor=29\n    graph TD\n    A-->B\n#2 anchor=49\n    pie"
        );
    }
}
