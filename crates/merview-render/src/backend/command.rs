//! Local mermaid CLI backend.

use std::fs;
use std::path::Path;
use std::process::Command;

use super::{DiagramBackend, assign_svg_id};
use crate::error::RenderError;
use crate::options::RenderOptions;

/// Renders by running the mermaid CLI (`mmdc`) on a temporary file.
///
/// The command line may carry leading arguments (e.g. `npx -y @mermaid-js/mermaid-cli`);
/// input, output and theme flags are appended.
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    #[must_use]
    pub fn new(command: &str) -> Self {
        let mut parts = command.split_whitespace().map(str::to_owned);
        Self {
            program: parts.next().unwrap_or_else(|| "mmdc".to_owned()),
            args: parts.collect(),
        }
    }

    fn build_command(&self, input: &Path, output: &Path, options: &RenderOptions) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("-i")
            .arg(input)
            .arg("-o")
            .arg(output)
            .arg("-t")
            .arg(options.theme.as_str());
        cmd
    }
}

impl DiagramBackend for CommandBackend {
    fn render_to_markup(
        &self,
        id: &str,
        source: &str,
        options: &RenderOptions,
    ) -> Result<String, RenderError> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("in.mmd");
        let output = dir.path().join("out.svg");
        fs::write(&input, options.apply_to(source))?;

        tracing::debug!(program = %self.program, id, "running mermaid CLI");
        let result = self.build_command(&input, &output, options).output()?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_owned();
            return Err(RenderError::Command {
                program: self.program.clone(),
                status: result.status.to_string(),
                stderr,
            });
        }

        let bytes = fs::read(&output)?;
        let markup = String::from_utf8(bytes).map_err(|_| RenderError::InvalidUtf8)?;
        Ok(assign_svg_id(&markup, id))
    }
}
