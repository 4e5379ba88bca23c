//! `merview theme` command implementation.

use std::path::PathBuf;

use clap::Args;
use merview_config::{Config, Settings, Theme};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the theme command.
#[derive(Args)]
pub(crate) struct ThemeArgs {
    /// New theme; omit to show the current one.
    theme: Option<Theme>,

    /// Path to configuration file (default: auto-discover merview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ThemeArgs {
    /// Execute the theme command.
    ///
    /// A new theme applies to diagrams rendered afterwards; existing
    /// previews keep theirs until they are rendered again.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;
        let store = config.settings_store();
        let mut settings = Settings::load(&store)?;

        match self.theme {
            Some(theme) => {
                settings.theme = theme;
                settings.save(&store)?;
                output.success(&format!("Theme set to {theme}"));
                output.info(&format!("Saved in {}", store.root().display()));
            }
            None => {
                output.info(&format!("Saved theme: {}", settings.theme));
                let available: Vec<&str> = Theme::ALL.iter().map(|t| t.as_str()).collect();
                output.info(&format!("Available: {}", available.join(", ")));
            }
        }

        if let Some(pinned) = config.renderer.theme
            && pinned != settings.theme
        {
            output.warning(&format!(
                "renderer.theme = \"{pinned}\" in merview.toml takes precedence over the saved theme"
            ));
        }
        Ok(())
    }
}
