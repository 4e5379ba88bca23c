//! CLI command implementations.

pub(crate) mod copy;
pub(crate) mod enhance;
pub(crate) mod render;
pub(crate) mod scan;
pub(crate) mod theme;
pub(crate) mod watch;

pub(crate) use copy::CopyArgs;
pub(crate) use enhance::EnhanceArgs;
pub(crate) use render::RenderArgs;
pub(crate) use scan::ScanArgs;
pub(crate) use theme::ThemeArgs;
pub(crate) use watch::WatchArgs;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use merview_config::{BackendKind, CliSettings, Config, Settings, Theme};
use merview_render::{DiagramRenderer, RenderOptions, backend};

use crate::error::CliError;

/// Renderer backend selectable on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum BackendArg {
    /// Kroki HTTP service.
    Kroki,
    /// Local mermaid CLI.
    Command,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Kroki => Self::Kroki,
            BackendArg::Command => Self::Command,
        }
    }
}

/// Configuration arguments shared by rendering commands.
#[derive(Args)]
pub(crate) struct RendererArgs {
    /// Path to configuration file (default: auto-discover merview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Renderer backend (overrides config).
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Kroki server URL for diagram rendering (overrides config).
    #[arg(long, env = "KROKI_URL")]
    kroki_url: Option<String>,

    /// Diagram theme for this run (overrides saved settings).
    #[arg(long)]
    theme: Option<Theme>,

    /// Directory for exported files (overrides config).
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

impl RendererArgs {
    /// Load config with command-line overrides applied.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            backend: self.backend.map(Into::into),
            kroki_url: self.kroki_url.clone(),
            theme: self.theme,
            export_dir: self.export_dir.clone(),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Build a renderer for `config`, using the saved theme unless one is pinned.
pub(crate) fn build_renderer(config: &Config) -> Result<DiagramRenderer, CliError> {
    let settings = Settings::load(&config.settings_store())?;
    let options = RenderOptions {
        theme: config.effective_theme(&settings),
        security_level: config.renderer.security_level,
    };
    tracing::debug!(theme = %options.theme, backend = ?config.renderer.backend, "building renderer");
    Ok(DiagramRenderer::new(backend::from_config(&config.renderer)).with_options(options))
}

/// Read `path`, or stdin for `-`.
pub(crate) fn read_input(path: &Path) -> Result<String, CliError> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}
