//! merview CLI - Mermaid diagram previews.
//!
//! Provides commands for:
//! - `scan`: List the mermaid blocks of a markdown file
//! - `render`: Render one diagram to an HTML preview
//! - `enhance`: Re-render the diagrams of an HTML document
//! - `watch`: Keep a preview page in sync with a markdown file
//! - `theme`: Show or change the saved diagram theme
//! - `copy`: Run a toolbar action on a block of a markdown file

mod commands;
mod error;
mod output;
mod platform;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CopyArgs, EnhanceArgs, RenderArgs, ScanArgs, ThemeArgs, WatchArgs};
use output::Output;

/// merview - Mermaid diagram previews.
#[derive(Parser)]
#[command(name = "merview", version, about)]
struct Cli {
    /// Enable verbose output (render and export logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List mermaid blocks and their anchors.
    Scan(ScanArgs),
    /// Render a diagram to an HTML preview.
    Render(RenderArgs),
    /// Re-render the diagrams of an HTML document.
    Enhance(EnhanceArgs),
    /// Watch a markdown file and keep a preview page up to date.
    Watch(WatchArgs),
    /// Show or change the saved diagram theme.
    Theme(ThemeArgs),
    /// Run a toolbar action on a diagram block.
    Copy(CopyArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Scan(args) => args.execute(),
        Commands::Render(args) => args.execute(),
        Commands::Enhance(args) => args.execute(),
        Commands::Watch(args) => args.execute(),
        Commands::Theme(args) => args.execute(),
        Commands::Copy(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
