//! moff CLI tool.
//!
//! Usage:
//! ```bash
//! moff check [--path PATH] [--save] [--format text|json|compact]
//! moff tree [--path PATH] [--no-check] [--errors-only]
//! moff init [--path PATH] [--force]
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use settings_source::SettingsSource;

mod commands;
mod settings_source;

/// Markdown documentation structure checker
#[derive(Parser)]
#[command(name = "moff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to settings file (JSON, or TOML with a `.toml` extension)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate documentation against the configured rules
    Check {
        /// Directory to search for the documentation root
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Save results to moff_results.txt in the documentation root
        #[arg(long)]
        save: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Display the documentation structure as a tree
    Tree {
        /// Directory to search for the documentation root
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Skip validation (no error highlighting)
        #[arg(long)]
        no_check: bool,

        /// Show only files with errors
        #[arg(long, conflicts_with = "no_check")]
        errors_only: bool,
    },

    /// Create a default settings.json
    Init {
        /// Directory to write settings.json into
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing settings.json
        #[arg(long)]
        force: bool,
    },
}

/// Output format for check results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text grouped by file.
    #[default]
    Text,
    /// JSON report.
    Json,
    /// One-line-per-diagnostic compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let code = match cli.command {
        Commands::Check { path, save, format } => {
            let source = SettingsSource::locate(&path, cli.config.as_deref());
            commands::check::run(&path, save, format, &source)?
        }
        Commands::Tree {
            path,
            no_check,
            errors_only,
        } => {
            let source = SettingsSource::locate(&path, cli.config.as_deref());
            commands::tree::run(&path, !no_check, errors_only, &source)?
        }
        Commands::Init { path, force } => {
            commands::init::run(&path, force, cli.verbose)?;
            0
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
