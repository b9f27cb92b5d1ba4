//! Init command implementation.

use anyhow::{bail, Context, Result};
use moff_core::settings::SETTINGS_FILE_NAME;
use moff_core::Settings;
use std::path::Path;

/// Runs the init command.
pub fn run(dir: &Path, force: bool, verbose: bool) -> Result<()> {
    let settings_path = dir.join(SETTINGS_FILE_NAME);

    if settings_path.exists() && !force {
        bail!(
            "Settings file already exists at {}. Use --force to overwrite.",
            settings_path.display()
        );
    }

    Settings::write_default(&settings_path)
        .with_context(|| format!("Failed to write {}", settings_path.display()))?;

    println!("Created {}", settings_path.display());

    if verbose {
        let settings = Settings::from_file(&settings_path)?;
        println!("\nSettings preview:");
        println!("  Version: {}", settings.rules().version());
        println!(
            "  Root detection: {}",
            settings.root().detect_pattern().as_str()
        );
        println!(
            "  Configured categories: {}",
            settings.rules().category_names().join(", ")
        );
    }

    println!("\nNext steps:");
    println!("  1. Edit {SETTINGS_FILE_NAME} to describe your document structure");
    println!("  2. Run: moff check");

    Ok(())
}
