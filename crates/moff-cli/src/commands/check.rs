//! Check command implementation.

use anyhow::{Context, Result};
use moff_core::{Collector, RuleEngine};
use std::path::Path;

use crate::settings_source::SettingsSource;
use crate::OutputFormat;

/// Runs the check command and returns the process exit code.
pub fn run(path: &Path, save: bool, format: OutputFormat, source: &SettingsSource) -> Result<i32> {
    let settings = source.load()?;

    let collection = Collector::new(&settings)
        .collect(path)
        .context("Failed to collect documentation")?;

    tracing::info!("Root directory: {}", collection.root_dir().display());

    let report = RuleEngine::new(settings.rules()).check(collection.outlines());

    super::output::print(&report, format)?;

    if save {
        let saved = super::output::save(&report, collection.root_dir())?;
        tracing::info!("Results saved to: {}", saved.display());
    }

    Ok(report.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn exit_code_reflects_blocking_errors() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("project_demo.md"), "# Overview\n").unwrap();

        let code = run(tmp.path(), false, OutputFormat::Compact, &SettingsSource::Builtin).unwrap();
        assert_eq!(code, 0);

        fs::write(tmp.path().join("project_demo.md"), "# Intro\n").unwrap();
        let code = run(tmp.path(), true, OutputFormat::Compact, &SettingsSource::Builtin).unwrap();
        assert_eq!(code, 1);
        assert!(tmp.path().join(super::super::output::RESULTS_FILE_NAME).exists());
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = run(tmp.path(), false, OutputFormat::Text, &SettingsSource::Builtin).unwrap_err();
        assert!(format!("{err:#}").contains("no root document"));
    }

    #[test]
    fn explicit_settings_are_used() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("index.md"), "# Intro\n").unwrap();
        let settings = tmp.path().join("custom.toml");
        fs::write(&settings, "[root]\ndetect_pattern = \"index.md\"\n").unwrap();

        let code = run(
            tmp.path(),
            false,
            OutputFormat::Compact,
            &SettingsSource::Explicit(settings),
        )
        .unwrap();
        assert_eq!(code, 0);
    }
}
