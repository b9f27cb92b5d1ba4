//! Settings: the persisted rule configuration plus collector options.
//!
//! # Architecture
//!
//! ```text
//! settings.json / moff.toml
//!   ↓ serde (DTO layer)
//! config_dto types
//!   ↓ validate + convert (loader)
//! Settings { RuleConfiguration, RootSettings, CollectorSettings }
//! ```

use std::path::{Path, PathBuf};

pub mod config_dto;
pub mod loader;
pub mod model;

pub use model::{FilenamePattern, RuleConfiguration};

/// Default settings file name.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Errors from reading and validating settings.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum SettingsError {
    /// The settings file could not be read or written.
    #[error("failed to access settings file {}", .path.display())]
    #[diagnostic(code(moff::settings::io))]
    Io {
        /// Path of the settings file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// JSON deserialization failed.
    #[error("JSON parse error: {0}")]
    #[diagnostic(
        code(moff::settings::json),
        help("check the file against the output of `moff init`")
    )]
    Json(#[from] serde_json::Error),

    /// TOML deserialization failed.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(moff::settings::toml))]
    Toml(#[from] toml::de::Error),

    /// Domain model validation failed.
    #[error("{0}")]
    #[diagnostic(
        code(moff::settings::invalid),
        help("header identities take either `text` or `pattern`; severities are error, warning or info")
    )]
    Load(#[from] loader::LoadError),
}

/// Root document detection options.
#[derive(Debug, Clone)]
pub struct RootSettings {
    pub(crate) detect_pattern: FilenamePattern,
    pub(crate) override_path: Option<PathBuf>,
}

impl RootSettings {
    /// Returns the file name pattern that identifies the root document.
    #[must_use]
    pub fn detect_pattern(&self) -> &FilenamePattern {
        &self.detect_pattern
    }

    /// Returns the explicit root document path, if configured.
    #[must_use]
    pub fn override_path(&self) -> Option<&Path> {
        self.override_path.as_deref()
    }
}

/// Document collection options.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub(crate) exclude: Vec<glob::Pattern>,
    pub(crate) respect_gitignore: bool,
}

impl CollectorSettings {
    /// Returns the exclude patterns.
    #[must_use]
    pub fn exclude(&self) -> &[glob::Pattern] {
        &self.exclude
    }

    /// Returns true if `.gitignore` files are honoured.
    #[must_use]
    pub fn respect_gitignore(&self) -> bool {
        self.respect_gitignore
    }

    /// Tests whether a root-relative path is excluded.
    #[must_use]
    pub fn is_excluded(&self, relative: &Path) -> bool {
        let path = relative.to_string_lossy();
        self.exclude.iter().any(|p| p.matches(&path))
    }
}

/// Validated settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub(crate) rules: RuleConfiguration,
    pub(crate) root: RootSettings,
    pub(crate) collector: CollectorSettings,
}

impl Settings {
    /// Loads settings from a file; `.toml` files are read as TOML,
    /// everything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!("Loaded settings from {}", path.display());

        if path.extension().is_some_and(|ext| ext == "toml") {
            Self::parse_toml(&content)
        } else {
            Self::parse_json(&content)
        }
    }

    /// Parses settings from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails.
    pub fn parse_json(content: &str) -> Result<Self, SettingsError> {
        let dto: config_dto::SettingsDto = serde_json::from_str(content)?;
        Ok(loader::load(dto)?)
    }

    /// Parses settings from TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self, SettingsError> {
        let dto: config_dto::SettingsDto = toml::from_str(content)?;
        Ok(loader::load(dto)?)
    }

    /// Built-in settings used when no settings file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in defaults fail validation.
    pub fn builtin() -> Result<Self, SettingsError> {
        Ok(loader::load(config_dto::SettingsDto::default())?)
    }

    /// Serialized default settings, as written by `moff init`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn default_json() -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(&config_dto::SettingsDto::default())?)
    }

    /// Writes the default settings to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_default(path: &Path) -> Result<(), SettingsError> {
        let json = Self::default_json()?;
        std::fs::write(path, json + "\n").map_err(|e| SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Returns the rule configuration consumed by the engine.
    #[must_use]
    pub fn rules(&self) -> &RuleConfiguration {
        &self.rules
    }

    /// Returns the root detection options.
    #[must_use]
    pub fn root(&self) -> &RootSettings {
        &self.root
    }

    /// Returns the collector options.
    #[must_use]
    pub fn collector(&self) -> &CollectorSettings {
        &self.collector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_load() {
        let settings = Settings::builtin().unwrap();
        assert_eq!(settings.root().detect_pattern().as_str(), "project_*.md");
        assert!(settings.collector().respect_gitignore());
    }

    #[test]
    fn from_file_reads_json_and_toml() {
        let tmp = TempDir::new().unwrap();

        let json = tmp.path().join("settings.json");
        fs::write(&json, r#"{ "categories": { "adr": {} } }"#).unwrap();
        let settings = Settings::from_file(&json).unwrap();
        assert_eq!(settings.rules().category_names(), vec!["adr"]);

        let toml_path = tmp.path().join("moff.toml");
        fs::write(&toml_path, "[categories.note]\nfilename = \"note_*.md\"\n").unwrap();
        let settings = Settings::from_file(&toml_path).unwrap();
        assert_eq!(settings.rules().category_names(), vec!["note"]);
    }

    #[test]
    fn from_file_missing_reports_path() {
        let err = Settings::from_file(Path::new("/nonexistent/settings.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/settings.json"));
    }

    #[test]
    fn write_default_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(SETTINGS_FILE_NAME);
        Settings::write_default(&path).unwrap();
        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.rules().category_names(), vec!["feature", "tech"]);
    }

    #[test]
    fn exclude_matches_relative_paths() {
        let settings = Settings::builtin().unwrap();
        assert!(settings
            .collector()
            .is_excluded(Path::new("web/node_modules/pkg/readme.md")));
        assert!(!settings.collector().is_excluded(Path::new("features/feature_a.md")));
    }
}
