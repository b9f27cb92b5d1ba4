//! Locating the settings for a run.
//!
//! An explicit `--config` path always wins. Otherwise the `--path` start
//! directory is searched for `settings.json`, then `moff.toml`, moving up
//! through its ancestors. The search ends at the first directory that holds
//! a `.git` entry. With nothing found the built-in defaults apply.

use anyhow::{Context, Result};
use moff_core::settings::SETTINGS_FILE_NAME;
use moff_core::Settings;
use std::path::{Path, PathBuf};

/// TOML settings file name, checked after [`SETTINGS_FILE_NAME`].
pub const TOML_SETTINGS_FILE_NAME: &str = "moff.toml";

const CANDIDATES: [&str; 2] = [SETTINGS_FILE_NAME, TOML_SETTINGS_FILE_NAME];

/// Where a run takes its settings from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the start directory or one of its ancestors.
    Found(PathBuf),
    /// No settings file; the built-in defaults apply.
    Builtin,
}

impl SettingsSource {
    /// Picks the settings source for a run starting at `start`.
    #[must_use]
    pub fn locate(start: &Path, explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::Explicit(path.to_path_buf());
        }

        let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
        for dir in start.ancestors() {
            if let Some(found) = CANDIDATES
                .iter()
                .map(|name| dir.join(name))
                .find(|candidate| candidate.is_file())
            {
                tracing::debug!("Found settings: {}", found.display());
                return Self::Found(found);
            }
            if dir.join(".git").exists() {
                tracing::debug!("Stopped settings search at {}", dir.display());
                break;
            }
        }
        Self::Builtin
    }

    /// Returns the settings file path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Found(p) => Some(p),
            Self::Builtin => None,
        }
    }

    /// Loads the settings. The built-in defaults are announced on stderr so a
    /// missing settings file does not go unnoticed.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read or is invalid.
    pub fn load(&self) -> Result<Settings> {
        match self.path() {
            Some(path) => {
                tracing::info!("Using settings: {}", path.display());
                Settings::from_file(path)
                    .with_context(|| format!("Failed to load settings: {}", path.display()))
            }
            None => {
                tracing::warn!("{}", builtin_hint());
                Settings::builtin().context("Built-in settings are invalid")
            }
        }
    }
}

fn builtin_hint() -> String {
    format!(
        "No {SETTINGS_FILE_NAME} or {TOML_SETTINGS_FILE_NAME} found; using built-in defaults \
         (run `moff init` to create {SETTINGS_FILE_NAME})"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// A temp dir marked as a repository so the search never leaves it.
    fn repo() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(".git")).unwrap();
        tmp
    }

    fn canonical(path: &Path) -> PathBuf {
        path.canonicalize().unwrap()
    }

    #[test]
    fn explicit_path_is_taken_as_given() {
        let tmp = repo();
        fs::write(tmp.path().join(SETTINGS_FILE_NAME), "{}").unwrap();

        let explicit = Path::new("elsewhere/custom.toml");
        assert_eq!(
            SettingsSource::locate(tmp.path(), Some(explicit)),
            SettingsSource::Explicit(explicit.to_path_buf())
        );
    }

    #[test]
    fn json_is_preferred_over_toml_in_start_dir() {
        let tmp = repo();
        fs::write(tmp.path().join(TOML_SETTINGS_FILE_NAME), "").unwrap();
        assert_eq!(
            SettingsSource::locate(tmp.path(), None),
            SettingsSource::Found(canonical(tmp.path()).join(TOML_SETTINGS_FILE_NAME))
        );

        fs::write(tmp.path().join(SETTINGS_FILE_NAME), "{}").unwrap();
        assert_eq!(
            SettingsSource::locate(tmp.path(), None),
            SettingsSource::Found(canonical(tmp.path()).join(SETTINGS_FILE_NAME))
        );
    }

    #[test]
    fn nearest_ancestor_settings_win() {
        let tmp = repo();
        let docs = tmp.path().join("docs/guides");
        fs::create_dir_all(&docs).unwrap();
        fs::write(tmp.path().join(SETTINGS_FILE_NAME), "{}").unwrap();
        fs::write(tmp.path().join("docs").join(TOML_SETTINGS_FILE_NAME), "").unwrap();

        assert_eq!(
            SettingsSource::locate(&docs, None),
            SettingsSource::Found(canonical(tmp.path()).join("docs").join(TOML_SETTINGS_FILE_NAME))
        );
    }

    #[test]
    fn search_stops_at_repository_root() {
        let outer = TempDir::new().unwrap();
        fs::write(outer.path().join(SETTINGS_FILE_NAME), "{}").unwrap();
        let project = outer.path().join("project");
        fs::create_dir_all(project.join(".git")).unwrap();
        fs::create_dir_all(project.join("docs")).unwrap();

        let source = SettingsSource::locate(&project.join("docs"), None);
        assert_eq!(source, SettingsSource::Builtin);
        assert!(source.path().is_none());
    }

    #[test]
    fn loads_json_and_toml_by_extension() {
        let tmp = repo();
        let json = tmp.path().join(SETTINGS_FILE_NAME);
        fs::write(&json, r#"{ "root": { "detect_pattern": "index.md" } }"#).unwrap();
        let settings = SettingsSource::Found(json).load().unwrap();
        assert_eq!(settings.root().detect_pattern().as_str(), "index.md");

        let toml = tmp.path().join(TOML_SETTINGS_FILE_NAME);
        fs::write(&toml, "[root]\ndetect_pattern = \"README.md\"\n").unwrap();
        let settings = SettingsSource::Explicit(toml).load().unwrap();
        assert_eq!(settings.root().detect_pattern().as_str(), "README.md");
    }

    #[test]
    fn broken_settings_name_the_file() {
        let tmp = repo();
        let json = tmp.path().join(SETTINGS_FILE_NAME);
        fs::write(&json, "{ not json").unwrap();

        let err = SettingsSource::Found(json).load().unwrap_err();
        assert!(err.to_string().contains(SETTINGS_FILE_NAME));
    }

    #[test]
    fn builtin_defaults_load_with_init_hint() {
        let settings = SettingsSource::Builtin.load().unwrap();
        assert_eq!(settings.rules().category_names(), vec!["feature", "tech"]);

        let hint = builtin_hint();
        assert!(hint.contains("using built-in defaults"));
        assert!(hint.contains("moff init"));
    }
}
