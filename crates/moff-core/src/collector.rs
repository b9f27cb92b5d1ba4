//! Document collection: root detection, directory walk and outline extraction.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::markdown::extract_headers;
use crate::outline::{DocumentOutline, OutlineError};
use crate::settings::Settings;

/// Errors that can occur while collecting documents.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum CollectError {
    /// No root document was found below the start directory.
    #[error("no root document matching `{pattern}` found under {}", .start.display())]
    #[diagnostic(
        code(moff::collect::root_not_found),
        help("create a root document such as `project_overview.md` or set `root.override_path`")
    )]
    RootNotFound {
        /// Directory the search started from.
        start: PathBuf,
        /// The detection pattern.
        pattern: String,
    },

    /// A file or directory could not be read.
    #[error("failed to read {}", .path.display())]
    #[diagnostic(code(moff::collect::io))]
    Io {
        /// The offending path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("directory walk failed: {0}")]
    #[diagnostic(code(moff::collect::walk))]
    Walk(#[from] ignore::Error),

    /// A parsed outline violated its invariants.
    #[error(transparent)]
    #[diagnostic(code(moff::collect::outline))]
    Outline(#[from] OutlineError),
}

/// The documents of one documentation tree.
#[derive(Debug, Clone)]
pub struct Collection {
    root_dir: PathBuf,
    root_file: PathBuf,
    outlines: Vec<DocumentOutline>,
}

impl Collection {
    /// Returns the documentation root directory.
    #[must_use]
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Returns the root document path, relative to [`Self::root_dir`].
    #[must_use]
    pub fn root_file(&self) -> &Path {
        &self.root_file
    }

    /// Returns the outlines sorted by path.
    #[must_use]
    pub fn outlines(&self) -> &[DocumentOutline] {
        &self.outlines
    }

    /// Returns the number of collected documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outlines.len()
    }

    /// Returns true if no document was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outlines.is_empty()
    }
}

/// Collects markdown documents according to [`Settings`].
#[derive(Debug, Clone, Copy)]
pub struct Collector<'a> {
    settings: &'a Settings,
}

impl<'a> Collector<'a> {
    /// Creates a collector.
    #[must_use]
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Detects the documentation root below `start` and parses every
    /// markdown file in it.
    ///
    /// # Errors
    ///
    /// Returns an error if no root document exists or a file cannot be read.
    pub fn collect(&self, start: &Path) -> Result<Collection, CollectError> {
        let root_path = self.detect_root(start)?;
        let root_dir = root_path
            .parent()
            .map_or_else(|| start.to_path_buf(), Path::to_path_buf);
        let root_file = root_path
            .strip_prefix(&root_dir)
            .map_or_else(|_| root_path.clone(), Path::to_path_buf);
        info!("Documentation root: {}", root_path.display());

        let files = self.discover_files(&root_dir)?;
        info!("Found {} markdown file(s)", files.len());

        let outlines = files
            .par_iter()
            .map(|relative| -> Result<DocumentOutline, CollectError> {
                let full = root_dir.join(relative);
                let content = std::fs::read_to_string(&full).map_err(|e| CollectError::Io {
                    path: full.clone(),
                    source: e,
                })?;
                let headers = extract_headers(&content);
                debug!("{}: {} header(s)", relative.display(), headers.len());

                let outline = if *relative == root_file {
                    DocumentOutline::root(relative.clone(), headers)?
                } else {
                    DocumentOutline::new(relative.clone(), category_of(relative), headers)?
                };
                Ok(outline)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Collection {
            root_dir,
            root_file,
            outlines,
        })
    }

    /// Finds the root document: the configured override, else the
    /// shallowest file matching the detection pattern.
    fn detect_root(&self, start: &Path) -> Result<PathBuf, CollectError> {
        let root = self.settings.root();
        let not_found = || CollectError::RootNotFound {
            start: start.to_path_buf(),
            pattern: root.detect_pattern().as_str().to_string(),
        };

        if let Some(path) = root.override_path() {
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                start.join(path)
            };
            debug!("Using root override: {}", path.display());
            return if path.is_file() { Ok(path) } else { Err(not_found()) };
        }

        let collector = self.settings.collector();
        WalkDir::new(start)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let relative = entry.path().strip_prefix(start).unwrap_or(entry.path());
                !collector.is_excluded(relative)
            })
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| root.detect_pattern().matches(name))
            })
            .min_by(|a, b| a.depth().cmp(&b.depth()).then_with(|| a.path().cmp(b.path())))
            .map(walkdir::DirEntry::into_path)
            .ok_or_else(not_found)
    }

    /// Lists markdown files below `root_dir`, relative to it and sorted.
    fn discover_files(&self, root_dir: &Path) -> Result<Vec<PathBuf>, CollectError> {
        let collector = self.settings.collector();
        let respect = collector.respect_gitignore();

        let mut builder = ignore::WalkBuilder::new(root_dir);
        builder
            .git_ignore(respect)
            .git_exclude(respect)
            .git_global(respect)
            .ignore(respect)
            .parents(respect)
            .require_git(false);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();

            if !entry.file_type().is_some_and(|t| t.is_file())
                || path.extension().map_or(true, |ext| ext != "md")
            {
                continue;
            }

            let relative = path.strip_prefix(root_dir).unwrap_or(path);
            if collector.is_excluded(relative) {
                debug!("Excluding: {}", relative.display());
                continue;
            }
            files.push(relative.to_path_buf());
        }

        files.sort();
        Ok(files)
    }
}

/// Naming category: the file stem up to the first `_`.
fn category_of(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    match stem.split_once('_') {
        Some((prefix, _)) if !prefix.is_empty() => Some(prefix.to_string()),
        _ => None,
    }
}
