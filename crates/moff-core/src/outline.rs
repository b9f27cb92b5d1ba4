//! Header outlines of markdown documents.
//!
//! An outline is the flat, line-ordered list of headers in one file. The
//! header tree is implicit: the parent of a header is the nearest preceding
//! header with a smaller level. [`HeaderTree`] computes those relations with
//! a single level-stack scan and answers parent/depth queries by index.

use std::fmt;
use std::path::{Path, PathBuf};

/// A validated markdown header level (1..=6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeaderLevel(u8);

impl HeaderLevel {
    /// Creates a header level.
    ///
    /// # Errors
    ///
    /// Returns error if the level is outside `1..=6`.
    pub fn new(level: u8) -> Result<Self, OutlineError> {
        if (1..=6).contains(&level) {
            Ok(Self(level))
        } else {
            Err(OutlineError::InvalidLevel { level })
        }
    }

    /// Returns the numeric level.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for HeaderLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single header occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    level: HeaderLevel,
    text: String,
    line: usize,
}

impl Header {
    /// Creates a header.
    ///
    /// # Errors
    ///
    /// Returns error if the level is outside `1..=6` or the line is 0.
    pub fn new(level: u8, text: impl Into<String>, line: usize) -> Result<Self, OutlineError> {
        let level = HeaderLevel::new(level)?;
        if line == 0 {
            return Err(OutlineError::ZeroLine);
        }
        Ok(Self {
            level,
            text: text.into(),
            line,
        })
    }

    /// Returns the header level.
    #[must_use]
    pub fn level(&self) -> HeaderLevel {
        self.level
    }

    /// Returns the header text without markup.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the 1-based line number.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }
}

/// Header outline of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutline {
    path: PathBuf,
    category: Option<String>,
    headers: Vec<Header>,
    is_root: bool,
}

impl DocumentOutline {
    /// Creates an outline for a non-root document.
    ///
    /// # Errors
    ///
    /// Returns error if headers are not sorted by line.
    pub fn new(
        path: impl Into<PathBuf>,
        category: Option<String>,
        headers: Vec<Header>,
    ) -> Result<Self, OutlineError> {
        let path = path.into();
        if let Some(pair) = headers.windows(2).find(|w| w[0].line >= w[1].line) {
            return Err(OutlineError::Unsorted {
                path,
                line: pair[1].line,
            });
        }
        Ok(Self {
            path,
            category,
            headers,
            is_root: false,
        })
    }

    /// Creates the outline of the root document.
    ///
    /// # Errors
    ///
    /// Returns error if headers are not sorted by line.
    pub fn root(path: impl Into<PathBuf>, headers: Vec<Header>) -> Result<Self, OutlineError> {
        let mut outline = Self::new(path, None, headers)?;
        outline.is_root = true;
        Ok(outline)
    }

    /// Returns the path relative to the documentation root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the naming category, if one was derived.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Returns the headers in document order.
    #[must_use]
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Returns true for the documentation root file.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Returns the file name component of the path.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Returns true if the file sits directly in the documentation root.
    #[must_use]
    pub fn is_in_root_dir(&self) -> bool {
        self.path
            .parent()
            .map_or(true, |p| p.as_os_str().is_empty())
    }

    /// Line of the last header, if the document has any.
    #[must_use]
    pub fn last_line(&self) -> Option<usize> {
        self.headers.last().map(Header::line)
    }
}

/// Index-based parent/depth view over a header slice.
#[derive(Debug)]
pub struct HeaderTree<'a> {
    headers: &'a [Header],
    parents: Vec<Option<usize>>,
    depths: Vec<usize>,
}

impl<'a> HeaderTree<'a> {
    /// Builds the tree with a level-stack scan.
    #[must_use]
    pub fn new(headers: &'a [Header]) -> Self {
        let mut parents = Vec::with_capacity(headers.len());
        let mut depths = Vec::with_capacity(headers.len());
        let mut stack: Vec<usize> = Vec::new();

        for (index, header) in headers.iter().enumerate() {
            while stack
                .last()
                .is_some_and(|&top| headers[top].level >= header.level)
            {
                stack.pop();
            }
            parents.push(stack.last().copied());
            depths.push(stack.len());
            stack.push(index);
        }

        Self {
            headers,
            parents,
            depths,
        }
    }

    /// Returns the headers in document order.
    #[must_use]
    pub fn headers(&self) -> &'a [Header] {
        self.headers
    }

    /// Returns the parent header of the header at `index`.
    #[must_use]
    pub fn parent(&self, index: usize) -> Option<&'a Header> {
        self.parents
            .get(index)
            .copied()
            .flatten()
            .map(|p| &self.headers[p])
    }

    /// Returns the nesting depth of the header at `index` (top-level = 0).
    #[must_use]
    pub fn depth(&self, index: usize) -> usize {
        self.depths.get(index).copied().unwrap_or(0)
    }
}

/// Errors in outline construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutlineError {
    /// Header level outside `1..=6`.
    #[error("invalid header level {level}: must be between 1 and 6")]
    InvalidLevel {
        /// The invalid level.
        level: u8,
    },

    /// Header line number is 0.
    #[error("header line numbers are 1-based")]
    ZeroLine,

    /// Headers are not strictly ordered by line.
    #[error("{}: headers must be sorted by line (violated at line {line})", .path.display())]
    Unsorted {
        /// Document path.
        path: PathBuf,
        /// Line of the first out-of-order header.
        line: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(level: u8, text: &str, line: usize) -> Header {
        Header::new(level, text, line).unwrap()
    }

    #[test]
    fn header_level_bounds() {
        assert!(HeaderLevel::new(1).is_ok());
        assert!(HeaderLevel::new(6).is_ok());
        assert_eq!(
            HeaderLevel::new(0),
            Err(OutlineError::InvalidLevel { level: 0 })
        );
        assert!(HeaderLevel::new(7).is_err());
    }

    #[test]
    fn header_rejects_zero_line() {
        assert_eq!(Header::new(1, "Title", 0), Err(OutlineError::ZeroLine));
    }

    #[test]
    fn outline_rejects_unsorted_headers() {
        let result = DocumentOutline::new("a.md", None, vec![h(1, "A", 5), h(2, "B", 3)]);
        assert!(matches!(result, Err(OutlineError::Unsorted { line: 3, .. })));
    }

    #[test]
    fn root_dir_detection() {
        let top = DocumentOutline::new("feature_a.md", None, vec![]).unwrap();
        let nested = DocumentOutline::new("sub/feature_a.md", None, vec![]).unwrap();
        assert!(top.is_in_root_dir());
        assert!(!nested.is_in_root_dir());
    }

    #[test]
    fn tree_parents_follow_nearest_smaller_level() {
        let headers = vec![
            h(1, "Title", 1),
            h(2, "Context", 3),
            h(3, "Detail", 5),
            h(2, "Decision", 7),
            h(4, "Deep", 9),
        ];
        let tree = HeaderTree::new(&headers);

        assert!(tree.parent(0).is_none());
        assert_eq!(tree.parent(1).map(Header::text), Some("Title"));
        assert_eq!(tree.parent(2).map(Header::text), Some("Context"));
        assert_eq!(tree.parent(3).map(Header::text), Some("Title"));
        // Level jump: the level-4 header still hangs off the nearest level-2.
        assert_eq!(tree.parent(4).map(Header::text), Some("Decision"));

        assert_eq!(tree.depth(0), 0);
        assert_eq!(tree.depth(2), 2);
        assert_eq!(tree.depth(4), 2);
    }

    #[test]
    fn tree_without_top_level_header() {
        let headers = vec![h(2, "A", 1), h(2, "B", 2), h(3, "C", 3)];
        let tree = HeaderTree::new(&headers);
        assert!(tree.parent(0).is_none());
        assert!(tree.parent(1).is_none());
        assert_eq!(tree.parent(2).map(Header::text), Some("B"));
        assert_eq!(tree.depth(1), 0);
    }
}
