//! Core types for diagnostics and check reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail the check.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl Severity {
    /// Parses a lowercase severity token (`error`, `warning`, `info`).
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Structural dimension a diagnostic concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    /// Header ordering.
    Order,
    /// Header nesting and file placement.
    Location,
    /// Header presence or absence.
    Match,
    /// Category resolution from file names.
    Naming,
    /// Configuration structure problems surfaced per document.
    Structure,
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Order => write!(f, "order"),
            Self::Location => write!(f, "location"),
            Self::Match => write!(f, "match"),
            Self::Naming => write!(f, "naming"),
            Self::Structure => write!(f, "structure"),
        }
    }
}

/// One reported deviation from the configured document structure.
///
/// Fields are private; a diagnostic is built once with the `with_*`
/// methods and read through accessors afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    severity: Severity,
    category: RuleCategory,
    rule: String,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category_label: Option<String>,
}

impl Diagnostic {
    /// Creates a new diagnostic without path, line or label.
    #[must_use]
    pub fn new(
        severity: Severity,
        category: RuleCategory,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            rule: rule.into(),
            message: message.into(),
            path: None,
            line: None,
            category_label: None,
        }
    }

    /// Attaches the document path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attaches a 1-based line number.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attaches a line number when one is known.
    #[must_use]
    pub fn with_optional_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }

    /// Attaches the naming category label (e.g. `adr`).
    #[must_use]
    pub fn with_category_label(mut self, label: impl Into<String>) -> Self {
        self.category_label = Some(label.into());
        self
    }

    /// Returns the severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the rule category.
    #[must_use]
    pub fn category(&self) -> RuleCategory {
        self.category
    }

    /// Returns the rule identifier (e.g. `order.sequence`).
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the document path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the line number, if any.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Returns the naming category label, if any.
    #[must_use]
    pub fn category_label(&self) -> Option<&str> {
        self.category_label.as_deref()
    }

    /// Formats the diagnostic for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = String::new();
        let _ = write!(output, "{}", self.severity);
        if let Some(label) = &self.category_label {
            let _ = write!(output, " [{label}]");
        }
        let _ = write!(output, " {}: {}", self.rule, self.message);
        if let Some(line) = self.line {
            let _ = write!(output, " (line {line})");
        }
        output
    }

    /// Total ordering used by [`DiagnosticReport`].
    ///
    /// Primary key is `(path, line-or-zero, category, rule)`; message and
    /// severity only break ties.
    fn sort_key(&self) -> (Option<&Path>, usize, RuleCategory, &str, &str, Severity) {
        (
            self.path.as_deref(),
            self.line.unwrap_or(0),
            self.category,
            &self.rule,
            &self.message,
            self.severity,
        )
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}", path.display())?,
            None => write!(f, "[root]")?,
        }
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        write!(f, ": {} [{}] {}", self.severity, self.rule, self.message)
    }
}

/// Ordered, deduplicated result of a check run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    diagnostics: Vec<Diagnostic>,
    documents_checked: usize,
}

impl DiagnosticReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles a report from unordered diagnostics.
    ///
    /// Sorts by `(path, line-or-zero, category, rule)` and collapses
    /// identical entries.
    #[must_use]
    pub fn from_diagnostics(mut diagnostics: Vec<Diagnostic>, documents_checked: usize) -> Self {
        diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        diagnostics.dedup();
        Self {
            diagnostics,
            documents_checked,
        }
    }

    /// Returns the diagnostics in report order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of documents the report covers.
    #[must_use]
    pub fn documents_checked(&self) -> usize {
        self.documents_checked
    }

    /// Returns true if no diagnostics were produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns true if any diagnostic has `Error` severity.
    #[must_use]
    pub fn has_blocking_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Process exit status derived from the report: 0 when clean, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(self.has_blocking_errors())
    }

    /// Returns diagnostics of one rule category.
    #[must_use]
    pub fn by_category(&self, category: RuleCategory) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.category == category)
            .collect()
    }

    /// Returns diagnostics filtered by severity.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .collect()
    }

    /// Returns diagnostics reported against one document.
    #[must_use]
    pub fn for_path(&self, path: &Path) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.path.as_deref() == Some(path))
            .collect()
    }

    /// Groups diagnostics by document path; path-less entries use `None`.
    #[must_use]
    pub fn grouped_by_path(&self) -> BTreeMap<Option<&Path>, Vec<&Diagnostic>> {
        let mut groups: BTreeMap<Option<&Path>, Vec<&Diagnostic>> = BTreeMap::new();
        for diagnostic in &self.diagnostics {
            groups.entry(diagnostic.path()).or_default().push(diagnostic);
        }
        groups
    }

    /// Counts diagnostics by severity as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        self.diagnostics
            .iter()
            .fold((0, 0, 0), |(e, w, i), d| match d.severity {
                Severity::Error => (e + 1, w, i),
                Severity::Warning => (e, w + 1, i),
                Severity::Info => (e, w, i + 1),
            })
    }
}

impl IntoIterator for DiagnosticReport {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_diagnostic(path: &str, line: Option<usize>, category: RuleCategory) -> Diagnostic {
        Diagnostic::new(Severity::Error, category, "order.sequence", "out of order")
            .with_path(path)
            .with_optional_line(line)
    }

    #[test]
    fn format_includes_label_and_line() {
        let d = make_diagnostic("adr_001.md", Some(4), RuleCategory::Order).with_category_label("adr");
        assert_eq!(d.format(), "error [adr] order.sequence: out of order (line 4)");
    }

    #[test]
    fn format_omits_missing_line() {
        let d = make_diagnostic("adr_001.md", None, RuleCategory::Order);
        assert_eq!(d.format(), "error order.sequence: out of order");
    }

    #[test]
    fn display_uses_root_marker_without_path() {
        let d = Diagnostic::new(Severity::Warning, RuleCategory::Naming, "n", "msg");
        assert_eq!(format!("{d}"), "[root]: warning [n] msg");
    }

    #[test]
    fn report_sorts_by_path_line_category() {
        let report = DiagnosticReport::from_diagnostics(
            vec![
                make_diagnostic("b.md", Some(1), RuleCategory::Order),
                make_diagnostic("a.md", Some(9), RuleCategory::Order),
                make_diagnostic("a.md", None, RuleCategory::Match),
                make_diagnostic("a.md", Some(9), RuleCategory::Location),
            ],
            2,
        );
        let keys: Vec<_> = report
            .diagnostics()
            .iter()
            .map(|d| (d.path().map(Path::to_path_buf), d.line(), d.category()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (Some(PathBuf::from("a.md")), None, RuleCategory::Match),
                (Some(PathBuf::from("a.md")), Some(9), RuleCategory::Order),
                (Some(PathBuf::from("a.md")), Some(9), RuleCategory::Location),
                (Some(PathBuf::from("b.md")), Some(1), RuleCategory::Order),
            ]
        );
    }

    #[test]
    fn report_collapses_identical_entries() {
        let d = make_diagnostic("a.md", Some(3), RuleCategory::Order);
        let report = DiagnosticReport::from_diagnostics(vec![d.clone(), d], 1);
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn exit_code_follows_errors_only() {
        let warning = Diagnostic::new(Severity::Warning, RuleCategory::Naming, "n", "w");
        let report = DiagnosticReport::from_diagnostics(vec![warning.clone()], 1);
        assert!(!report.has_blocking_errors());
        assert_eq!(report.exit_code(), 0);

        let error = make_diagnostic("a.md", None, RuleCategory::Match);
        let report = DiagnosticReport::from_diagnostics(vec![warning, error], 1);
        assert!(report.has_blocking_errors());
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.count_by_severity(), (1, 1, 0));
    }

    #[test]
    fn grouped_by_path_keeps_pathless_first() {
        let report = DiagnosticReport::from_diagnostics(
            vec![
                make_diagnostic("a.md", None, RuleCategory::Match),
                Diagnostic::new(Severity::Info, RuleCategory::Structure, "s", "m"),
            ],
            1,
        );
        let groups = report.grouped_by_path();
        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, vec![None, Some(Path::new("a.md"))]);
    }
}
