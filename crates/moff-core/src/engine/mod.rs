//! Rule engine: checks document outlines against a rule configuration.
//!
//! The engine is a pure function of `(RuleConfiguration, [DocumentOutline])`.
//! Each document is evaluated independently (in parallel by default) and the
//! per-document batches are merged into one sorted [`DiagnosticReport`].
//!
//! ## Example
//!
//! ```ignore
//! use moff_core::{RuleEngine, Settings};
//!
//! let settings = Settings::from_file(Path::new("settings.json"))?;
//! let report = RuleEngine::new(settings.rules()).check(&outlines);
//! std::process::exit(report.exit_code());
//! ```

use rayon::prelude::*;
use tracing::{debug, info};

use crate::outline::{DocumentOutline, HeaderTree};
use crate::settings::model::{HeaderText, RuleConfiguration, SeverityDefaults};
use crate::types::{Diagnostic, DiagnosticReport, RuleCategory, Severity};

mod location;
mod matching;
mod order;
mod resolve;

/// Rule identifiers carried by [`Diagnostic::rule`].
pub mod rule_ids {
    /// Document category has no configured rule set.
    pub const UNRESOLVED_CATEGORY: &str = "naming.unresolved-category";
    /// Document file name matches several categories.
    pub const AMBIGUOUS_CATEGORY: &str = "structure.ambiguous-category";
    /// Header order diverges from the expected sequence.
    pub const ORDER_SEQUENCE: &str = "order.sequence";
    /// Header must not be nested.
    pub const LOCATION_TOP_LEVEL: &str = "location.top-level";
    /// Header is nested under the wrong parent.
    pub const LOCATION_PARENT: &str = "location.parent";
    /// Header depth is outside the allowed range.
    pub const LOCATION_DEPTH: &str = "location.depth";
    /// Header skips one or more levels.
    pub const LOCATION_LEVEL_JUMP: &str = "location.level-jump";
    /// File lives in the wrong directory.
    pub const LOCATION_PLACEMENT: &str = "location.placement";
    /// Required header is missing.
    pub const MATCH_REQUIRED: &str = "match.required";
    /// Forbidden header is present.
    pub const MATCH_FORBIDDEN: &str = "match.forbidden";
    /// Header pattern does not compile.
    pub const MATCH_INVALID_PATTERN: &str = "match.invalid-pattern";
}

/// Checks outlines against a borrowed rule configuration.
#[derive(Debug, Clone, Copy)]
pub struct RuleEngine<'a> {
    config: &'a RuleConfiguration,
    parallel: bool,
}

impl<'a> RuleEngine<'a> {
    /// Creates an engine; documents are evaluated in parallel by default.
    #[must_use]
    pub fn new(config: &'a RuleConfiguration) -> Self {
        Self {
            config,
            parallel: true,
        }
    }

    /// Enables or disables parallel document evaluation.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks all outlines and returns the sorted, deduplicated report.
    #[must_use]
    pub fn check(&self, outlines: &[DocumentOutline]) -> DiagnosticReport {
        info!("Checking {} document(s)", outlines.len());

        let batches: Vec<Vec<Diagnostic>> = if self.parallel {
            outlines
                .par_iter()
                .map(|outline| self.check_document(outline))
                .collect()
        } else {
            outlines
                .iter()
                .map(|outline| self.check_document(outline))
                .collect()
        };

        let report =
            DiagnosticReport::from_diagnostics(batches.into_iter().flatten().collect(), outlines.len());

        let (errors, warnings, infos) = report.count_by_severity();
        info!(
            "Check complete: {} error(s), {} warning(s), {} info(s)",
            errors, warnings, infos
        );
        report
    }

    /// Evaluates one document; the result is unsorted.
    #[must_use]
    pub fn check_document(&self, outline: &DocumentOutline) -> Vec<Diagnostic> {
        debug!("Checking: {}", outline.path().display());

        let (rule, label) = match resolve::resolve(self.config, outline) {
            resolve::Resolution::Rule { rule, label } => (rule, label),
            resolve::Resolution::Rejected(diagnostic) => return vec![diagnostic],
        };

        let scope = DocumentScope {
            outline,
            label,
            defaults: self.config.defaults(),
        };
        let tree = HeaderTree::new(outline.headers());

        let mut diagnostics = matching::check_patterns(&scope, rule);
        for header_order in rule.orders() {
            if evaluable(header_order.headers()) {
                diagnostics.extend(order::check(&scope, header_order));
            }
        }
        diagnostics.extend(location::check(&scope, rule, &tree));
        diagnostics.extend(matching::check(&scope, rule));
        diagnostics
    }
}

/// Checks outlines against `config` with default engine options.
#[must_use]
pub fn check(config: &RuleConfiguration, outlines: &[DocumentOutline]) -> DiagnosticReport {
    RuleEngine::new(config).check(outlines)
}

/// The document under evaluation plus what every diagnostic needs from it.
pub(super) struct DocumentScope<'a> {
    outline: &'a DocumentOutline,
    label: Option<&'a str>,
    defaults: &'a SeverityDefaults,
}

impl DocumentScope<'_> {
    fn diagnostic(
        &self,
        severity: Severity,
        category: RuleCategory,
        rule: &str,
        message: String,
    ) -> Diagnostic {
        let diagnostic =
            Diagnostic::new(severity, category, rule, message).with_path(self.outline.path());
        match self.label {
            Some(label) => diagnostic.with_category_label(label),
            None => diagnostic,
        }
    }
}

/// Constraints referencing an invalid pattern are skipped.
fn evaluable<'t>(texts: impl IntoIterator<Item = &'t HeaderText>) -> bool {
    texts.into_iter().all(|t| t.invalid_pattern().is_none())
}
