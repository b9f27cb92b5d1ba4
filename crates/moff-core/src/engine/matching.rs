//! Required/forbidden header constraints and pattern validity.

use std::collections::BTreeMap;

use super::{evaluable, rule_ids, DocumentScope};
use crate::settings::model::{CategoryRule, Presence};
use crate::types::{Diagnostic, RuleCategory};

pub(super) fn check(scope: &DocumentScope<'_>, rule: &CategoryRule) -> Vec<Diagnostic> {
    let headers = scope.outline.headers();
    let mut diagnostics = Vec::new();

    for header_match in rule.matches() {
        let pattern = header_match.header();
        if !evaluable([pattern.text()]) {
            continue;
        }
        let severity = header_match.severity().unwrap_or(scope.defaults.matching);

        match header_match.presence() {
            Presence::Required => {
                if !headers.iter().any(|h| pattern.matches(h)) {
                    diagnostics.push(scope.diagnostic(
                        severity,
                        RuleCategory::Match,
                        rule_ids::MATCH_REQUIRED,
                        format!("missing required header {pattern}"),
                    ));
                }
            }
            Presence::Forbidden => {
                diagnostics.extend(headers.iter().filter(|h| pattern.matches(h)).map(|h| {
                    scope
                        .diagnostic(
                            severity,
                            RuleCategory::Match,
                            rule_ids::MATCH_FORBIDDEN,
                            format!("forbidden header '{}' found", h.text()),
                        )
                        .with_line(h.line())
                }));
            }
        }
    }

    diagnostics
}

/// Reports each distinct pattern of `rule` that failed to compile.
pub(super) fn check_patterns(scope: &DocumentScope<'_>, rule: &CategoryRule) -> Vec<Diagnostic> {
    let invalid: BTreeMap<&str, &str> = rule
        .header_texts()
        .filter_map(|text| text.invalid_pattern())
        .collect();

    invalid
        .into_iter()
        .map(|(pattern, reason)| {
            // regex errors render over several lines; the last one holds the cause.
            let reason = reason.lines().last().unwrap_or(reason).trim();
            scope.diagnostic(
                scope.defaults.matching,
                RuleCategory::Match,
                rule_ids::MATCH_INVALID_PATTERN,
                format!("invalid header pattern /{pattern}/ ({reason}); constraints using it were skipped"),
            )
        })
        .collect()
}
