//! Location constraints: header nesting, level jumps and file placement.

use std::collections::HashSet;

use super::{evaluable, rule_ids, DocumentScope};
use crate::outline::HeaderTree;
use crate::settings::model::{CategoryRule, LocationConstraint, LocationKind, Placement};
use crate::types::{Diagnostic, RuleCategory, Severity};

pub(super) fn check(
    scope: &DocumentScope<'_>,
    rule: &CategoryRule,
    tree: &HeaderTree<'_>,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if let Some(d) = placement(scope, rule.placement()) {
        diagnostics.push(d);
    }

    // One diagnostic per (rule, line), however many constraints hit it.
    let mut seen: HashSet<(&'static str, usize)> = HashSet::new();

    for constraint in rule.locations() {
        let texts = std::iter::once(constraint.header().text()).chain(match constraint.kind() {
            LocationKind::Parent(parent) => Some(parent),
            LocationKind::TopLevel | LocationKind::Depth(_) => None,
        });
        if !evaluable(texts) {
            continue;
        }

        for (index, header) in tree.headers().iter().enumerate() {
            if !constraint.header().matches(header) {
                continue;
            }
            let Some((rule_id, severity, message)) = evaluate(scope, constraint, tree, index)
            else {
                continue;
            };
            if seen.insert((rule_id, header.line())) {
                diagnostics.push(
                    scope
                        .diagnostic(severity, RuleCategory::Location, rule_id, message)
                        .with_line(header.line()),
                );
            }
        }
    }

    if rule.flags_level_jumps() {
        for (index, header) in tree.headers().iter().enumerate() {
            let Some(parent) = tree.parent(index) else {
                continue;
            };
            if header.level().get() > parent.level().get() + 1
                && seen.insert((rule_ids::LOCATION_LEVEL_JUMP, header.line()))
            {
                diagnostics.push(
                    scope
                        .diagnostic(
                            scope.defaults.soft_location,
                            RuleCategory::Location,
                            rule_ids::LOCATION_LEVEL_JUMP,
                            format!(
                                "header '{}' jumps from level {} to level {}",
                                header.text(),
                                parent.level(),
                                header.level()
                            ),
                        )
                        .with_line(header.line()),
                );
            }
        }
    }

    diagnostics
}

fn evaluate(
    scope: &DocumentScope<'_>,
    constraint: &LocationConstraint,
    tree: &HeaderTree<'_>,
    index: usize,
) -> Option<(&'static str, Severity, String)> {
    let header = &tree.headers()[index];
    let parent = tree.parent(index);
    let hard = constraint.severity().unwrap_or(scope.defaults.location);

    match constraint.kind() {
        LocationKind::TopLevel => parent.map(|p| {
            (
                rule_ids::LOCATION_TOP_LEVEL,
                hard,
                format!(
                    "header '{}' must be top-level but is nested under '{}'",
                    header.text(),
                    p.text()
                ),
            )
        }),
        LocationKind::Parent(expected) => match parent {
            Some(p) if expected.matches(p.text()) => None,
            Some(p) => Some((
                rule_ids::LOCATION_PARENT,
                hard,
                format!(
                    "header '{}' must be nested under {expected} but its parent is '{}'",
                    header.text(),
                    p.text()
                ),
            )),
            None => Some((
                rule_ids::LOCATION_PARENT,
                hard,
                format!(
                    "header '{}' must be nested under {expected} but has no parent",
                    header.text()
                ),
            )),
        },
        LocationKind::Depth(range) => {
            let depth = tree.depth(index);
            if range.permits(depth) {
                return None;
            }
            let severity = constraint.severity().unwrap_or(if range.is_fatal() {
                Severity::Error
            } else {
                scope.defaults.soft_location
            });
            let message = if range.is_forbidden() {
                format!(
                    "header '{}' is at depth {depth}, which is forbidden ({range})",
                    header.text()
                )
            } else {
                format!(
                    "header '{}' is at depth {depth}, allowed depth is {range}",
                    header.text()
                )
            };
            Some((rule_ids::LOCATION_DEPTH, severity, message))
        }
    }
}

fn placement(scope: &DocumentScope<'_>, placement: Placement) -> Option<Diagnostic> {
    if scope.outline.is_root() || placement.allows(scope.outline.is_in_root_dir()) {
        return None;
    }
    let message = match placement {
        Placement::RootOnly => "file must be placed directly in the documentation root",
        Placement::SubdirsOnly | Placement::Any => {
            "file must be placed in a subdirectory of the documentation root"
        }
    };
    Some(scope.diagnostic(
        scope.defaults.location,
        RuleCategory::Location,
        rule_ids::LOCATION_PLACEMENT,
        format!("{message} (placement: {placement})"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{DocumentOutline, Header, HeaderLevel};
    use crate::settings::model::{DepthRange, HeaderPattern, HeaderText, SeverityDefaults};

    fn h(level: u8, text: &str, line: usize) -> Header {
        Header::new(level, text, line).unwrap()
    }

    fn pattern(text: &str, level: Option<u8>) -> HeaderPattern {
        HeaderPattern::new(
            HeaderText::literal(text).unwrap(),
            level.map(|l| HeaderLevel::new(l).unwrap()),
        )
    }

    fn run(path: &str, headers: Vec<Header>, rule: &CategoryRule) -> Vec<Diagnostic> {
        let outline = DocumentOutline::new(path, Some("doc".into()), headers).unwrap();
        let defaults = SeverityDefaults::default();
        let scope = DocumentScope {
            outline: &outline,
            label: Some("doc"),
            defaults: &defaults,
        };
        let tree = HeaderTree::new(outline.headers());
        check(&scope, rule, &tree)
    }

    #[test]
    fn top_level_violation() {
        let rule = CategoryRule::new().with_location(LocationConstraint::new(
            pattern("Overview", None),
            LocationKind::TopLevel,
            None,
        ));
        let ok = run("a.md", vec![h(1, "Overview", 1), h(2, "Usage", 2)], &rule);
        assert!(ok.is_empty());

        let bad = run("a.md", vec![h(1, "Title", 1), h(2, "Overview", 4)], &rule);
        assert_eq!(bad.len(), 1);
        assert_eq!(bad[0].rule(), rule_ids::LOCATION_TOP_LEVEL);
        assert_eq!(bad[0].severity(), Severity::Error);
        assert_eq!(bad[0].line(), Some(4));
        assert!(bad[0].message().contains("nested under 'Title'"));
    }

    #[test]
    fn parent_violation_and_missing_parent() {
        let rule = CategoryRule::new().with_location(LocationConstraint::new(
            pattern("Examples", Some(3)),
            LocationKind::Parent(HeaderText::literal("Usage").unwrap()),
            None,
        ));
        let headers = vec![
            h(2, "Usage", 1),
            h(3, "Examples", 2),
            h(2, "Install", 3),
            h(3, "Examples", 4),
        ];
        let diagnostics = run("a.md", headers, &rule);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line(), Some(4));
        assert!(diagnostics[0].message().contains("parent is 'Install'"));

        let orphan = run("a.md", vec![h(3, "Examples", 1)], &rule);
        assert!(orphan[0].message().contains("has no parent"));
    }

    #[test]
    fn depth_defaults_to_soft_severity_unless_fatal() {
        let soft = CategoryRule::new().with_location(LocationConstraint::new(
            pattern("Note", None),
            LocationKind::Depth(DepthRange::new(0, Some(1), false, false).unwrap()),
            None,
        ));
        let headers = vec![h(1, "A", 1), h(2, "B", 2), h(3, "Note", 3)];
        let d = run("a.md", headers.clone(), &soft);
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].rule(), rule_ids::LOCATION_DEPTH);
        assert_eq!(d[0].severity(), Severity::Warning);

        let fatal = CategoryRule::new().with_location(LocationConstraint::new(
            pattern("Note", None),
            LocationKind::Depth(DepthRange::new(0, Some(1), false, true).unwrap()),
            None,
        ));
        assert_eq!(run("a.md", headers, &fatal)[0].severity(), Severity::Error);
    }

    #[test]
    fn forbidden_depth_range() {
        let rule = CategoryRule::new().with_location(LocationConstraint::new(
            pattern("Note", None),
            LocationKind::Depth(DepthRange::new(2, None, true, false).unwrap()),
            None,
        ));
        assert!(run("a.md", vec![h(1, "A", 1), h(2, "Note", 2)], &rule).is_empty());
        let d = run("a.md", vec![h(1, "A", 1), h(2, "B", 2), h(3, "Note", 3)], &rule);
        assert!(d[0].message().contains("forbidden (2..)"));
    }

    #[test]
    fn overlapping_constraints_report_once_per_line() {
        let rule = CategoryRule::new()
            .with_location(LocationConstraint::new(
                pattern("Overview", None),
                LocationKind::TopLevel,
                None,
            ))
            .with_location(LocationConstraint::new(
                pattern("Overview", Some(2)),
                LocationKind::TopLevel,
                None,
            ));
        let d = run("a.md", vec![h(1, "Title", 1), h(2, "Overview", 2)], &rule);
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn level_jumps_flagged_when_enabled() {
        let headers = vec![h(1, "Title", 1), h(3, "Deep", 2)];
        assert!(run("a.md", headers.clone(), &CategoryRule::new()).is_empty());

        let rule = CategoryRule::new().with_level_jumps_flagged(true);
        let d = run("a.md", headers, &rule);
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].rule(), rule_ids::LOCATION_LEVEL_JUMP);
        assert_eq!(d[0].severity(), Severity::Warning);
        assert_eq!(d[0].line(), Some(2));
    }

    #[test]
    fn placement_checks_directory() {
        let rule = CategoryRule::new().with_placement(Placement::SubdirsOnly);
        assert!(run("features/feature_a.md", vec![], &rule).is_empty());

        let d = run("feature_a.md", vec![], &rule);
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].rule(), rule_ids::LOCATION_PLACEMENT);
        assert_eq!(d[0].line(), None);
        assert!(d[0].message().contains("subdirs_only"));
    }

    #[test]
    fn invalid_parent_pattern_skips_constraint() {
        let rule = CategoryRule::new().with_location(LocationConstraint::new(
            pattern("Examples", None),
            LocationKind::Parent(HeaderText::pattern("Usage (").unwrap()),
            None,
        ));
        assert!(run("a.md", vec![h(2, "Examples", 1)], &rule).is_empty());
    }
}
