//! Binds a document to the rule set that governs it.

use super::rule_ids;
use crate::outline::DocumentOutline;
use crate::settings::model::{CategoryRule, RuleConfiguration};
use crate::types::{Diagnostic, RuleCategory};

pub(super) enum Resolution<'a> {
    /// The document is checked against `rule`; `label` names its category.
    Rule {
        rule: &'a CategoryRule,
        label: Option<&'a str>,
    },
    /// No rule set applies; the diagnostic explains why.
    Rejected(Diagnostic),
}

pub(super) fn resolve<'a>(
    config: &'a RuleConfiguration,
    outline: &'a DocumentOutline,
) -> Resolution<'a> {
    if outline.is_root() {
        return Resolution::Rule {
            rule: config.root_rule(),
            label: None,
        };
    }

    let defaults = config.defaults();

    if let Some(category) = outline.category() {
        return match config.category(category) {
            Some(rule) => Resolution::Rule {
                rule,
                label: Some(category),
            },
            None => Resolution::Rejected(
                Diagnostic::new(
                    defaults.naming,
                    RuleCategory::Naming,
                    rule_ids::UNRESOLVED_CATEGORY,
                    format!("no rules configured for category '{category}'"),
                )
                .with_path(outline.path())
                .with_category_label(category),
            ),
        };
    }

    let file_name = outline.file_name().unwrap_or_default();
    let candidates = config.categories_for_filename(file_name);
    match candidates.as_slice() {
        [(name, rule)] => Resolution::Rule {
            rule: *rule,
            label: Some(*name),
        },
        [] => Resolution::Rejected(
            Diagnostic::new(
                defaults.naming,
                RuleCategory::Naming,
                rule_ids::UNRESOLVED_CATEGORY,
                format!("file name '{file_name}' matches no configured category"),
            )
            .with_path(outline.path()),
        ),
        many => {
            let names: Vec<&str> = many.iter().map(|(name, _)| *name).collect();
            Resolution::Rejected(
                Diagnostic::new(
                    defaults.structure,
                    RuleCategory::Structure,
                    rule_ids::AMBIGUOUS_CATEGORY,
                    format!(
                        "file name '{file_name}' matches multiple categories: {}",
                        names.join(", ")
                    ),
                )
                .with_path(outline.path()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::model::{FilenamePattern, SeverityDefaults};
    use crate::types::Severity;

    fn config() -> RuleConfiguration {
        RuleConfiguration::new(
            1,
            CategoryRule::new(),
            vec![
                (
                    "adr".to_string(),
                    CategoryRule::new().with_filename(FilenamePattern::new("adr_*.md").unwrap()),
                ),
                (
                    "decision".to_string(),
                    CategoryRule::new().with_filename(FilenamePattern::new("*_decision.md").unwrap()),
                ),
            ],
            SeverityDefaults::default(),
        )
        .unwrap()
    }

    fn rejected(resolution: Resolution<'_>) -> Diagnostic {
        match resolution {
            Resolution::Rejected(d) => d,
            Resolution::Rule { .. } => panic!("expected rejection"),
        }
    }

    #[test]
    fn root_uses_root_rule_without_label() {
        let config = config();
        let outline = DocumentOutline::root("project_x.md", vec![]).unwrap();
        match resolve(&config, &outline) {
            Resolution::Rule { rule, label } => {
                assert!(std::ptr::eq(rule, config.root_rule()));
                assert_eq!(label, None);
            }
            Resolution::Rejected(d) => panic!("unexpected: {d}"),
        }
    }

    #[test]
    fn explicit_category_is_looked_up_exactly() {
        let config = config();
        let outline = DocumentOutline::new("adr_1.md", Some("adr".into()), vec![]).unwrap();
        assert!(matches!(
            resolve(&config, &outline),
            Resolution::Rule { label: Some("adr"), .. }
        ));

        let outline = DocumentOutline::new("ADR_1.md", Some("ADR".into()), vec![]).unwrap();
        let d = rejected(resolve(&config, &outline));
        assert_eq!(d.category(), RuleCategory::Naming);
        assert_eq!(d.severity(), Severity::Warning);
        assert_eq!(d.rule(), rule_ids::UNRESOLVED_CATEGORY);
        assert_eq!(d.category_label(), Some("ADR"));
        assert_eq!(d.line(), None);
    }

    #[test]
    fn filename_resolution() {
        let config = config();

        let outline = DocumentOutline::new("adr_7.md", None, vec![]).unwrap();
        assert!(matches!(
            resolve(&config, &outline),
            Resolution::Rule { label: Some("adr"), .. }
        ));

        let outline = DocumentOutline::new("notes.md", None, vec![]).unwrap();
        let d = rejected(resolve(&config, &outline));
        assert_eq!(d.category(), RuleCategory::Naming);

        let outline = DocumentOutline::new("adr_decision.md", None, vec![]).unwrap();
        let d = rejected(resolve(&config, &outline));
        assert_eq!(d.category(), RuleCategory::Structure);
        assert_eq!(d.severity(), Severity::Error);
        assert!(d.message().contains("adr, decision"));
    }
}
