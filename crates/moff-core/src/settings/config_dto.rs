//! Serde types for `settings.json` / `moff.toml` (DTO layer).
//!
//! These types exist solely for (de)serialization.
//! They are converted to domain model types via the loader.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Raw representation of a settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsDto {
    /// Settings format version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Root document detection plus the root rule set.
    #[serde(default)]
    pub root: RootDto,

    /// File collection options.
    #[serde(default)]
    pub collector: CollectorDto,

    /// Default severities per diagnostic kind.
    #[serde(default)]
    pub defaults: DefaultsDto,

    /// Rule sets keyed by naming category.
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryRuleDto>,
}

impl Default for SettingsDto {
    fn default() -> Self {
        let mut categories = BTreeMap::new();
        categories.insert("feature".to_string(), default_feature_category());
        categories.insert("tech".to_string(), default_tech_category());

        Self {
            version: default_version(),
            root: RootDto::default(),
            collector: CollectorDto::default(),
            defaults: DefaultsDto::default(),
            categories,
        }
    }
}

/// Root document detection and rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootDto {
    /// File name glob identifying the root document.
    #[serde(default = "default_detect_pattern")]
    pub detect_pattern: String,

    /// Explicit root document path; skips detection when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_path: Option<PathBuf>,

    /// Rules applied to the root document.
    #[serde(flatten)]
    pub rule: CategoryRuleDto,
}

impl Default for RootDto {
    fn default() -> Self {
        Self {
            detect_pattern: default_detect_pattern(),
            override_path: None,
            rule: CategoryRuleDto {
                location: vec![LocationDto {
                    header: HeaderDto::text("Overview", Some(1)),
                    kind: LocationKindDto::TopLevel,
                    severity: None,
                }],
                headers: vec![MatchDto {
                    header: HeaderDto::text("Overview", Some(1)),
                    presence: PresenceDto::Required,
                    severity: None,
                }],
                ..CategoryRuleDto::default()
            },
        }
    }
}

/// File collection options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorDto {
    /// Glob patterns (relative to the root directory) to skip.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether to respect `.gitignore` files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
}

impl Default for CollectorDto {
    fn default() -> Self {
        Self {
            exclude: vec!["**/node_modules/**".to_string(), "**/.venv/**".to_string()],
            respect_gitignore: true,
        }
    }
}

/// Severity tokens (`error`, `warning`, `info`) per diagnostic kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsDto {
    /// Order violations.
    #[serde(default = "default_error")]
    pub order: String,
    /// Top-level, parent and placement violations.
    #[serde(default = "default_error")]
    pub location: String,
    /// Depth and level-jump violations.
    #[serde(default = "default_warning")]
    pub soft_location: String,
    /// Required/forbidden header violations.
    #[serde(default = "default_error", rename = "match")]
    pub matching: String,
    /// Unresolved categories.
    #[serde(default = "default_warning")]
    pub naming: String,
    /// Ambiguous categories.
    #[serde(default = "default_error")]
    pub structure: String,
}

impl Default for DefaultsDto {
    fn default() -> Self {
        Self {
            order: default_error(),
            location: default_error(),
            soft_location: default_warning(),
            matching: default_error(),
            naming: default_warning(),
            structure: default_error(),
        }
    }
}

/// Rule set of one category (or of the root document).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryRuleDto {
    /// File name glob used when a document carries no category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// `any`, `root_only` or `subdirs_only`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,

    /// Report headers that skip levels.
    #[serde(default, skip_serializing_if = "is_false")]
    pub flag_level_jumps: bool,

    /// Order constraints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<OrderDto>,

    /// Location constraints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub location: Vec<LocationDto>,

    /// Presence/absence constraints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<MatchDto>,
}

/// Header identity: exactly one of `text` or `pattern`, plus optional level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeaderDto {
    /// Literal header text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Regular expression matched against the full header text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Header level (1-6).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

impl HeaderDto {
    fn text(text: &str, level: Option<u8>) -> Self {
        Self {
            text: Some(text.to_string()),
            pattern: None,
            level,
        }
    }
}

/// An order constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDto {
    /// Level whose headers are ordered.
    pub level: u8,
    /// Expected headers (level fields are ignored).
    pub headers: Vec<HeaderDto>,
    /// Require exact equality instead of a subsequence.
    #[serde(default, skip_serializing_if = "is_false")]
    pub strict: bool,
    /// Severity override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

/// A location constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationDto {
    /// Constrained header.
    pub header: HeaderDto,
    /// Constraint kind and its parameters.
    #[serde(flatten)]
    pub kind: LocationKindDto,
    /// Severity override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

/// Location constraint kinds, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocationKindDto {
    /// Header must not be nested.
    TopLevel,
    /// Header must be nested directly under `parent`.
    Parent {
        /// Expected parent header text.
        parent: HeaderDto,
    },
    /// Header depth (top-level = 0) must be within or outside a range.
    Depth {
        /// Lower bound (inclusive).
        #[serde(default)]
        min: usize,
        /// Upper bound (inclusive), unbounded when absent.
        #[serde(default)]
        max: Option<usize>,
        /// The range is forbidden instead of required.
        #[serde(default)]
        forbidden: bool,
        /// Report violations as errors by default.
        #[serde(default)]
        fatal: bool,
    },
}

/// A presence/absence constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDto {
    /// Header identity.
    pub header: HeaderDto,
    /// Whether the header is required or forbidden.
    #[serde(default)]
    pub presence: PresenceDto,
    /// Severity override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

/// Presence of a matched header.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceDto {
    /// Must be present.
    #[default]
    Required,
    /// Must be absent.
    Forbidden,
}

fn default_feature_category() -> CategoryRuleDto {
    CategoryRuleDto {
        filename: Some("feature_*.md".to_string()),
        placement: Some("subdirs_only".to_string()),
        order: vec![OrderDto {
            level: 2,
            headers: vec![
                HeaderDto::text("Overview", None),
                HeaderDto::text("Requirements", None),
            ],
            strict: false,
            severity: None,
        }],
        headers: vec![
            MatchDto {
                header: HeaderDto::text("Overview", Some(2)),
                presence: PresenceDto::Required,
                severity: None,
            },
            MatchDto {
                header: HeaderDto::text("Requirements", Some(2)),
                presence: PresenceDto::Required,
                severity: None,
            },
        ],
        ..CategoryRuleDto::default()
    }
}

fn default_tech_category() -> CategoryRuleDto {
    CategoryRuleDto {
        filename: Some("tech_*.md".to_string()),
        placement: Some("subdirs_only".to_string()),
        location: vec![LocationDto {
            header: HeaderDto::text("Implementation Details", Some(2)),
            kind: LocationKindDto::Depth {
                min: 0,
                max: Some(1),
                forbidden: false,
                fatal: false,
            },
            severity: None,
        }],
        headers: vec![MatchDto {
            header: HeaderDto::text("Technical Details", Some(2)),
            presence: PresenceDto::Required,
            severity: None,
        }],
        ..CategoryRuleDto::default()
    }
}

fn default_version() -> u32 {
    1
}

fn default_detect_pattern() -> String {
    "project_*.md".to_string()
}

fn default_true() -> bool {
    true
}

fn default_error() -> String {
    "error".to_string()
}

fn default_warning() -> String {
    "warning".to_string()
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if passes &T
fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_empty_object() {
        let dto: SettingsDto = serde_json::from_str("{}").unwrap();
        assert_eq!(dto.version, 1);
        assert_eq!(dto.root.detect_pattern, "project_*.md");
        assert!(dto.categories.is_empty());
        assert!(dto.collector.respect_gitignore);
        assert_eq!(dto.defaults.naming, "warning");
    }

    #[test]
    fn deserialize_full_json() {
        let json = r#"{
            "version": 1,
            "root": {
                "detect_pattern": "index_*.md",
                "headers": [{ "header": { "text": "Overview", "level": 1 } }]
            },
            "categories": {
                "adr": {
                    "filename": "adr_*.md",
                    "order": [{
                        "level": 2,
                        "headers": [{ "text": "Context" }, { "pattern": "Decision.*" }],
                        "strict": true
                    }],
                    "location": [
                        { "header": { "text": "Status" }, "kind": "top_level" },
                        { "header": { "text": "Notes" }, "kind": "parent", "parent": { "text": "Context" } },
                        { "header": { "text": "Aside" }, "kind": "depth", "min": 2, "forbidden": true, "fatal": true }
                    ],
                    "headers": [{ "header": { "text": "TODO" }, "presence": "forbidden", "severity": "warning" }]
                }
            }
        }"#;
        let dto: SettingsDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.root.detect_pattern, "index_*.md");
        assert_eq!(dto.root.rule.headers.len(), 1);

        let adr = &dto.categories["adr"];
        assert_eq!(adr.order[0].headers.len(), 2);
        assert!(adr.order[0].strict);
        assert!(matches!(adr.location[0].kind, LocationKindDto::TopLevel));
        assert!(matches!(&adr.location[1].kind, LocationKindDto::Parent { parent } if parent.text.as_deref() == Some("Context")));
        assert!(matches!(
            adr.location[2].kind,
            LocationKindDto::Depth { min: 2, max: None, forbidden: true, fatal: true }
        ));
        assert!(matches!(adr.headers[0].presence, PresenceDto::Forbidden));
        assert_eq!(adr.headers[0].severity.as_deref(), Some("warning"));
    }

    #[test]
    fn deserialize_toml() {
        let toml_str = r#"
[root]
detect_pattern = "project_*.md"

[categories.adr]
filename = "adr_*.md"

[[categories.adr.order]]
level = 2
headers = [{ text = "Context" }, { text = "Decision" }]

[[categories.adr.location]]
header = { text = "Status" }
kind = "top_level"
"#;
        let dto: SettingsDto = toml::from_str(toml_str).unwrap();
        let adr = &dto.categories["adr"];
        assert_eq!(adr.order[0].level, 2);
        assert!(matches!(adr.location[0].kind, LocationKindDto::TopLevel));
    }

    #[test]
    fn default_settings_round_trip_through_json() {
        let json = serde_json::to_string_pretty(&SettingsDto::default()).unwrap();
        let dto: SettingsDto = serde_json::from_str(&json).unwrap();
        assert_eq!(dto.categories.len(), 2);
        assert!(dto.categories.contains_key("feature"));
        assert_eq!(dto.root.rule.headers.len(), 1);
    }
}
