//! DTO → Domain model conversion with validation.

use crate::outline::HeaderLevel;
use crate::types::Severity;

use super::config_dto::{
    CategoryRuleDto, CollectorDto, DefaultsDto, HeaderDto, LocationDto, LocationKindDto, MatchDto,
    OrderDto, PresenceDto, RootDto, SettingsDto,
};
use super::model::{
    CategoryRule, DepthRange, FilenamePattern, HeaderMatch, HeaderOrder, HeaderPattern,
    HeaderText, LocationConstraint, LocationKind, ModelError, Placement, Presence,
    RuleConfiguration, SeverityDefaults,
};
use super::{CollectorSettings, RootSettings, Settings};

/// Errors during DTO → Domain conversion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A field-level validation error.
    #[error("{context}: {source}")]
    Validation {
        /// Where the error occurred (e.g., "categories.adr.order[0]").
        context: String,
        /// The underlying model error.
        source: ModelError,
    },

    /// The `text` and `pattern` fields are both set or both missing.
    #[error("{context}: exactly one of `text` or `pattern` must be set")]
    AmbiguousHeader {
        /// Where the header was declared.
        context: String,
    },

    /// Unknown severity string.
    #[error("{context}: unknown severity `{value}`, expected: error, warning, info")]
    UnknownSeverity {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Unknown placement string.
    #[error("{context}: unknown placement `{value}`, expected: any, root_only, subdirs_only")]
    UnknownPlacement {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Cross-reference errors from aggregate root construction.
    #[error("configuration validation errors:\n{}", format_errors(.0))]
    CrossRef(Vec<ModelError>),
}

fn format_errors(errors: &[ModelError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Converts a `SettingsDto` to validated `Settings`.
///
/// # Errors
///
/// Returns the first error encountered during conversion.
pub fn load(dto: SettingsDto) -> Result<Settings, LoadError> {
    let defaults = convert_defaults(&dto.defaults)?;
    let (root, root_rule) = convert_root(dto.root)?;
    let collector = convert_collector(dto.collector)?;

    let categories = dto
        .categories
        .into_iter()
        .map(|(name, rule)| {
            let rule = convert_rule(rule, &format!("categories.{name}"))?;
            Ok((name, rule))
        })
        .collect::<Result<Vec<_>, LoadError>>()?;

    let rules = RuleConfiguration::new(dto.version, root_rule, categories, defaults)
        .map_err(LoadError::CrossRef)?;

    warn_invalid_patterns(&rules);

    Ok(Settings {
        rules,
        root,
        collector,
    })
}

fn warn_invalid_patterns(rules: &RuleConfiguration) {
    let scopes = std::iter::once(("root", rules.root_rule())).chain(rules.categories());
    for (scope, rule) in scopes {
        for (raw, reason) in rule.header_texts().filter_map(HeaderText::invalid_pattern) {
            tracing::warn!("{scope}: header pattern `{raw}` is invalid: {reason}");
        }
    }
}

fn convert_root(dto: RootDto) -> Result<(RootSettings, CategoryRule), LoadError> {
    let detect_pattern =
        FilenamePattern::new(&dto.detect_pattern).map_err(|e| LoadError::Validation {
            context: "root.detect_pattern".to_string(),
            source: e,
        })?;
    let rule = convert_rule(dto.rule, "root")?;
    Ok((
        RootSettings {
            detect_pattern,
            override_path: dto.override_path,
        },
        rule,
    ))
}

fn convert_collector(dto: CollectorDto) -> Result<CollectorSettings, LoadError> {
    let exclude = dto
        .exclude
        .iter()
        .enumerate()
        .map(|(i, p)| {
            glob::Pattern::new(p).map_err(|e| LoadError::Validation {
                context: format!("collector.exclude[{i}]"),
                source: ModelError::InvalidGlobPattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                },
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CollectorSettings {
        exclude,
        respect_gitignore: dto.respect_gitignore,
    })
}

fn convert_defaults(dto: &DefaultsDto) -> Result<SeverityDefaults, LoadError> {
    Ok(SeverityDefaults {
        order: parse_severity(&dto.order, "defaults.order")?,
        location: parse_severity(&dto.location, "defaults.location")?,
        soft_location: parse_severity(&dto.soft_location, "defaults.soft_location")?,
        matching: parse_severity(&dto.matching, "defaults.match")?,
        naming: parse_severity(&dto.naming, "defaults.naming")?,
        structure: parse_severity(&dto.structure, "defaults.structure")?,
    })
}

fn convert_rule(dto: CategoryRuleDto, ctx: &str) -> Result<CategoryRule, LoadError> {
    let mut rule = CategoryRule::new().with_level_jumps_flagged(dto.flag_level_jumps);

    if let Some(pattern) = &dto.filename {
        let filename = FilenamePattern::new(pattern).map_err(|e| LoadError::Validation {
            context: format!("{ctx}.filename"),
            source: e,
        })?;
        rule = rule.with_filename(filename);
    }

    if let Some(placement) = &dto.placement {
        rule = rule.with_placement(parse_placement(placement, &format!("{ctx}.placement"))?);
    }

    for (i, order) in dto.order.into_iter().enumerate() {
        rule = rule.with_order(convert_order(order, &format!("{ctx}.order[{i}]"))?);
    }
    for (i, location) in dto.location.into_iter().enumerate() {
        rule = rule.with_location(convert_location(location, &format!("{ctx}.location[{i}]"))?);
    }
    for (i, header_match) in dto.headers.into_iter().enumerate() {
        rule = rule.with_match(convert_match(header_match, &format!("{ctx}.headers[{i}]"))?);
    }

    Ok(rule)
}

fn convert_order(dto: OrderDto, ctx: &str) -> Result<HeaderOrder, LoadError> {
    let level = parse_level(dto.level, &format!("{ctx}.level"))?;
    let headers = dto
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| convert_text(h, &format!("{ctx}.headers[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;
    let severity = parse_optional_severity(dto.severity.as_deref(), ctx)?;

    HeaderOrder::new(level, headers, dto.strict, severity).map_err(|e| LoadError::Validation {
        context: ctx.to_string(),
        source: e,
    })
}

fn convert_location(dto: LocationDto, ctx: &str) -> Result<LocationConstraint, LoadError> {
    let header = convert_header(&dto.header, &format!("{ctx}.header"))?;
    let kind = match dto.kind {
        LocationKindDto::TopLevel => LocationKind::TopLevel,
        LocationKindDto::Parent { parent } => {
            LocationKind::Parent(convert_text(&parent, &format!("{ctx}.parent"))?)
        }
        LocationKindDto::Depth {
            min,
            max,
            forbidden,
            fatal,
        } => LocationKind::Depth(DepthRange::new(min, max, forbidden, fatal).map_err(|e| {
            LoadError::Validation {
                context: ctx.to_string(),
                source: e,
            }
        })?),
    };
    let severity = parse_optional_severity(dto.severity.as_deref(), ctx)?;
    Ok(LocationConstraint::new(header, kind, severity))
}

fn convert_match(dto: MatchDto, ctx: &str) -> Result<HeaderMatch, LoadError> {
    let header = convert_header(&dto.header, &format!("{ctx}.header"))?;
    let presence = match dto.presence {
        PresenceDto::Required => Presence::Required,
        PresenceDto::Forbidden => Presence::Forbidden,
    };
    let severity = parse_optional_severity(dto.severity.as_deref(), ctx)?;
    Ok(HeaderMatch::new(header, presence, severity))
}

fn convert_header(dto: &HeaderDto, ctx: &str) -> Result<HeaderPattern, LoadError> {
    let text = convert_text(dto, ctx)?;
    let level = dto
        .level
        .map(|level| parse_level(level, &format!("{ctx}.level")))
        .transpose()?;
    Ok(HeaderPattern::new(text, level))
}

fn convert_text(dto: &HeaderDto, ctx: &str) -> Result<HeaderText, LoadError> {
    let result = match (&dto.text, &dto.pattern) {
        (Some(text), None) => HeaderText::literal(text),
        (None, Some(pattern)) => HeaderText::pattern(pattern),
        _ => {
            return Err(LoadError::AmbiguousHeader {
                context: ctx.to_string(),
            })
        }
    };
    result.map_err(|e| LoadError::Validation {
        context: ctx.to_string(),
        source: e,
    })
}

fn parse_level(level: u8, ctx: &str) -> Result<HeaderLevel, LoadError> {
    HeaderLevel::new(level).map_err(|e| LoadError::Validation {
        context: ctx.to_string(),
        source: e.into(),
    })
}

fn parse_severity(s: &str, ctx: &str) -> Result<Severity, LoadError> {
    Severity::from_token(s).ok_or_else(|| LoadError::UnknownSeverity {
        context: ctx.to_string(),
        value: s.to_string(),
    })
}

fn parse_optional_severity(s: Option<&str>, ctx: &str) -> Result<Option<Severity>, LoadError> {
    s.map(|s| parse_severity(s, &format!("{ctx}.severity")))
        .transpose()
}

fn parse_placement(s: &str, ctx: &str) -> Result<Placement, LoadError> {
    match s {
        "any" => Ok(Placement::Any),
        "root_only" => Ok(Placement::RootOnly),
        "subdirs_only" => Ok(Placement::SubdirsOnly),
        _ => Err(LoadError::UnknownPlacement {
            context: ctx.to_string(),
            value: s.to_string(),
        }),
    }
}
