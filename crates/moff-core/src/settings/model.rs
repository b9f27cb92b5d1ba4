//! Pure domain model for header structure rules.
//!
//! This module contains no serde and no I/O dependencies.
//! Invariants are enforced at construction time via validated newtypes,
//! with one deliberate exception: regular expressions that fail to compile
//! are kept in the model and reported per document by the engine.

use crate::outline::{Header, HeaderLevel, OutlineError};
use crate::types::Severity;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

// ────────────────────────────────────────────
// Newtypes with validation
// ────────────────────────────────────────────

/// A header text regular expression, anchored to the full header text.
#[derive(Debug, Clone)]
pub struct HeaderRegex {
    raw: String,
    compiled: Result<Regex, String>,
}

impl HeaderRegex {
    fn compile(raw: &str) -> Self {
        let compiled = Regex::new(&format!("^(?:{raw})$")).map_err(|e| e.to_string());
        Self {
            raw: raw.to_string(),
            compiled,
        }
    }

    /// Returns the pattern as written in the configuration.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the compile error, if the pattern is invalid.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.compiled.as_ref().err().map(String::as_str)
    }
}

impl PartialEq for HeaderRegex {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for HeaderRegex {}

/// Expected header text: a literal or an anchored regular expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderText {
    /// Case-sensitive full-text comparison.
    Literal(String),
    /// Regular expression matched against the full header text.
    Pattern(HeaderRegex),
}

impl HeaderText {
    /// Creates a literal header text.
    ///
    /// # Errors
    ///
    /// Returns error if the text is empty.
    pub fn literal(text: &str) -> Result<Self, ModelError> {
        if text.is_empty() {
            return Err(ModelError::EmptyHeaderText);
        }
        Ok(Self::Literal(text.to_string()))
    }

    /// Creates a pattern header text.
    ///
    /// Invalid regular expressions are accepted here and surface as
    /// diagnostics when a document is checked.
    ///
    /// # Errors
    ///
    /// Returns error if the pattern is empty.
    pub fn pattern(pattern: &str) -> Result<Self, ModelError> {
        if pattern.is_empty() {
            return Err(ModelError::EmptyHeaderText);
        }
        Ok(Self::Pattern(HeaderRegex::compile(pattern)))
    }

    /// Tests whether a header text matches. Invalid patterns never match.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::Literal(expected) => expected == text,
            Self::Pattern(regex) => regex
                .compiled
                .as_ref()
                .is_ok_and(|compiled| compiled.is_match(text)),
        }
    }

    /// Returns the invalid pattern and its error, if this text cannot match.
    #[must_use]
    pub fn invalid_pattern(&self) -> Option<(&str, &str)> {
        match self {
            Self::Literal(_) => None,
            Self::Pattern(regex) => regex.error().map(|e| (regex.as_str(), e)),
        }
    }
}

impl fmt::Display for HeaderText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write!(f, "'{text}'"),
            Self::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// Header identity: expected text plus an optional level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPattern {
    text: HeaderText,
    level: Option<HeaderLevel>,
}

impl HeaderPattern {
    /// Creates a header identity.
    #[must_use]
    pub fn new(text: HeaderText, level: Option<HeaderLevel>) -> Self {
        Self { text, level }
    }

    /// Returns the expected text.
    #[must_use]
    pub fn text(&self) -> &HeaderText {
        &self.text
    }

    /// Returns the required level, if any.
    #[must_use]
    pub fn level(&self) -> Option<HeaderLevel> {
        self.level
    }

    /// Tests whether a header has this identity.
    #[must_use]
    pub fn matches(&self, header: &Header) -> bool {
        self.level.map_or(true, |level| level == header.level()) && self.text.matches(header.text())
    }
}

impl fmt::Display for HeaderPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            Some(level) => write!(f, "{} (level {level})", self.text),
            None => write!(f, "{}", self.text),
        }
    }
}

/// A validated glob pattern for file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenamePattern {
    raw: String,
    compiled: glob::Pattern,
}

impl FilenamePattern {
    /// Creates a new file name pattern.
    ///
    /// # Errors
    ///
    /// Returns error if the pattern is empty or has invalid glob syntax.
    pub fn new(pattern: &str) -> Result<Self, ModelError> {
        if pattern.is_empty() {
            return Err(ModelError::EmptyGlobPattern);
        }
        let compiled = glob::Pattern::new(pattern).map_err(|e| ModelError::InvalidGlobPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            compiled,
        })
    }

    /// Tests whether a file name matches this pattern.
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        self.compiled.matches(file_name)
    }

    /// Returns the pattern as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

// ────────────────────────────────────────────
// Rule kinds
// ────────────────────────────────────────────

/// Expected order of headers at one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOrder {
    level: HeaderLevel,
    headers: Vec<HeaderText>,
    strict: bool,
    severity: Option<Severity>,
}

impl HeaderOrder {
    /// Creates an order constraint.
    ///
    /// # Errors
    ///
    /// Returns error if the expected sequence is empty.
    pub fn new(
        level: HeaderLevel,
        headers: Vec<HeaderText>,
        strict: bool,
        severity: Option<Severity>,
    ) -> Result<Self, ModelError> {
        if headers.is_empty() {
            return Err(ModelError::EmptyOrder);
        }
        Ok(Self {
            level,
            headers,
            strict,
            severity,
        })
    }

    /// Returns the level the constraint applies to.
    #[must_use]
    pub fn level(&self) -> HeaderLevel {
        self.level
    }

    /// Returns the expected sequence.
    #[must_use]
    pub fn headers(&self) -> &[HeaderText] {
        &self.headers
    }

    /// Returns true if extra headers at this level are rejected.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Returns the severity override.
    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        self.severity
    }
}

/// Allowed or forbidden nesting depths (top-level header = depth 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthRange {
    min: usize,
    max: Option<usize>,
    forbidden: bool,
    fatal: bool,
}

impl DepthRange {
    /// Creates a depth range.
    ///
    /// With `forbidden` set the header must lie *outside* `min..=max`,
    /// otherwise inside it. `fatal` raises the default severity to error.
    ///
    /// # Errors
    ///
    /// Returns error if `max < min`.
    pub fn new(
        min: usize,
        max: Option<usize>,
        forbidden: bool,
        fatal: bool,
    ) -> Result<Self, ModelError> {
        if let Some(max) = max {
            if max < min {
                return Err(ModelError::InvertedDepthRange { min, max });
            }
        }
        Ok(Self {
            min,
            max,
            forbidden,
            fatal,
        })
    }

    /// Returns true if `depth` lies in `min..=max`.
    #[must_use]
    pub fn contains(&self, depth: usize) -> bool {
        depth >= self.min && self.max.map_or(true, |max| depth <= max)
    }

    /// Returns true if `depth` satisfies the constraint.
    #[must_use]
    pub fn permits(&self, depth: usize) -> bool {
        self.contains(depth) != self.forbidden
    }

    /// Returns true if the range is a forbidden range.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        self.forbidden
    }

    /// Returns true if violations default to error severity.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.fatal
    }
}

impl fmt::Display for DepthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", self.min),
            Some(max) => write!(f, "{}..={max}", self.min),
            None => write!(f, "{}..", self.min),
        }
    }
}

/// Structural position a header must have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationKind {
    /// The header must have no parent.
    TopLevel,
    /// The header's immediate parent must match this text.
    Parent(HeaderText),
    /// The header's depth must satisfy the range.
    Depth(DepthRange),
}

/// A location constraint bound to a header identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationConstraint {
    header: HeaderPattern,
    kind: LocationKind,
    severity: Option<Severity>,
}

impl LocationConstraint {
    /// Creates a location constraint.
    #[must_use]
    pub fn new(header: HeaderPattern, kind: LocationKind, severity: Option<Severity>) -> Self {
        Self {
            header,
            kind,
            severity,
        }
    }

    /// Returns the constrained header identity.
    #[must_use]
    pub fn header(&self) -> &HeaderPattern {
        &self.header
    }

    /// Returns the constraint kind.
    #[must_use]
    pub fn kind(&self) -> &LocationKind {
        &self.kind
    }

    /// Returns the severity override.
    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        self.severity
    }
}

/// Whether a matched header must be present or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// At least one matching header must exist.
    Required,
    /// No matching header may exist.
    Forbidden,
}

/// A presence/absence constraint independent of order and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    header: HeaderPattern,
    presence: Presence,
    severity: Option<Severity>,
}

impl HeaderMatch {
    /// Creates a match constraint.
    #[must_use]
    pub fn new(header: HeaderPattern, presence: Presence, severity: Option<Severity>) -> Self {
        Self {
            header,
            presence,
            severity,
        }
    }

    /// Returns the header identity.
    #[must_use]
    pub fn header(&self) -> &HeaderPattern {
        &self.header
    }

    /// Returns whether the header is required or forbidden.
    #[must_use]
    pub fn presence(&self) -> Presence {
        self.presence
    }

    /// Returns the severity override.
    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        self.severity
    }
}

/// Where the files of a category may live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Placement {
    /// Anywhere below the documentation root.
    #[default]
    Any,
    /// Only directly in the documentation root directory.
    RootOnly,
    /// Only in subdirectories of the documentation root.
    SubdirsOnly,
}

impl Placement {
    /// Tests whether a file with the given location is allowed.
    #[must_use]
    pub fn allows(self, in_root_dir: bool) -> bool {
        match self {
            Self::Any => true,
            Self::RootOnly => in_root_dir,
            Self::SubdirsOnly => !in_root_dir,
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::RootOnly => write!(f, "root_only"),
            Self::SubdirsOnly => write!(f, "subdirs_only"),
        }
    }
}

/// The rule set bound to one naming category or to the root document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryRule {
    filename: Option<FilenamePattern>,
    placement: Placement,
    flag_level_jumps: bool,
    orders: Vec<HeaderOrder>,
    locations: Vec<LocationConstraint>,
    matches: Vec<HeaderMatch>,
}

impl CategoryRule {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the file name pattern used when a document has no category.
    #[must_use]
    pub fn with_filename(mut self, pattern: FilenamePattern) -> Self {
        self.filename = Some(pattern);
        self
    }

    /// Sets the allowed file placement.
    #[must_use]
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Enables reporting of header level jumps.
    #[must_use]
    pub fn with_level_jumps_flagged(mut self, flag: bool) -> Self {
        self.flag_level_jumps = flag;
        self
    }

    /// Adds an order constraint.
    #[must_use]
    pub fn with_order(mut self, order: HeaderOrder) -> Self {
        self.orders.push(order);
        self
    }

    /// Adds a location constraint.
    #[must_use]
    pub fn with_location(mut self, location: LocationConstraint) -> Self {
        self.locations.push(location);
        self
    }

    /// Adds a match constraint.
    #[must_use]
    pub fn with_match(mut self, header_match: HeaderMatch) -> Self {
        self.matches.push(header_match);
        self
    }

    /// Returns the file name pattern.
    #[must_use]
    pub fn filename(&self) -> Option<&FilenamePattern> {
        self.filename.as_ref()
    }

    /// Returns the allowed file placement.
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Returns true if level jumps are reported.
    #[must_use]
    pub fn flags_level_jumps(&self) -> bool {
        self.flag_level_jumps
    }

    /// Returns the order constraints.
    #[must_use]
    pub fn orders(&self) -> &[HeaderOrder] {
        &self.orders
    }

    /// Returns the location constraints.
    #[must_use]
    pub fn locations(&self) -> &[LocationConstraint] {
        &self.locations
    }

    /// Returns the match constraints.
    #[must_use]
    pub fn matches(&self) -> &[HeaderMatch] {
        &self.matches
    }

    /// Iterates over every header text referenced by this rule set.
    pub fn header_texts(&self) -> impl Iterator<Item = &HeaderText> {
        let orders = self.orders.iter().flat_map(|o| o.headers.iter());
        let locations = self.locations.iter().flat_map(|l| {
            let parent = match &l.kind {
                LocationKind::Parent(parent) => Some(parent),
                LocationKind::TopLevel | LocationKind::Depth(_) => None,
            };
            std::iter::once(l.header.text()).chain(parent)
        });
        let matches = self.matches.iter().map(|m| m.header.text());
        orders.chain(locations).chain(matches)
    }
}

/// Default severities, applied when a constraint has no override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityDefaults {
    /// Order violations.
    pub order: Severity,
    /// Top-level, parent, and placement violations.
    pub location: Severity,
    /// Depth range and level jump violations.
    pub soft_location: Severity,
    /// Required/forbidden header and invalid pattern violations.
    pub matching: Severity,
    /// Unresolved categories.
    pub naming: Severity,
    /// Ambiguous categories.
    pub structure: Severity,
}

impl Default for SeverityDefaults {
    fn default() -> Self {
        Self {
            order: Severity::Error,
            location: Severity::Error,
            soft_location: Severity::Warning,
            matching: Severity::Error,
            naming: Severity::Warning,
            structure: Severity::Error,
        }
    }
}

// ────────────────────────────────────────────
// Aggregate root
// ────────────────────────────────────────────

/// Validated rule configuration.
///
/// This is the aggregate root the engine reads from; it is never mutated
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleConfiguration {
    version: u32,
    root: CategoryRule,
    categories: BTreeMap<String, CategoryRule>,
    defaults: SeverityDefaults,
}

impl RuleConfiguration {
    /// Creates a rule configuration with full validation.
    ///
    /// # Errors
    ///
    /// Returns all empty or duplicate category names.
    pub fn new(
        version: u32,
        root: CategoryRule,
        categories: Vec<(String, CategoryRule)>,
        defaults: SeverityDefaults,
    ) -> Result<Self, Vec<ModelError>> {
        let mut map = BTreeMap::new();
        let mut errors = Vec::new();

        for (name, rule) in categories {
            if name.is_empty() {
                errors.push(ModelError::EmptyCategoryName);
                continue;
            }
            if map.contains_key(&name) {
                errors.push(ModelError::DuplicateCategory { name });
                continue;
            }
            map.insert(name, rule);
        }

        if errors.is_empty() {
            Ok(Self {
                version,
                root,
                categories: map,
                defaults,
            })
        } else {
            Err(errors)
        }
    }

    /// Returns the configuration format version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns the rule set of the root document.
    #[must_use]
    pub fn root_rule(&self) -> &CategoryRule {
        &self.root
    }

    /// Looks up a category by exact, case-sensitive name.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&CategoryRule> {
        self.categories.get(name)
    }

    /// Iterates over categories in name order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &CategoryRule)> {
        self.categories.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    /// Returns the category names in name order.
    #[must_use]
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    /// Returns the categories whose file name pattern matches `file_name`.
    #[must_use]
    pub fn categories_for_filename(&self, file_name: &str) -> Vec<(&str, &CategoryRule)> {
        self.categories()
            .filter(|(_, rule)| rule.filename().is_some_and(|p| p.matches(file_name)))
            .collect()
    }

    /// Returns the severity defaults.
    #[must_use]
    pub fn defaults(&self) -> &SeverityDefaults {
        &self.defaults
    }
}

// ────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────

/// Errors in domain model construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Header text or pattern is empty.
    #[error("header text must not be empty")]
    EmptyHeaderText,

    /// Order constraint without expected headers.
    #[error("header order must list at least one header")]
    EmptyOrder,

    /// Depth range with `max < min`.
    #[error("invalid depth range: max {max} is smaller than min {min}")]
    InvertedDepthRange {
        /// Lower bound.
        min: usize,
        /// Upper bound.
        max: usize,
    },

    /// Glob pattern is empty.
    #[error("glob pattern must not be empty")]
    EmptyGlobPattern,

    /// Glob pattern has invalid syntax.
    #[error("invalid glob pattern `{pattern}`: {reason}")]
    InvalidGlobPattern {
        /// The invalid pattern.
        pattern: String,
        /// Why it's invalid.
        reason: String,
    },

    /// Category name is empty.
    #[error("category name must not be empty")]
    EmptyCategoryName,

    /// Category name appears twice.
    #[error("duplicate category `{name}`")]
    DuplicateCategory {
        /// The repeated name.
        name: String,
    },

    /// Header level is out of range.
    #[error(transparent)]
    Outline(#[from] OutlineError),
}

// ────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────
