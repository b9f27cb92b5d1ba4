//! # moff-core
//!
//! Header-structure linting for markdown documentation trees.
//!
//! This crate provides:
//!
//! - [`Settings`] for loading the declarative rule configuration
//! - [`Collector`] for finding the documentation root and parsing outlines
//! - [`RuleEngine`] for checking outlines against the configuration
//! - [`DiagnosticReport`] for the sorted, deduplicated findings
//!
//! ## Example
//!
//! ```ignore
//! use moff_core::{Collector, RuleEngine, Settings};
//!
//! let settings = Settings::from_file(Path::new("docs/settings.json"))?;
//! let collection = Collector::new(&settings).collect(Path::new("docs"))?;
//! let report = RuleEngine::new(settings.rules()).check(collection.outlines());
//!
//! for diagnostic in report.diagnostics() {
//!     println!("{diagnostic}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod collector;
pub mod engine;
pub mod markdown;
pub mod outline;
pub mod settings;
mod types;

pub use collector::{CollectError, Collection, Collector};
pub use engine::{check, rule_ids, RuleEngine};
pub use outline::{DocumentOutline, Header, HeaderLevel, HeaderTree, OutlineError};
pub use settings::{RuleConfiguration, Settings, SettingsError};
pub use types::{Diagnostic, DiagnosticReport, RuleCategory, Severity};
