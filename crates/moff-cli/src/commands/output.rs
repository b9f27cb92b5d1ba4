//! Shared output formatting for check reports.

use anyhow::{Context, Result};
use moff_core::{DiagnosticReport, Severity};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::OutputFormat;

/// File written by `check --save`, relative to the documentation root.
pub const RESULTS_FILE_NAME: &str = "moff_results.txt";

/// Print a report in the specified format.
pub fn print(report: &DiagnosticReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(report, true)),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

/// Renders the report grouped by file, optionally with ANSI colors.
pub fn render_text(report: &DiagnosticReport, color: bool) -> String {
    let mut out = String::new();

    if report.is_empty() {
        let _ = writeln!(
            out,
            "{} ({} document(s) checked)",
            paint("✓ All checks passed", "\x1b[32m", color),
            report.documents_checked()
        );
        return out;
    }

    let (errors, warnings, infos) = report.count_by_severity();
    let _ = writeln!(
        out,
        "Validation summary: {} issue(s) in {} document(s)",
        report.len(),
        report.documents_checked()
    );
    for (count, label, code) in [
        (errors, "errors", "\x1b[31m"),
        (warnings, "warnings", "\x1b[33m"),
        (infos, "info", "\x1b[34m"),
    ] {
        if count > 0 {
            let _ = writeln!(out, "  {}", paint(&format!("{label}: {count}"), code, color));
        }
    }

    for (path, diagnostics) in report.grouped_by_path() {
        let heading = path.map_or_else(|| "[root]".to_string(), |p| p.display().to_string());
        let _ = writeln!(out, "\n{}", paint(&format!("{heading}:"), "\x1b[36m", color));
        for diagnostic in diagnostics {
            let severity = diagnostic.severity().to_string();
            let code = match diagnostic.severity() {
                Severity::Error => "\x1b[31m",
                Severity::Warning => "\x1b[33m",
                Severity::Info => "\x1b[34m",
            };
            // `format()` starts with the severity; recolor just that word.
            let formatted = diagnostic.format();
            let rest = &formatted[severity.len()..];
            let _ = writeln!(out, "  {}{rest}", paint(&severity, code, color));
        }
    }

    out
}

fn paint(text: &str, code: &str, color: bool) -> String {
    if color {
        format!("{code}{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

fn print_json(report: &DiagnosticReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &DiagnosticReport) {
    for diagnostic in report.diagnostics() {
        println!("{diagnostic}");
    }
}

/// Writes the uncolored text report to `moff_results.txt` in `root_dir`.
pub fn save(report: &DiagnosticReport, root_dir: &Path) -> Result<PathBuf> {
    let path = root_dir.join(RESULTS_FILE_NAME);
    let content = format!(
        "moff check results for {}\n\n{}",
        root_dir.display(),
        render_text(report, false)
    );
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write results: {}", path.display()))?;
    Ok(path)
}
