//! Tree command implementation.

use anyhow::{Context, Result};
use moff_core::{Collector, DiagnosticReport, DocumentOutline, RuleEngine, Severity};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::settings_source::SettingsSource;

/// Runs the tree command. Always exits 0 once the tree is rendered.
pub fn run(path: &Path, validate: bool, errors_only: bool, source: &SettingsSource) -> Result<i32> {
    let settings = source.load()?;

    let collection = Collector::new(&settings)
        .collect(path)
        .context("Failed to collect documentation")?;

    let report = validate.then(|| RuleEngine::new(settings.rules()).check(collection.outlines()));

    let label = collection.root_dir().display().to_string();
    print!(
        "{}",
        render(&label, collection.outlines(), report.as_ref(), errors_only)
    );
    Ok(0)
}

#[derive(Default)]
struct DirNode<'a> {
    dirs: BTreeMap<String, DirNode<'a>>,
    files: Vec<FileEntry<'a>>,
}

struct FileEntry<'a> {
    name: String,
    outline: &'a DocumentOutline,
    errors: usize,
    warnings: usize,
}

impl DirNode<'_> {
    fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.values().all(DirNode::is_empty)
    }
}

/// Renders outlines as a directory tree, annotated with diagnostic counts
/// when a report is given.
pub fn render(
    label: &str,
    outlines: &[DocumentOutline],
    report: Option<&DiagnosticReport>,
    errors_only: bool,
) -> String {
    let mut root = DirNode::default();

    for outline in outlines {
        let (errors, warnings) = report.map_or((0, 0), |r| {
            let diagnostics = r.for_path(outline.path());
            let count = |s: Severity| diagnostics.iter().filter(|d| d.severity() == s).count();
            (count(Severity::Error), count(Severity::Warning))
        });
        if errors_only && errors == 0 {
            continue;
        }

        let mut components: Vec<String> = outline
            .path()
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let Some(name) = components.pop() else {
            continue;
        };

        let mut node = &mut root;
        for dir in components {
            node = node.dirs.entry(dir).or_default();
        }
        node.files.push(FileEntry {
            name,
            outline,
            errors,
            warnings,
        });
    }

    let mut out = String::new();
    let _ = writeln!(out, "{label}/");
    render_dir(&root, "", report.is_some(), &mut out);

    if let Some(report) = report {
        let (errors, warnings, _) = report.count_by_severity();
        let _ = writeln!(
            out,
            "\n{errors} error(s), {warnings} warning(s) in {} document(s)",
            report.documents_checked()
        );
    }
    out
}

enum Entry<'n, 'a> {
    Dir(&'n str, &'n DirNode<'a>),
    File(&'n FileEntry<'a>),
}

fn render_dir(node: &DirNode<'_>, prefix: &str, checked: bool, out: &mut String) {
    let mut files: Vec<&FileEntry<'_>> = node.files.iter().collect();
    files.sort_by(|a, b| a.name.cmp(&b.name));

    let entries: Vec<Entry<'_, '_>> = node
        .dirs
        .iter()
        .filter(|(_, child)| !child.is_empty())
        .map(|(name, child)| Entry::Dir(name.as_str(), child))
        .chain(files.into_iter().map(Entry::File))
        .collect();

    let count = entries.len();
    for (index, entry) in entries.into_iter().enumerate() {
        let last = index + 1 == count;
        let connector = if last { "└── " } else { "├── " };
        match entry {
            Entry::Dir(name, child) => {
                let _ = writeln!(out, "{prefix}{connector}{name}/");
                let nested = format!("{prefix}{}", if last { "    " } else { "│   " });
                render_dir(child, &nested, checked, out);
            }
            Entry::File(file) => {
                let _ = writeln!(out, "{prefix}{connector}{}{}", file.name, marker(file, checked));
            }
        }
    }
}

fn marker(file: &FileEntry<'_>, checked: bool) -> String {
    let mut marker = String::new();
    if file.outline.is_root() {
        marker.push_str(" (root)");
    }
    if !checked {
        return marker;
    }
    match (file.errors, file.warnings) {
        (0, 0) => marker.push_str("  ✓"),
        (0, w) => {
            let _ = write!(marker, "  ⚠ {w} warning(s)");
        }
        (e, 0) => {
            let _ = write!(marker, "  ✗ {e} error(s)");
        }
        (e, w) => {
            let _ = write!(marker, "  ✗ {e} error(s), {w} warning(s)");
        }
    }
    marker
}

#[cfg(test)]
mod tests {
    use super::*;
    use moff_core::{Diagnostic, RuleCategory};

    fn outlines() -> Vec<DocumentOutline> {
        vec![
            DocumentOutline::new("feature_top.md", Some("feature".into()), vec![]).unwrap(),
            DocumentOutline::new("features/feature_login.md", Some("feature".into()), vec![])
                .unwrap(),
            DocumentOutline::new("features/tech_api.md", Some("tech".into()), vec![]).unwrap(),
            DocumentOutline::root("project_demo.md", vec![]).unwrap(),
        ]
    }

    fn report() -> DiagnosticReport {
        DiagnosticReport::from_diagnostics(
            vec![
                Diagnostic::new(Severity::Error, RuleCategory::Location, "location.placement", "x")
                    .with_path("feature_top.md"),
                Diagnostic::new(Severity::Error, RuleCategory::Order, "order.sequence", "y")
                    .with_path("features/feature_login.md")
                    .with_line(2),
                Diagnostic::new(Severity::Warning, RuleCategory::Location, "location.depth", "z")
                    .with_path("features/feature_login.md")
                    .with_line(4),
            ],
            4,
        )
    }

    #[test]
    fn renders_checked_tree() {
        insta::assert_snapshot!(render("docs", &outlines(), Some(&report()), false), @r"
        docs/
        ├── features/
        │   ├── feature_login.md  ✗ 1 error(s), 1 warning(s)
        │   └── tech_api.md  ✓
        ├── feature_top.md  ✗ 1 error(s)
        └── project_demo.md (root)  ✓

        2 error(s), 1 warning(s) in 4 document(s)
        ");
    }

    #[test]
    fn renders_unchecked_tree() {
        insta::assert_snapshot!(render("docs", &outlines(), None, false), @r"
        docs/
        ├── features/
        │   ├── feature_login.md
        │   └── tech_api.md
        ├── feature_top.md
        └── project_demo.md (root)
        ");
    }

    #[test]
    fn errors_only_prunes_clean_files_and_dirs() {
        let only_top = DiagnosticReport::from_diagnostics(
            vec![
                Diagnostic::new(Severity::Error, RuleCategory::Location, "location.placement", "x")
                    .with_path("feature_top.md"),
            ],
            4,
        );
        let text = render("docs", &outlines(), Some(&only_top), true);
        assert!(text.contains("└── feature_top.md  ✗ 1 error(s)"));
        assert!(!text.contains("features/"));
        assert!(!text.contains("project_demo.md"));
    }
}
