//! Header order constraints.
//!
//! Only headers at the constrained level take part. In the default mode the
//! expected sequence must appear as a subsequence; other headers at that
//! level may be interleaved. Strict mode compares the headers at that level
//! element by element. Each constraint reports at most its first violation.

use super::{rule_ids, DocumentScope};
use crate::outline::Header;
use crate::settings::model::{HeaderOrder, HeaderText};
use crate::types::{Diagnostic, RuleCategory};

pub(super) fn check(scope: &DocumentScope<'_>, order: &HeaderOrder) -> Option<Diagnostic> {
    let actual: Vec<&Header> = scope
        .outline
        .headers()
        .iter()
        .filter(|h| h.level() == order.level())
        .collect();

    let violation = if order.is_strict() {
        strict(scope, order, &actual)
    } else {
        subsequence(scope, order, &actual)
    }?;

    let (message, line) = violation;
    let severity = order.severity().unwrap_or(scope.defaults.order);
    Some(
        scope
            .diagnostic(severity, RuleCategory::Order, rule_ids::ORDER_SEQUENCE, message)
            .with_optional_line(line),
    )
}

type Violation = (String, Option<usize>);

fn subsequence(
    scope: &DocumentScope<'_>,
    order: &HeaderOrder,
    actual: &[&Header],
) -> Option<Violation> {
    let expected = order.headers();
    let mut used = Vec::with_capacity(expected.len());
    let mut cursor = 0;

    for (index, text) in expected.iter().enumerate() {
        if let Some(offset) = actual[cursor..].iter().position(|h| text.matches(h.text())) {
            used.push(cursor + offset);
            cursor += offset + 1;
            continue;
        }

        // Present, but only before an element matched earlier. Headers
        // already consumed by an earlier element do not count.
        let early = actual[..cursor]
            .iter()
            .enumerate()
            .find(|(i, h)| !used.contains(i) && text.matches(h.text()))
            .map(|(_, h)| h);
        let previous = index.checked_sub(1).and_then(|i| expected.get(i));
        if let (Some(early), Some(previous)) = (early, previous) {
            return Some((
                format!(
                    "{previous} expected before '{}' at level {}",
                    early.text(),
                    order.level()
                ),
                Some(early.line()),
            ));
        }

        return Some(missing(scope, order, text));
    }
    None
}

fn strict(scope: &DocumentScope<'_>, order: &HeaderOrder, actual: &[&Header]) -> Option<Violation> {
    let expected = order.headers();
    let level = order.level();

    for position in 0..expected.len().max(actual.len()) {
        match (expected.get(position), actual.get(position)) {
            (Some(text), Some(header)) if text.matches(header.text()) => {}
            (Some(text), Some(header)) => {
                return Some((
                    format!(
                        "expected {text} at position {} of level {level}, found '{}'",
                        position + 1,
                        header.text()
                    ),
                    Some(header.line()),
                ));
            }
            (Some(text), None) => return Some(missing(scope, order, text)),
            (None, Some(header)) => {
                return Some((
                    format!(
                        "unexpected header '{}' at level {level} after the expected sequence",
                        header.text()
                    ),
                    Some(header.line()),
                ));
            }
            (None, None) => break,
        }
    }
    None
}

/// Missing headers are anchored at the document's last header.
fn missing(scope: &DocumentScope<'_>, order: &HeaderOrder, text: &HeaderText) -> Violation {
    (
        format!("missing header {text} at level {}", order.level()),
        scope.outline.last_line(),
    )
}
