//! ATX header extraction.
//!
//! Only the header outline is recovered. Setext headers, inline markup and
//! HTML blocks are left alone; fenced code blocks are skipped so that shell
//! comments inside them are not mistaken for headers.

use crate::outline::Header;

/// Extracts the ATX headers of `content` in document order.
///
/// Lines are 1-based. Headers with no text (`#` alone) are dropped.
#[must_use]
pub fn extract_headers(content: &str) -> Vec<Header> {
    let mut headers = Vec::new();
    let mut fence: Option<Fence> = None;

    for (index, line) in content.lines().enumerate() {
        if let Some(open) = fence {
            if open.is_closed_by(line) {
                fence = None;
            }
            continue;
        }
        if let Some(open) = Fence::parse(line) {
            fence = Some(open);
            continue;
        }
        if let Some((level, text)) = parse_heading(line) {
            if let Ok(header) = Header::new(level, text, index + 1) {
                headers.push(header);
            }
        }
    }

    headers
}

/// Splits an ATX heading line into level and text.
fn parse_heading(line: &str) -> Option<(u8, &str)> {
    let trimmed = strip_indent(line)?;
    let hashes = trimmed.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }

    let rest = &trimmed[hashes..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }

    let text = strip_closing_sequence(rest.trim());
    if text.is_empty() {
        return None;
    }
    u8::try_from(hashes).ok().map(|level| (level, text))
}

/// `## Title ##` closes with a run of `#` preceded by whitespace.
fn strip_closing_sequence(text: &str) -> &str {
    let without = text.trim_end_matches('#');
    if without.len() == text.len() {
        return text;
    }
    if without.is_empty() {
        return "";
    }
    if without.ends_with([' ', '\t']) {
        without.trim_end()
    } else {
        text
    }
}

/// Up to three spaces of indentation; four makes an indented code block.
fn strip_indent(line: &str) -> Option<&str> {
    let spaces = line.bytes().take_while(|&b| b == b' ').count();
    (spaces <= 3).then(|| &line[spaces..])
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: u8,
    len: usize,
}

impl Fence {
    fn parse(line: &str) -> Option<Self> {
        let trimmed = strip_indent(line)?;
        let marker = *trimmed.as_bytes().first()?;
        if marker != b'`' && marker != b'~' {
            return None;
        }
        let len = trimmed.bytes().take_while(|&b| b == marker).count();
        if len < 3 {
            return None;
        }
        // A backtick fence's info string must not contain backticks.
        if marker == b'`' && trimmed[len..].contains('`') {
            return None;
        }
        Some(Self { marker, len })
    }

    fn is_closed_by(self, line: &str) -> bool {
        let Some(trimmed) = strip_indent(line) else {
            return false;
        };
        let len = trimmed.bytes().take_while(|&b| b == self.marker).count();
        len >= self.len && trimmed[len..].trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline(content: &str) -> Vec<(u8, String, usize)> {
        extract_headers(content)
            .into_iter()
            .map(|h| (h.level().get(), h.text().to_string(), h.line()))
            .collect()
    }

    #[test]
    fn extracts_levels_text_and_lines() {
        let content = "# Title\n\nSome text.\n\n## Context\n### Detail\n";
        assert_eq!(
            outline(content),
            vec![
                (1, "Title".to_string(), 1),
                (2, "Context".to_string(), 5),
                (3, "Detail".to_string(), 6),
            ]
        );
    }

    #[test]
    fn requires_space_after_hashes() {
        assert!(outline("#hashtag\n####### seven\n").is_empty());
        assert_eq!(outline("#\tTabbed")[0].1, "Tabbed");
    }

    #[test]
    fn strips_closing_hashes_and_whitespace() {
        assert_eq!(outline("##  Context  ##\n")[0].1, "Context");
        assert_eq!(outline("# C#\n")[0].1, "C#");
        assert!(outline("# #\n").is_empty());
    }

    #[test]
    fn skips_fenced_code_blocks() {
        let content = "\
# Setup
```bash
# not a header
```
~~~~
## also not
~~~
## still code
~~~~
## Usage
";
        assert_eq!(
            outline(content),
            vec![(1, "Setup".to_string(), 1), (2, "Usage".to_string(), 10)]
        );
    }

    #[test]
    fn indented_code_is_not_a_header() {
        assert!(outline("    # code\n").is_empty());
        assert_eq!(outline("   # ok\n")[0].1, "ok");
    }

    #[test]
    fn unclosed_fence_hides_rest_of_document() {
        assert_eq!(outline("# A\n```\n# B\n").len(), 1);
    }
}
