//! Whitespace canonicalization for rendered snippets.
//!
//! Templates may be authored at any indentation depth; the formatter makes output independent
//! of that depth so snippets can be compared byte for byte.

/// Canonicalize `text`:
///
/// 1. `\r\n` and lone `\r` become `\n`.
/// 2. Leading and trailing blank lines are dropped.
/// 3. The smallest run of leading spaces/tabs shared by the non-blank lines is removed from
///    each of them; interior blank lines become empty.
/// 4. Lines are joined with `\n`, without a trailing newline.
///
/// Idempotent: `format_snippet(&format_snippet(x)) == format_snippet(x)`.
pub fn format_snippet(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();

    let Some(first) = lines.iter().position(|line| !is_blank(line)) else {
        return String::new();
    };
    let last = lines.iter().rposition(|line| !is_blank(line)).unwrap_or(first);
    let lines = &lines[first..=last];

    let indent = lines
        .iter()
        .filter(|line| !is_blank(line))
        .map(|line| indent_width(line))
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| if is_blank(line) { "" } else { &line[indent..] })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Count of leading spaces and tabs. Both are single bytes, so the count is also a byte offset.
fn indent_width(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
}
