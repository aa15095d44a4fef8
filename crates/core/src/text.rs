//! Output budgeting and string hygiene.
//!
//! Both operations here are idempotent: clamping an already-clamped string
//! and sanitizing an already-sanitized string are no-ops. Tool replies and
//! extractor cells rely on that when they pass through more than one layer.

/// Suffix appended whenever a body is cut to fit its budget.
pub const TRUNCATION_SUFFIX: &str = "\n\n…[truncated]";

/// Clamp `text` to at most `max_chars` characters, appending
/// [`TRUNCATION_SUFFIX`] when anything was cut.
///
/// The returned string never exceeds `max_chars` characters, including the
/// suffix. Budgets smaller than the suffix itself degrade to a bare cut.
pub fn clamp_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let suffix_len = TRUNCATION_SUFFIX.chars().count();
    let keep = max_chars.saturating_sub(suffix_len);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(TRUNCATION_SUFFIX);
    if out.chars().count() > max_chars {
        out = out.chars().take(max_chars).collect();
    }
    out
}

/// Strip C0 control characters and DEL, keeping `\t`, `\n`, `\r`.
///
/// Used for multi-line text (crawled markdown, code examples) where line
/// structure matters.
pub fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| !is_stripped_control(c))
        .collect()
}

/// Cell-grade sanitizer: strip control characters, collapse every run of
/// ASCII whitespace to a single space, and trim the ends.
///
/// Extractor output (table cells, list items, field values) goes through
/// this so downstream JSON is single-line and control-free.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for c in text.chars() {
        if is_stripped_control(c) {
            continue;
        }
        if c == ' ' || c == '\t' || c == '\n' || c == '\r' {
            in_whitespace = true;
            continue;
        }
        if in_whitespace && !out.is_empty() {
            out.push(' ');
        }
        in_whitespace = false;
        out.push(c);
    }
    out
}

fn is_stripped_control(c: char) -> bool {
    (c < '\u{20}' && c != '\t' && c != '\n' && c != '\r') || c == '\u{7f}'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_short_text_untouched() {
        assert_eq!(clamp_text("hello", 100), "hello");
        assert_eq!(clamp_text("", 0), "");
    }

    #[test]
    fn clamp_appends_suffix_and_respects_budget() {
        let long = "x".repeat(500);
        let clamped = clamp_text(&long, 200);
        assert!(clamped.chars().count() <= 200);
        assert!(clamped.ends_with(TRUNCATION_SUFFIX));
    }

    #[test]
    fn clamp_is_idempotent() {
        let long = "line\n".repeat(400);
        let once = clamp_text(&long, 300);
        let twice = clamp_text(&once, 300);
        assert_eq!(once, twice);
    }

    #[test]
    fn clamp_survives_budget_smaller_than_suffix() {
        let clamped = clamp_text("abcdefghij", 4);
        assert!(clamped.chars().count() <= 4);
    }

    #[test]
    fn sanitize_strips_controls_and_collapses_whitespace() {
        assert_eq!(sanitize("a\u{0}b\u{1f}c"), "abc");
        assert_eq!(sanitize("  one \t two\n\nthree  "), "one two three");
        assert_eq!(sanitize("del\u{7f}eted"), "deleted");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let messy = " a\u{3} \n b\tc \r\n ";
        let once = sanitize(messy);
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn strip_control_chars_preserves_line_structure() {
        let text = "line1\nline2\tend\u{8}";
        assert_eq!(strip_control_chars(text), "line1\nline2\tend");
    }
}
