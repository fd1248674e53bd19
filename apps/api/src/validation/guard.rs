//! Input guard — the first gate every document passes through.
//!
//! Enforces the character-count cap before any parser touches the text and
//! normalizes line endings once, so every downstream validator can assume
//! `\n`-only input. This bound is the primary DoS defense: everything after
//! it is a linear scan over at most `max_chars` characters.

use tracing::debug;

use crate::models::issue::ValidationIssue;

/// Text that has passed the input guard: bounded length, `\n`-only line
/// endings. Downstream code takes this type instead of a raw `&str` so the
/// bound cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedText(String);

impl GuardedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Checks the size bound and normalizes `\r\n`/`\r` to `\n`.
///
/// On rejection returns the single ERROR issue the caller must surface;
/// no further validators may run on the oversized text.
pub fn guard(
    text: &str,
    declared_size_bytes: u64,
    max_chars: usize,
) -> Result<GuardedText, ValidationIssue> {
    let char_count = text.chars().count();
    if char_count > max_chars {
        return Err(ValidationIssue::error(
            "INPUT_TOO_LARGE",
            format!(
                "Document text is {char_count} characters long, above the {max_chars} character limit"
            ),
        )
        .with_suggestion("Shorten the document or split it before resubmitting"));
    }

    let mut normalized = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            normalized.push('\n');
        } else {
            normalized.push(c);
        }
    }

    debug!(declared_size_bytes, char_count, "input guard passed");
    Ok(GuardedText(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::issue::ValidationSeverity;

    #[test]
    fn test_accepts_text_at_exactly_the_limit() {
        let text = "a".repeat(100);
        assert!(guard(&text, 100, 100).is_ok());
    }

    #[test]
    fn test_rejects_text_one_over_the_limit() {
        let text = "a".repeat(101);
        let issue = guard(&text, 101, 100).unwrap_err();
        assert_eq!(issue.code, "INPUT_TOO_LARGE");
        assert_eq!(issue.severity, ValidationSeverity::Error);
    }

    #[test]
    fn test_normalizes_crlf_and_bare_cr() {
        let guarded = guard("one\r\ntwo\rthree\n", 0, 1000).unwrap();
        assert_eq!(guarded.as_str(), "one\ntwo\nthree\n");
    }

    #[test]
    fn test_limit_counts_characters_not_bytes() {
        // Four 3-byte characters: 4 chars, 12 bytes.
        let text = "日本語文";
        assert!(guard(text, 12, 4).is_ok());
        assert!(guard(text, 12, 3).is_err());
    }

    #[test]
    fn test_empty_input_passes() {
        let guarded = guard("", 0, 10).unwrap();
        assert_eq!(guarded.as_str(), "");
    }

    #[test]
    fn test_guard_is_pure() {
        let a = guard("x\r\ny", 4, 100).unwrap();
        let b = guard("x\r\ny", 4, 100).unwrap();
        assert_eq!(a, b);
    }
}
