//! Format validator — character-level structural signals that break ATS
//! text extraction: dense special characters, table markup, and the wide
//! space runs produced by multi-column exports.
//!
//! Every detection is a single pass over characters or lines.

use crate::config::ValidationConfig;
use crate::models::cv::ParsedCV;
use crate::models::issue::{FormatValidationResult, ValidationIssue, ValidationResult};
use crate::validation::has_space_run;

/// ASCII punctuation an ATS parser is expected to handle. Anything outside
/// this set, alphanumerics, and whitespace counts as a special character.
const PERMITTED_PUNCTUATION: &str = r##".,;:!?'"()[]{}<>/\-_&@#%$*+=|~^"##;

fn is_permitted(c: char) -> bool {
    c.is_alphanumeric() || c.is_whitespace() || PERMITTED_PUNCTUATION.contains(c)
}

/// Inspects the whole document for formatting an ATS parser mishandles.
/// Emits warnings only; `is_ats_compatible` stays true unless an error-level
/// finding appears.
pub fn validate_format(parsed: &ParsedCV, cfg: &ValidationConfig) -> FormatValidationResult {
    let text = &parsed.raw_text;

    let special_char_count = text.chars().filter(|c| !is_permitted(*c)).count();

    let mut pipe_lines = 0usize;
    let mut tab_lines = 0usize;
    let mut wide_gap_lines = 0usize;
    for line in text.split('\n') {
        if line.contains('|') {
            pipe_lines += 1;
        }
        if line.contains('\t') {
            tab_lines += 1;
        }
        if has_space_run(line, cfg.multi_column_spacing) {
            wide_gap_lines += 1;
        }
    }

    let mut issues = Vec::new();
    if special_char_count > cfg.max_special_chars {
        issues.push(
            ValidationIssue::warning(
                "EXCESSIVE_SPECIAL_CHARS",
                format!(
                    "Found {special_char_count} special characters (limit {}); decorative symbols often vanish or corrupt words during ATS parsing",
                    cfg.max_special_chars
                ),
            )
            .with_suggestion("Replace decorative symbols and icons with plain text"),
        );
    }
    if pipe_lines >= cfg.table_pipe_threshold {
        issues.push(
            ValidationIssue::warning(
                "TABLE_STRUCTURE_DETECTED",
                format!("{pipe_lines} lines contain pipe characters, which usually indicates a table layout"),
            )
            .with_suggestion("Convert tables to plain paragraphs or bullet lists"),
        );
    }
    if tab_lines >= cfg.table_tab_threshold {
        issues.push(
            ValidationIssue::warning(
                "TABULAR_DATA_DETECTED",
                format!("{tab_lines} lines contain tab characters, which usually indicates tabular alignment"),
            )
            .with_suggestion("Replace tab-aligned columns with single-column text"),
        );
    }
    if wide_gap_lines >= cfg.multi_column_line_threshold {
        issues.push(
            ValidationIssue::warning(
                "MULTI_COLUMN_LAYOUT",
                format!(
                    "{wide_gap_lines} lines contain runs of {} or more spaces, which suggests a multi-column layout ATS parsers read out of order",
                    cfg.multi_column_spacing
                ),
            )
            .with_suggestion("Use a single-column layout"),
        );
    }

    let mut base = ValidationResult::from_issues(issues);
    base.set_metadata("specialCharCount", special_char_count);
    base.set_metadata("pipeLineCount", pipe_lines);
    base.set_metadata("tabLineCount", tab_lines);
    base.set_metadata("wideGapLineCount", wide_gap_lines);

    let is_ats_compatible = base.passed;
    FormatValidationResult {
        base,
        file_type: parsed.metadata.file_type.clone(),
        file_size: parsed.metadata.file_size_bytes,
        is_ats_compatible,
    }
}
