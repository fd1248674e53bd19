//! Layout safety validator — whitespace and separator artifacts that mark a
//! visually complex template: column gaps across much of the document,
//! excessive blank-line runs, and decorative horizontal rules.
//!
//! All detections are run-length scans over lines; no regex, no backtracking.

use crate::config::ValidationConfig;
use crate::models::cv::ParsedCV;
use crate::models::issue::{ValidationIssue, ValidationResult};
use crate::validation::has_space_run;

fn is_box_drawing(c: char) -> bool {
    ('\u{2500}'..='\u{257F}').contains(&c)
}

/// A horizontal rule: a line of only `-`/`=` at or above the ASCII minimum
/// length, or only box-drawing characters at or above the Unicode minimum.
fn is_decorative_line(line: &str, cfg: &ValidationConfig) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    let count = trimmed.chars().count();
    if trimmed.chars().all(|c| c == '-' || c == '=') {
        return count >= cfg.horizontal_line_min_length;
    }
    if trimmed.chars().all(is_box_drawing) {
        return count >= cfg.horizontal_line_unicode_min;
    }
    false
}

/// Flags layout artifacts across the whole document. Findings are aggregated
/// (one issue per artifact class, with counts) so a template-heavy document
/// cannot flood the report.
pub fn validate_layout(parsed: &ParsedCV, cfg: &ValidationConfig) -> ValidationResult {
    let lines: Vec<&str> = parsed.raw_text.split('\n').collect();
    let total_lines = lines.len();

    let mut wide_gap_lines = 0usize;
    let mut blank_run = 0usize;
    let mut excessive_blank_runs = 0usize;
    let mut decorative_lines = 0usize;
    let mut first_decorative_line: Option<usize> = None;

    for (idx, line) in lines.iter().enumerate() {
        if has_space_run(line, cfg.multi_column_spacing) {
            wide_gap_lines += 1;
        }

        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run == cfg.excessive_newlines {
                excessive_blank_runs += 1;
            }
        } else {
            blank_run = 0;
        }

        if is_decorative_line(line, cfg) {
            decorative_lines += 1;
            first_decorative_line.get_or_insert(idx);
        }
    }

    let wide_gap_fraction = if total_lines > 0 {
        wide_gap_lines as f64 / total_lines as f64
    } else {
        0.0
    };

    let mut result = ValidationResult::passing();
    if wide_gap_fraction > cfg.multi_column_percentage {
        result.push(
            ValidationIssue::warning(
                "LIKELY_MULTI_COLUMN",
                format!(
                    "{:.0}% of lines contain wide space runs; the document likely uses a multi-column layout that ATS parsers read out of order",
                    wide_gap_fraction * 100.0
                ),
            )
            .with_suggestion("Use a single-column layout"),
        );
    }
    if excessive_blank_runs > 0 {
        result.push(
            ValidationIssue::warning(
                "EXCESSIVE_WHITESPACE",
                format!(
                    "{excessive_blank_runs} runs of {} or more consecutive blank lines; large vertical gaps often mean text boxes or page-break tricks",
                    cfg.excessive_newlines
                ),
            )
            .with_suggestion("Tighten vertical spacing between sections"),
        );
    }
    if decorative_lines > 0 {
        let issue = ValidationIssue::info(
            "DECORATIVE_LINE_DETECTED",
            format!(
                "{decorative_lines} horizontal separator lines; usually harmless but typical of template-heavy designs"
            ),
        )
        .with_location(format!(
            "line {}",
            first_decorative_line.unwrap_or(0) + 1
        ));
        result.push(issue);
    }

    result.set_metadata("totalLines", total_lines);
    result.set_metadata("wideGapLineCount", wide_gap_lines);
    result.set_metadata("excessiveBlankRunCount", excessive_blank_runs);
    result.set_metadata("decorativeLineCount", decorative_lines);
    result
}
