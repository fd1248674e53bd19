//! Pipeline orchestration: runs the guard, the parser, and every validator
//! over one document and assembles the terminal response.
//!
//! Everything here is synchronous and deterministic — identical input yields
//! a byte-identical serialized response. The wall-clock timeout around a run
//! lives in the handlers.

use anyhow::{ensure, Result};
use serde_json::json;
use tracing::debug;

use crate::config::ValidationConfig;
use crate::extraction::{self, ExtractedDocument};
use crate::models::cv::ParsedCV;
use crate::models::issue::{ValidationIssue, ValidationResult};
use crate::validation::aggregate::{ValidationResponse, ValidationResults};
use crate::validation::format::validate_format;
use crate::validation::guard::{guard, GuardedText};
use crate::validation::layout::validate_layout;
use crate::validation::section_parser::parse_cv;
use crate::validation::sections::{validate_mandatory_sections, validate_section_order};

const SUPPORTED_FILE_TYPES: &[&str] = &["pdf", "docx", "txt"];

/// Runs the full validation pipeline over one document.
///
/// Only two things stop a run early: an oversized input (the guard's ERROR
/// becomes the sole finding of a failed response) and a broken internal
/// invariant (a bug, surfaced as `Err` for the caller to map to a 500).
/// Every document defect is data inside the `Ok` response.
pub fn run_pipeline(
    doc: &ExtractedDocument,
    cfg: &ValidationConfig,
    grammar: Option<ValidationResult>,
) -> Result<ValidationResponse> {
    let mut file_integrity = check_file_integrity(doc, cfg);

    let guarded = match guard(&doc.text, doc.file_size_bytes, cfg.max_text_chars) {
        Ok(guarded) => guarded,
        Err(issue) => {
            file_integrity.push(issue);
            let results = ValidationResults {
                file_integrity: Some(file_integrity),
                ..ValidationResults::default()
            };
            return Ok(ValidationResponse::from_results(results));
        }
    };

    let parsed = parse_cv(
        &guarded,
        &doc.file_name,
        &doc.file_type,
        doc.file_size_bytes,
        cfg,
    );
    ensure_line_ranges(&parsed)?;

    let results = ValidationResults {
        file_integrity: Some(file_integrity),
        text_extraction: Some(extraction::extraction_report(doc)),
        encoding: Some(check_encoding(&guarded)),
        section_parsing: Some(section_parsing_report(&parsed)),
        format_validation: Some(validate_format(&parsed, cfg)),
        section_order: Some(validate_section_order(&parsed, &cfg.expected_order)),
        mandatory_sections: Some(validate_mandatory_sections(
            &parsed,
            &cfg.mandatory_sections,
        )),
        grammar,
        layout: Some(validate_layout(&parsed, cfg)),
    };

    let response = ValidationResponse::from_results(results);
    debug!(
        passed = response.passed,
        errors = response.summary.errors,
        warnings = response.summary.warnings,
        "validation pipeline finished"
    );
    Ok(response)
}

/// The failed-to-validate verdict used when a run exceeds its wall-clock
/// budget: an ERROR finding, never a hang or a crash.
pub fn timeout_response(budget_secs: u64) -> ValidationResponse {
    let mut file_integrity = ValidationResult::passing();
    file_integrity.push(ValidationIssue::error(
        "VALIDATION_TIMEOUT",
        format!("Validation did not finish within {budget_secs} seconds; the document is treated as failed to validate"),
    ));
    ValidationResponse::from_results(ValidationResults {
        file_integrity: Some(file_integrity),
        ..ValidationResults::default()
    })
}

/// Declared-size and file-type checks. Findings here are errors but do not
/// stop the run — the text is still validated so the caller sees everything
/// wrong at once.
fn check_file_integrity(doc: &ExtractedDocument, cfg: &ValidationConfig) -> ValidationResult {
    let mut result = ValidationResult::passing();
    if doc.file_size_bytes == 0 {
        result.push(ValidationIssue::error(
            "EMPTY_FILE",
            "The uploaded file is empty",
        ));
    } else if doc.file_size_bytes > cfg.max_file_size_bytes {
        result.push(ValidationIssue::error(
            "FILE_TOO_LARGE",
            format!(
                "File is {} bytes, above the {} byte limit",
                doc.file_size_bytes, cfg.max_file_size_bytes
            ),
        ));
    }
    if !SUPPORTED_FILE_TYPES.contains(&doc.file_type.as_str()) {
        result.push(
            ValidationIssue::error(
                "UNSUPPORTED_FILE_TYPE",
                format!("File type '{}' is not supported", doc.file_type),
            )
            .with_suggestion("Upload a PDF, DOCX, or plain-text file"),
        );
    }
    result.set_metadata("declaredSizeBytes", doc.file_size_bytes);
    result
}

/// Scans for characters that survive extraction but corrupt ATS parsing:
/// stray C0 controls and U+FFFD replacement characters from lossy decoding.
fn check_encoding(text: &GuardedText) -> ValidationResult {
    let mut control_count = 0usize;
    let mut replacement_count = 0usize;
    for c in text.as_str().chars() {
        if c == '\u{FFFD}' {
            replacement_count += 1;
        } else if c.is_control() && c != '\n' && c != '\t' {
            control_count += 1;
        }
    }

    let mut result = ValidationResult::passing();
    if control_count > 0 {
        result.push(
            ValidationIssue::warning(
                "CONTROL_CHARACTERS_DETECTED",
                format!("{control_count} control characters found in the extracted text"),
            )
            .with_suggestion("Re-export the document; control characters usually come from broken copy-paste or OCR"),
        );
    }
    if replacement_count > 0 {
        result.push(
            ValidationIssue::warning(
                "REPLACEMENT_CHARACTERS_DETECTED",
                format!("{replacement_count} replacement characters (U+FFFD) found; some text was lost during decoding"),
            )
            .with_suggestion("Re-export the document with standard UTF-8 encoding"),
        );
    }
    result.set_metadata("controlCharCount", control_count);
    result.set_metadata("replacementCharCount", replacement_count);
    result
}

/// Diagnostics about the segmentation itself. Informational only — a resume
/// with unrecognizable headings is an ATS risk worth surfacing, but the
/// mandatory-section validator is what actually fails it.
fn section_parsing_report(parsed: &ParsedCV) -> ValidationResult {
    let mut result = ValidationResult::passing();
    let only_fallback = parsed.sections.len() == 1 && parsed.sections[0].title.is_empty();
    if only_fallback {
        result.push(
            ValidationIssue::info(
                "NO_SECTION_HEADINGS_DETECTED",
                "No recognizable section headings were found; the whole document was treated as one block",
            )
            .with_suggestion("Use conventional headings such as 'Experience', 'Education', and 'Skills'"),
        );
    }
    result.set_metadata("sectionCount", parsed.sections.len());
    result.set_metadata(
        "detectedSections",
        json!(parsed
            .detected_types()
            .iter()
            .map(|t| t.label())
            .collect::<Vec<_>>()),
    );
    result
}

/// Invariant check between the parser and the structural validators: every
/// section's line range must be internally consistent and inside the
/// document. A violation is a programming error, not a document defect.
fn ensure_line_ranges(parsed: &ParsedCV) -> Result<()> {
    let line_count = parsed.raw_text.split('\n').count();
    let mut previous_start = 0usize;
    for section in &parsed.sections {
        if let (Some(start), Some(end)) = (section.start_line, section.end_line) {
            ensure!(
                start <= end,
                "section '{}' has start line {start} after end line {end}",
                section.section_type
            );
            ensure!(
                end < line_count,
                "section '{}' ends at line {end} but the document has {line_count} lines",
                section.section_type
            );
            ensure!(
                start >= previous_start,
                "section '{}' starts at line {start}, before the preceding section",
                section.section_type
            );
            previous_start = start;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::{CVMetadata, CVSection, CVSectionType};
    use chrono::Utc;

    const WELL_FORMED: &str = "Jane Doe\njane@example.com\n\nSUMMARY\nBackend engineer.\n\nEXPERIENCE\nAcme Corp, 2019-2024. Built billing services in Rust.\n\nEDUCATION\nBSc Computer Science, 2019\n\nSKILLS\nRust, SQL, Kubernetes";

    fn doc(text: &str) -> ExtractedDocument {
        ExtractedDocument {
            text: text.to_string(),
            file_name: "cv.txt".to_string(),
            file_type: "txt".to_string(),
            file_size_bytes: text.len() as u64,
        }
    }

    fn run(text: &str) -> ValidationResponse {
        run_pipeline(&doc(text), &ValidationConfig::default(), None).unwrap()
    }

    #[test]
    fn test_well_formed_document_passes() {
        let response = run(WELL_FORMED);
        assert!(response.passed, "issues: {:?}", response.issues);
        assert_eq!(response.summary.errors, 0);
    }

    #[test]
    fn test_table_scenario_warns_but_passes() {
        let text = format!("{WELL_FORMED}\nname | role\ncity | year\nteam | size");
        let response = run(&text);
        let format = response.results.format_validation.as_ref().unwrap();
        assert!(format
            .base
            .issues
            .iter()
            .any(|i| i.code == "TABLE_STRUCTURE_DETECTED"));
        assert!(response.passed);
    }

    #[test]
    fn test_empty_document_scenario() {
        let response = run_pipeline(&doc(""), &ValidationConfig::default(), None).unwrap();
        assert!(!response.passed);

        let parsing = response.results.section_parsing.as_ref().unwrap();
        assert_eq!(
            parsing.metadata.get("sectionCount").unwrap().as_u64(),
            Some(1)
        );

        let mandatory = response.results.mandatory_sections.as_ref().unwrap();
        assert_eq!(
            mandatory.missing_sections,
            vec![
                CVSectionType::Experience,
                CVSectionType::Education,
                CVSectionType::Skills
            ]
        );
    }

    #[test]
    fn test_oversized_input_stops_after_the_guard() {
        let cfg = ValidationConfig {
            max_text_chars: 10,
            ..ValidationConfig::default()
        };
        let response = run_pipeline(&doc("this is well over ten characters"), &cfg, None).unwrap();
        assert!(!response.passed);
        assert!(response.issues.iter().any(|i| i.code == "INPUT_TOO_LARGE"));
        // No validator ran past the guard.
        assert!(response.results.section_parsing.is_none());
        assert!(response.results.format_validation.is_none());
        assert!(response.results.mandatory_sections.is_none());
    }

    #[test]
    fn test_unsupported_file_type_is_flagged_but_validation_continues() {
        let mut document = doc(WELL_FORMED);
        document.file_type = "odt".to_string();
        let response =
            run_pipeline(&document, &ValidationConfig::default(), None).unwrap();
        assert!(!response.passed);
        assert!(response
            .issues
            .iter()
            .any(|i| i.code == "UNSUPPORTED_FILE_TYPE"));
        assert!(response.results.format_validation.is_some());
    }

    #[test]
    fn test_control_characters_are_reported() {
        let text = format!("{WELL_FORMED}\u{0007}\u{0000}");
        let response = run(&text);
        let encoding = response.results.encoding.as_ref().unwrap();
        assert!(encoding
            .issues
            .iter()
            .any(|i| i.code == "CONTROL_CHARACTERS_DETECTED"));
        assert_eq!(
            encoding.metadata.get("controlCharCount").unwrap().as_u64(),
            Some(2)
        );
    }

    #[test]
    fn test_grammar_slot_is_passed_through_opaquely() {
        let grammar = ValidationResult::from_issues(vec![ValidationIssue::warning(
            "PASSIVE_VOICE",
            "passive voice detected",
        )]);
        let response =
            run_pipeline(&doc(WELL_FORMED), &ValidationConfig::default(), Some(grammar)).unwrap();
        assert!(response.issues.iter().any(|i| i.code == "PASSIVE_VOICE"));
        assert!(response.results.grammar.is_some());
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let first = serde_json::to_string(&run(WELL_FORMED)).unwrap();
        let second = serde_json::to_string(&run(WELL_FORMED)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pathological_input_finishes_within_budget() {
        let start = std::time::Instant::now();
        let heading_spam = "EXPERIENCE\n".repeat(10_000);
        run(&heading_spam);
        let token_spam = "EXPERIENCE ".repeat(10_000);
        run(&token_spam);
        let bracket_spam = format!("{}{}", "(".repeat(50_000), ")".repeat(50_000));
        run(&bracket_spam);
        assert!(
            start.elapsed() < std::time::Duration::from_secs(1),
            "pathological inputs took {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn test_timeout_response_is_a_failed_verdict() {
        let response = timeout_response(5);
        assert!(!response.passed);
        assert_eq!(response.issues.len(), 1);
        assert_eq!(response.issues[0].code, "VALIDATION_TIMEOUT");
    }

    #[test]
    fn test_inconsistent_line_ranges_are_an_internal_error() {
        let parsed = ParsedCV {
            sections: vec![CVSection {
                section_type: CVSectionType::Experience,
                title: "EXPERIENCE".to_string(),
                content: String::new(),
                start_line: Some(5),
                end_line: Some(2),
                order: Some(0),
            }],
            raw_text: "a\nb\nc\nd\ne\nf".to_string(),
            metadata: CVMetadata {
                file_name: "cv.txt".to_string(),
                file_type: "txt".to_string(),
                file_size_bytes: 11,
                extracted_at: Utc::now(),
            },
        };
        assert!(ensure_line_ranges(&parsed).is_err());
    }

    #[test]
    fn test_parser_output_always_satisfies_the_invariant() {
        for text in ["", WELL_FORMED, "EXPERIENCE\nEDUCATION\nSKILLS"] {
            let response = run(text);
            // run_pipeline would have returned Err on violation.
            assert!(response.summary.total_issues == response.issues.len());
        }
    }
}
