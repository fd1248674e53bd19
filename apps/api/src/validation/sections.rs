//! Section order and mandatory-section checks over the parsed document.

use crate::models::cv::{CVSectionType, ParsedCV};
use crate::models::issue::{SectionValidationResult, ValidationIssue, ValidationResult};

/// Compares the relative order of detected sections against the expected
/// canonical ordering. Sections outside the canonical list are ignored, so
/// extra or custom sections never trigger a warning by themselves; each
/// adjacent inversion produces one WARNING naming the offending pair.
/// Order problems never fail the result.
pub fn validate_section_order(
    parsed: &ParsedCV,
    expected_order: &[CVSectionType],
) -> SectionValidationResult {
    let detected = parsed.detected_types();
    let canonical: Vec<CVSectionType> = detected
        .iter()
        .copied()
        .filter(|t| expected_order.contains(t))
        .collect();

    let mut issues = Vec::new();
    for pair in canonical.windows(2) {
        let (first, second) = (pair[0], pair[1]);
        let rank = |t: CVSectionType| expected_order.iter().position(|e| *e == t);
        if rank(first) > rank(second) {
            issues.push(
                ValidationIssue::warning(
                    "UNEXPECTED_SECTION_ORDER",
                    format!(
                        "Section '{first}' appears before '{second}', but ATS parsers expect '{second}' first"
                    ),
                )
                .with_location(first.label().to_string())
                .with_suggestion(format!("Move the '{second}' section above '{first}'")),
            );
        }
    }

    SectionValidationResult {
        base: ValidationResult::from_issues(issues),
        detected_sections: detected,
        missing_sections: Vec::new(),
    }
}

/// Checks that every mandatory section kind was detected. Each missing kind
/// produces exactly one ERROR, so `passed` holds iff nothing is missing.
pub fn validate_mandatory_sections(
    parsed: &ParsedCV,
    mandatory: &[CVSectionType],
) -> SectionValidationResult {
    let detected = parsed.detected_types();
    let missing: Vec<CVSectionType> = mandatory
        .iter()
        .copied()
        .filter(|m| !detected.contains(m))
        .collect();

    let issues = missing
        .iter()
        .map(|section| {
            ValidationIssue::error(
                "MISSING_MANDATORY_SECTION",
                format!("No '{section}' section was found"),
            )
            .with_location(section.label().to_string())
            .with_suggestion(format!(
                "Add a clearly titled '{section}' section so ATS parsers can find it"
            ))
        })
        .collect();

    SectionValidationResult {
        base: ValidationResult::from_issues(issues),
        detected_sections: detected,
        missing_sections: missing,
    }
}
