//! Result aggregator — merges the per-validator outputs into the single
//! report returned to callers.
//!
//! The sub-result slots are a fixed-field struct rather than a keyed map so
//! adding a slot is a compile-time event, and the flattening order below is
//! part of the public contract.

use serde::{Deserialize, Serialize};

use crate::models::issue::{
    FormatValidationResult, SectionValidationResult, TextExtractionResult, ValidationIssue,
    ValidationResult, ValidationSummary,
};

/// The named sub-results of one validation run. Every slot is optional; an
/// absent slot contributes nothing to the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_integrity: Option<ValidationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_extraction: Option<TextExtractionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<ValidationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_parsing: Option<ValidationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_validation: Option<FormatValidationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_order: Option<SectionValidationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mandatory_sections: Option<SectionValidationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar: Option<ValidationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<ValidationResult>,
}

impl ValidationResults {
    /// Base results in declared slot order. The flattened issue list follows
    /// this order, then each result's internal order.
    fn slots(&self) -> [Option<&ValidationResult>; 9] {
        [
            self.file_integrity.as_ref(),
            self.text_extraction.as_ref().map(|r| &r.base),
            self.encoding.as_ref(),
            self.section_parsing.as_ref(),
            self.format_validation.as_ref().map(|r| &r.base),
            self.section_order.as_ref().map(|r| &r.base),
            self.mandatory_sections.as_ref().map(|r| &r.base),
            self.grammar.as_ref(),
            self.layout.as_ref(),
        ]
    }

    pub fn all_issues(&self) -> Vec<ValidationIssue> {
        self.slots()
            .into_iter()
            .flatten()
            .flat_map(|r| r.issues.iter().cloned())
            .collect()
    }
}

/// The terminal output of the engine: one flattened issue list, severity
/// counts, the overall verdict, and every sub-result for drill-down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub passed: bool,
    pub issues: Vec<ValidationIssue>,
    pub summary: ValidationSummary,
    pub results: ValidationResults,
}

impl ValidationResponse {
    /// Derives `issues`, `summary`, and `passed` from the supplied results.
    /// Total over any subset of slots, including none at all.
    pub fn from_results(results: ValidationResults) -> Self {
        let issues = results.all_issues();
        let summary = ValidationSummary::tally(&issues);
        Self {
            passed: summary.errors == 0,
            issues,
            summary,
            results,
        }
    }
}
