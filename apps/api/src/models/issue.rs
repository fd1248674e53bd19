//! Core validation data model: severities, issues, and the base result shape
//! shared by every validator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::cv::CVSectionType;

/// Severity of a single validation finding.
///
/// Ordering matters for summary purposes: `Error > Warning > Info`.
/// Only `Error` findings fail a result — warnings and info never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSeverity {
    Info,
    Warning,
    Error,
}

/// A single machine-readable validation finding.
///
/// `code` is the stable identifier (e.g. `MULTI_COLUMN_LAYOUT`); two issues
/// are duplicates only if both `code` and `location` match. Each validator
/// owns its own code namespace, so the aggregator never drops anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
    pub severity: ValidationSeverity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: ValidationSeverity,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
            location: None,
            suggestion: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, ValidationSeverity::Error)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, ValidationSeverity::Warning)
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, ValidationSeverity::Info)
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Base shape produced by every validator.
///
/// `passed` is true iff no `Error`-severity issue is present. Issues are
/// append-only while a validator runs and frozen afterwards. `metadata` is a
/// `BTreeMap` so serialized reports are byte-stable across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub passed: bool,
    pub issues: Vec<ValidationIssue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl ValidationResult {
    /// A passing result with no findings.
    pub fn passing() -> Self {
        Self {
            passed: true,
            issues: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Builds a result from collected issues, deriving `passed`.
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let passed = !issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Error);
        Self {
            passed,
            issues,
            metadata: BTreeMap::new(),
        }
    }

    /// Appends a finding, keeping `passed` consistent.
    pub fn push(&mut self, issue: ValidationIssue) {
        if issue.severity == ValidationSeverity::Error {
            self.passed = false;
        }
        self.issues.push(issue);
    }

    pub fn set_metadata(&mut self, key: &str, value: impl Into<Value>) {
        self.metadata.insert(key.to_string(), value.into());
    }
}

/// Result of the section order / mandatory section checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionValidationResult {
    #[serde(flatten)]
    pub base: ValidationResult,
    pub detected_sections: Vec<CVSectionType>,
    pub missing_sections: Vec<CVSectionType>,
}

/// Result of the character-level format checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatValidationResult {
    #[serde(flatten)]
    pub base: ValidationResult,
    pub file_type: String,
    pub file_size: u64,
    pub is_ats_compatible: bool,
}

/// Report on the upstream text extraction step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextExtractionResult {
    #[serde(flatten)]
    pub base: ValidationResult,
    pub extracted_text: String,
    pub word_count: usize,
    pub is_empty: bool,
    pub is_image_based: bool,
}

/// Issue counts by severity across a whole validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total_issues: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl ValidationSummary {
    pub fn tally(issues: &[ValidationIssue]) -> Self {
        let mut summary = Self::default();
        for issue in issues {
            summary.total_issues += 1;
            match issue.severity {
                ValidationSeverity::Error => summary.errors += 1,
                ValidationSeverity::Warning => summary.warnings += 1,
                ValidationSeverity::Info => summary.info += 1,
            }
        }
        summary
    }
}
