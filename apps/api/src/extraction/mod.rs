//! Text extraction for the upload path, plus the extraction-quality report.
//!
//! PDF bytes go through `pdf-extract`; plain text passes straight through.
//! Anything else is refused here — byte-level decoding of other formats is
//! an upstream concern, and callers that already have extracted text use
//! the JSON endpoint instead.

use std::path::Path;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::models::issue::{TextExtractionResult, ValidationIssue, ValidationResult};

/// Near-zero extracted text combined with a non-trivial file size suggests a
/// scanned/image PDF that carries no text layer.
const IMAGE_BASED_MAX_CHARS: usize = 100;
const IMAGE_BASED_MIN_FILE_BYTES: u64 = 10 * 1024;

/// A document ready for validation: extracted text plus file metadata.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub text: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size_bytes: u64,
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported file type '{file_type}'")]
    Unsupported { file_type: String },

    #[error("could not extract text from '{file_type}' file: {reason}")]
    Unreadable { file_type: String, reason: String },
}

fn file_type_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("txt")
        .to_lowercase()
}

/// Extracts text from an uploaded file. Supported: `pdf` and plain text
/// (`txt`, `md`, or no extension).
pub fn extract_upload(file_name: &str, data: Bytes) -> Result<ExtractedDocument, ExtractionError> {
    let file_type = file_type_of(file_name);
    let file_size_bytes = data.len() as u64;

    let text = match file_type.as_str() {
        "pdf" => pdf_extract::extract_text_from_mem(&data).map_err(|e| {
            ExtractionError::Unreadable {
                file_type: file_type.clone(),
                reason: e.to_string(),
            }
        })?,
        "txt" | "md" => String::from_utf8_lossy(&data).into_owned(),
        _ => return Err(ExtractionError::Unsupported { file_type }),
    };

    debug!(
        file_name,
        file_type = %file_type,
        file_size_bytes,
        extracted_chars = text.chars().count(),
        "text extraction finished"
    );

    Ok(ExtractedDocument {
        text,
        file_name: file_name.to_string(),
        file_type,
        file_size_bytes,
    })
}

/// Builds the extraction-quality report for a document.
pub fn extraction_report(doc: &ExtractedDocument) -> TextExtractionResult {
    let trimmed = doc.text.trim();
    let word_count = trimmed.split_whitespace().count();
    let is_empty = trimmed.is_empty();
    let is_image_based = trimmed.chars().count() < IMAGE_BASED_MAX_CHARS
        && doc.file_size_bytes >= IMAGE_BASED_MIN_FILE_BYTES;

    let mut base = ValidationResult::passing();
    if is_empty {
        base.push(
            ValidationIssue::error(
                "NO_TEXT_EXTRACTED",
                "No text could be extracted from the document",
            )
            .with_suggestion("Submit a text-based document rather than a scan or image"),
        );
    }
    if is_image_based {
        base.push(
            ValidationIssue::warning(
                "IMAGE_BASED_DOCUMENT",
                format!(
                    "Only {word_count} words were extracted from a {} byte file; the document is likely a scanned image without a text layer",
                    doc.file_size_bytes
                ),
            )
            .with_suggestion("Export the resume as a text-based PDF instead of scanning it"),
        );
    }
    base.set_metadata("wordCount", word_count);

    TextExtractionResult {
        base,
        extracted_text: doc.text.clone(),
        word_count,
        is_empty,
        is_image_based,
    }
}

/// Report for an upload whose bytes could not be decoded at all. The caller
/// returns this inside a normal failed response rather than a 5xx: an
/// unreadable document is a document defect, not a server fault.
pub fn failure_report(reason: &str) -> TextExtractionResult {
    let mut base = ValidationResult::passing();
    base.push(
        ValidationIssue::error(
            "TEXT_EXTRACTION_FAILED",
            format!("Text extraction failed: {reason}"),
        )
        .with_suggestion("Re-export the document and upload it again"),
    );
    TextExtractionResult {
        base,
        extracted_text: String::new(),
        word_count: 0,
        is_empty: true,
        is_image_based: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str, file_size_bytes: u64) -> ExtractedDocument {
        ExtractedDocument {
            text: text.to_string(),
            file_name: "cv.pdf".to_string(),
            file_type: "pdf".to_string(),
            file_size_bytes,
        }
    }

    #[test]
    fn test_plain_text_upload_passes_through() {
        let extracted = extract_upload("resume.txt", Bytes::from_static(b"hello world")).unwrap();
        assert_eq!(extracted.text, "hello world");
        assert_eq!(extracted.file_type, "txt");
        assert_eq!(extracted.file_size_bytes, 11);
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let err = extract_upload("resume.docx", Bytes::from_static(b"PK")).unwrap_err();
        assert!(matches!(err, ExtractionError::Unsupported { .. }));
    }

    #[test]
    fn test_extension_detection_is_case_insensitive() {
        let extracted = extract_upload("RESUME.TXT", Bytes::from_static(b"x")).unwrap();
        assert_eq!(extracted.file_type, "txt");
    }

    #[test]
    fn test_garbage_pdf_is_unreadable_not_a_panic() {
        let err = extract_upload("cv.pdf", Bytes::from_static(b"not a pdf")).unwrap_err();
        assert!(matches!(err, ExtractionError::Unreadable { .. }));
    }

    #[test]
    fn test_report_counts_words() {
        let report = extraction_report(&doc("one two  three\nfour", 512));
        assert_eq!(report.word_count, 4);
        assert!(!report.is_empty);
        assert!(report.base.passed);
    }

    #[test]
    fn test_empty_text_is_an_error() {
        let report = extraction_report(&doc("   \n  ", 512));
        assert!(report.is_empty);
        assert!(!report.base.passed);
        assert_eq!(report.base.issues[0].code, "NO_TEXT_EXTRACTED");
    }

    #[test]
    fn test_image_based_heuristic_needs_both_conditions() {
        // Little text, big file: image-based.
        let report = extraction_report(&doc("short", 50 * 1024));
        assert!(report.is_image_based);
        assert!(report
            .base
            .issues
            .iter()
            .any(|i| i.code == "IMAGE_BASED_DOCUMENT"));

        // Little text, little file: just a short document.
        let report = extraction_report(&doc("short", 64));
        assert!(!report.is_image_based);

        // Plenty of text, big file: fine.
        let long = "word ".repeat(200);
        let report = extraction_report(&doc(&long, 50 * 1024));
        assert!(!report.is_image_based);
    }

    #[test]
    fn test_failure_report_is_a_failed_result() {
        let report = failure_report("broken xref table");
        assert!(!report.base.passed);
        assert_eq!(report.base.issues[0].code, "TEXT_EXTRACTION_FAILED");
        assert!(report.is_empty);
    }
}
