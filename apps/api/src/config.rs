use std::str::FromStr;

use anyhow::{Context, Result};

use crate::models::cv::CVSectionType;

/// Application configuration loaded from environment variables.
/// Every variable is optional; defaults cover local development.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Base URL of the external grammar-check service. Absent = disabled.
    pub grammar_api_url: Option<String>,
    pub validation: ValidationConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: env_parse("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            grammar_api_url: std::env::var("GRAMMAR_API_URL").ok(),
            validation: ValidationConfig::from_env()?,
        })
    }
}

/// What to do when the parser meets a second heading of an already-open
/// section kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateHeadingPolicy {
    /// Keep the first section and append later content to it. Duplicate
    /// headings then cannot fabricate section-order failures.
    MergeIntoFirst,
    /// Record every occurrence as its own section entry.
    SeparateSections,
}

impl FromStr for DuplicateHeadingPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "merge_into_first" => Ok(DuplicateHeadingPolicy::MergeIntoFirst),
            "separate_sections" => Ok(DuplicateHeadingPolicy::SeparateSections),
            other => anyhow::bail!(
                "unknown duplicate heading policy '{other}' (expected 'merge_into_first' or 'separate_sections')"
            ),
        }
    }
}

/// Every detection threshold used by the validators. Kept in one struct so
/// thresholds are adjustable without code changes.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Hard cap on input characters, enforced before any parsing runs.
    pub max_text_chars: usize,
    /// Hard cap on the declared upload size in bytes.
    pub max_file_size_bytes: u64,
    /// Characters outside the permitted set tolerated before warning.
    pub max_special_chars: usize,
    /// Lines containing `|` tolerated before a table warning.
    pub table_pipe_threshold: usize,
    /// Lines containing tab characters tolerated before a table warning.
    pub table_tab_threshold: usize,
    /// Consecutive spaces that count as a column gap.
    pub multi_column_spacing: usize,
    /// Column-gap lines tolerated before a multi-column warning.
    pub multi_column_line_threshold: usize,
    /// Fraction of column-gap lines tolerated before a layout warning.
    pub multi_column_percentage: f64,
    /// Consecutive blank lines that count as an excessive break.
    pub excessive_newlines: usize,
    /// Minimum length of a `-`/`=` line flagged as decorative.
    pub horizontal_line_min_length: usize,
    /// Minimum length of a box-drawing line flagged as decorative.
    pub horizontal_line_unicode_min: usize,
    /// Maximum characters for a line to be considered a section heading.
    pub heading_max_chars: usize,
    /// Wall-clock budget for one full validation run.
    pub validation_timeout_secs: u64,
    pub duplicate_heading_policy: DuplicateHeadingPolicy,
    pub expected_order: Vec<CVSectionType>,
    pub mandatory_sections: Vec<CVSectionType>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_text_chars: 10_000_000,
            max_file_size_bytes: 10 * 1024 * 1024,
            max_special_chars: 50,
            table_pipe_threshold: 3,
            table_tab_threshold: 5,
            multi_column_spacing: 10,
            multi_column_line_threshold: 5,
            multi_column_percentage: 0.2,
            excessive_newlines: 3,
            horizontal_line_min_length: 5,
            horizontal_line_unicode_min: 3,
            heading_max_chars: 60,
            validation_timeout_secs: 5,
            duplicate_heading_policy: DuplicateHeadingPolicy::MergeIntoFirst,
            expected_order: CVSectionType::CANONICAL_ORDER.to_vec(),
            mandatory_sections: vec![
                CVSectionType::Experience,
                CVSectionType::Education,
                CVSectionType::Skills,
            ],
        }
    }
}

impl ValidationConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_text_chars: env_parse("MAX_TEXT_CHARS", defaults.max_text_chars)?,
            max_file_size_bytes: env_parse("MAX_FILE_SIZE_BYTES", defaults.max_file_size_bytes)?,
            validation_timeout_secs: env_parse(
                "VALIDATION_TIMEOUT_SECS",
                defaults.validation_timeout_secs,
            )?,
            duplicate_heading_policy: env_parse(
                "DUPLICATE_HEADING_POLICY",
                defaults.duplicate_heading_policy,
            )?,
            ..defaults
        })
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Invalid value for environment variable '{key}'")),
        Err(_) => Ok(default),
    }
}
