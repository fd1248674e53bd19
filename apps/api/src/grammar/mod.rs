//! Grammar-check collaborator contract.
//!
//! The engine does not implement NLP itself; it defines the seam an external
//! grammar/spell-check service plugs into. Whatever the backend returns is
//! carried as one opaque result slot with no special-cased logic.
//!
//! `AppState` holds an `Arc<dyn GrammarChecker>`, chosen at startup from
//! `GRAMMAR_API_URL`.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::issue::ValidationResult;

pub mod remote;

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

/// The grammar checker seam. Implement this to swap backends without
/// touching the pipeline or handlers.
#[async_trait]
pub trait GrammarChecker: Send + Sync {
    /// Returns `None` when grammar checking is disabled for this deployment.
    async fn check(&self, text: &str) -> Result<Option<ValidationResult>, GrammarError>;
}

/// No-op checker used when no grammar service is configured.
pub struct DisabledGrammarChecker;

#[async_trait]
impl GrammarChecker for DisabledGrammarChecker {
    async fn check(&self, _text: &str) -> Result<Option<ValidationResult>, GrammarError> {
        Ok(None)
    }
}

pub fn build_grammar_checker(endpoint: Option<&str>) -> Arc<dyn GrammarChecker> {
    match endpoint {
        Some(endpoint) => Arc::new(remote::HttpGrammarChecker::new(endpoint.to_string())),
        None => Arc::new(DisabledGrammarChecker),
    }
}
