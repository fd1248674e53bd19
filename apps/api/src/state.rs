use std::sync::Arc;

use crate::config::Config;
use crate::grammar::GrammarChecker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable grammar-check collaborator. Default: disabled. Swap via
    /// the GRAMMAR_API_URL env var.
    pub grammar: Arc<dyn GrammarChecker>,
}
