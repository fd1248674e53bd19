//! HTTP grammar-check backend.
//!
//! Posts the document text to the configured endpoint and expects the base
//! validation result shape back. Retries on 429 and 5xx with exponential
//! backoff; every other failure surfaces as a `GrammarError` that the
//! handlers degrade to "no grammar slot".

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::grammar::{GrammarChecker, GrammarError};
use crate::models::issue::ValidationResult;

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct GrammarRequest<'a> {
    text: &'a str,
}

pub struct HttpGrammarChecker {
    client: Client,
    endpoint: String,
}

impl HttpGrammarChecker {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint,
        }
    }
}

#[async_trait]
impl GrammarChecker for HttpGrammarChecker {
    async fn check(&self, text: &str) -> Result<Option<ValidationResult>, GrammarError> {
        let request_body = GrammarRequest { text };
        let mut last_error: Option<GrammarError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "grammar check attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(GrammarError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("grammar API returned {}: {}", status, body);
                last_error = Some(GrammarError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GrammarError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let result: ValidationResult = response.json().await?;
            debug!(
                passed = result.passed,
                issue_count = result.issues.len(),
                "grammar check succeeded"
            );
            return Ok(Some(result));
        }

        Err(last_error.unwrap_or(GrammarError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}
