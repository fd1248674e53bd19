use std::time::Duration;

use anyhow::anyhow;
use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;
use tracing::warn;

use crate::errors::AppError;
use crate::extraction::{self, ExtractedDocument, ExtractionError};
use crate::state::AppState;
use crate::validation::aggregate::{ValidationResponse, ValidationResults};
use crate::validation::pipeline;

/// Request body for callers that already extracted the document text.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateTextRequest {
    pub text: String,
    pub file_name: String,
    pub file_type: String,
    /// Defaults to the byte length of `text` when the caller has no better value.
    pub file_size_bytes: Option<u64>,
}

/// POST /api/v1/validations
pub async fn handle_validate_text(
    State(state): State<AppState>,
    Json(req): Json<ValidateTextRequest>,
) -> Result<Json<ValidationResponse>, AppError> {
    let file_size_bytes = req.file_size_bytes.unwrap_or(req.text.len() as u64);
    let doc = ExtractedDocument {
        text: req.text,
        file_name: req.file_name,
        file_type: req.file_type.to_lowercase(),
        file_size_bytes,
    };
    let response = run_validation(&state, doc).await?;
    Ok(Json(response))
}

/// POST /api/v1/validations/upload
pub async fn handle_validate_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ValidationResponse>, AppError> {
    let mut upload: Option<(String, bytes::Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            upload = Some((file_name, data));
        }
    }
    let (file_name, data) =
        upload.ok_or_else(|| AppError::Validation("Multipart field 'file' is required".into()))?;

    let doc = match extraction::extract_upload(&file_name, data) {
        Ok(doc) => doc,
        Err(ExtractionError::Unsupported { file_type }) => {
            return Err(AppError::Extraction(format!(
                "File type '{file_type}' is not supported for upload; send a PDF or plain-text file, or POST extracted text to /api/v1/validations"
            )));
        }
        Err(ExtractionError::Unreadable { reason, .. }) => {
            // An unreadable document is a document defect, not a server
            // fault: report it inside a normal failed response.
            let results = ValidationResults {
                text_extraction: Some(extraction::failure_report(&reason)),
                ..ValidationResults::default()
            };
            return Ok(Json(ValidationResponse::from_results(results)));
        }
    };

    let response = run_validation(&state, doc).await?;
    Ok(Json(response))
}

/// Runs the grammar collaborator, then the pipeline inside a blocking task
/// under the configured wall-clock budget. When the budget trips, the
/// document is reported as failed to validate rather than hanging the call.
async fn run_validation(
    state: &AppState,
    doc: ExtractedDocument,
) -> Result<ValidationResponse, AppError> {
    let grammar = match state.grammar.check(&doc.text).await {
        Ok(slot) => slot,
        Err(e) => {
            warn!("grammar checker unavailable, continuing without it: {e}");
            None
        }
    };

    let cfg = state.config.validation.clone();
    let budget_secs = cfg.validation_timeout_secs;
    let task = tokio::task::spawn_blocking(move || pipeline::run_pipeline(&doc, &cfg, grammar));

    match tokio::time::timeout(Duration::from_secs(budget_secs), task).await {
        Err(_) => {
            warn!("validation exceeded its {budget_secs}s budget");
            Ok(pipeline::timeout_response(budget_secs))
        }
        Ok(Err(join_error)) => Err(AppError::Internal(anyhow!(
            "validation task failed: {join_error}"
        ))),
        Ok(Ok(result)) => result.map_err(AppError::Internal),
    }
}
