use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::parser::{EmailParser, ParseResult, RawEmail};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ParseEmailResponse {
    pub email_id: Option<String>,
    pub result: ParseResult,
    pub needs_review: bool,
}

#[derive(Debug, Deserialize)]
pub struct BatchParseRequest {
    pub emails: Vec<RawEmail>,
}

#[derive(Debug, Serialize)]
pub struct BatchParseResponse {
    pub results: Vec<ParseEmailResponse>,
}

/// Parsing is CPU-bound regex work, so it runs on the blocking pool.
async fn parse_blocking(
    parser: Arc<EmailParser>,
    email: RawEmail,
    review_threshold: f64,
) -> Result<ParseEmailResponse, AppError> {
    let email_id = email.id.clone();
    let result = tokio::task::spawn_blocking(move || parser.parse_email(&email))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("parse task failed: {e}")))?;

    let needs_review = result.needs_review(review_threshold);
    if needs_review {
        tracing::info!(
            email_id = email_id.as_deref().unwrap_or("-"),
            confidence = result.confidence_score,
            needs_review,
            "low-confidence extraction"
        );
    }

    Ok(ParseEmailResponse {
        email_id,
        result,
        needs_review,
    })
}

/// POST /api/v1/emails/parse
pub async fn handle_parse_email(
    State(state): State<AppState>,
    Json(email): Json<RawEmail>,
) -> Result<Json<ParseEmailResponse>, AppError> {
    let response = parse_blocking(
        Arc::clone(&state.parser),
        email,
        state.config.review_threshold,
    )
    .await?;
    Ok(Json(response))
}

/// POST /api/v1/emails/parse/batch
pub async fn handle_parse_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchParseRequest>,
) -> Result<Json<BatchParseResponse>, AppError> {
    if req.emails.is_empty() {
        return Err(AppError::Validation(
            "emails must contain at least one email".to_string(),
        ));
    }
    if req.emails.len() > state.config.max_batch_size {
        return Err(AppError::PayloadTooLarge(format!(
            "batch of {} emails exceeds the limit of {}",
            req.emails.len(),
            state.config.max_batch_size
        )));
    }

    let threshold = state.config.review_threshold;
    let tasks: Vec<_> = req
        .emails
        .into_iter()
        .map(|email| tokio::spawn(parse_blocking(Arc::clone(&state.parser), email, threshold)))
        .collect();

    // Awaited in submission order so results line up with the request.
    let mut results = Vec::with_capacity(tasks.len());
    for task in tasks {
        let response = task
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("batch task failed: {e}")))??;
        results.push(response);
    }

    Ok(Json(BatchParseResponse { results }))
}
