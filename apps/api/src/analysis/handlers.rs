//! Axum route handlers for the Analysis API.

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::models::scorecard::Scorecard;
use crate::models::upload::{AnalysisRequest, UploadCandidate};
use crate::state::AppState;

/// Multipart field carrying the resume file.
pub const FILE_FIELD: &str = "file";

/// POST /api/v1/analyze-resume
///
/// Analyzes already-extracted resume text. Always answers with a complete
/// scorecard when the gateway call itself succeeds. Undecodable bodies are
/// answered in the error envelope rather than axum's plain-text rejection.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<Scorecard>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let analysis = state.analyzer.analyze_text(request.text()).await?;
    Ok(Json(analysis.scorecard))
}

/// POST /api/v1/resumes/analyze
///
/// Multipart upload: validates type and size, decodes the file as text, then
/// runs the same analysis as `handle_analyze_text`.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Scorecard>, AppError> {
    let candidate = read_upload(&mut multipart).await?;
    info!("Received upload '{}' ({})", candidate.file_name, candidate.mime_type);

    let analysis = state.analyzer.analyze_upload(&candidate).await?;
    Ok(Json(analysis.scorecard))
}

async fn read_upload(multipart: &mut Multipart) -> Result<UploadCandidate, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("resume").to_string();
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let content = field.bytes().await.map_err(multipart_error)?;
        return Ok(UploadCandidate::new(file_name, mime_type, content));
    }

    Err(AppError::BadRequest(format!(
        "multipart field '{FILE_FIELD}' is required"
    )))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge
    } else {
        AppError::BadRequest(e.body_text())
    }
}
