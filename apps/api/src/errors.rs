use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::intake::validation::IntakeError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Malformed model output has no variant: it degrades to the fallback
/// scorecard in `analysis::normalizer`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("File too large")]
    FileTooLarge,

    #[error("Resume text is required")]
    MissingInput,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("AI service not configured")]
    ServiceMisconfigured,

    #[error("AI service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Rate limited by AI service")]
    RateLimited,

    #[error("AI service credits exhausted")]
    QuotaExhausted,

    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl AppError {
    /// Stable machine-readable code used in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidFileType(_) => "INVALID_FILE_TYPE",
            AppError::FileTooLarge => "FILE_TOO_LARGE",
            AppError::MissingInput => "MISSING_INPUT",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::ServiceMisconfigured => "SERVICE_NOT_CONFIGURED",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::RateLimited => "RATE_LIMITED",
            AppError::QuotaExhausted => "QUOTA_EXHAUSTED",
            AppError::Upstream(_) => "UPSTREAM_ERROR",
        }
    }

    /// Message safe to show the end user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidFileType(_) => "Please upload a PDF, DOC, DOCX, or TXT file".to_string(),
            AppError::FileTooLarge => "Please upload a file smaller than 5MB".to_string(),
            AppError::MissingInput => "Resume text is required".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::ServiceMisconfigured => "AI service not configured".to_string(),
            AppError::ServiceUnavailable(_) => {
                "AI service is currently unavailable. Please try again later.".to_string()
            }
            AppError::RateLimited => "Rate limit exceeded. Please try again in a moment.".to_string(),
            AppError::QuotaExhausted => {
                "AI service credits exhausted. Please add credits to continue.".to_string()
            }
            AppError::Upstream(_) => "Failed to analyze resume. Please try again.".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::MissingInput | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ServiceMisconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::QuotaExhausted => StatusCode::PAYMENT_REQUIRED,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::InvalidFileType { mime_type } => AppError::InvalidFileType(mime_type),
            IntakeError::FileTooLarge { .. } => AppError::FileTooLarge,
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::NotConfigured => AppError::ServiceMisconfigured,
            LlmError::Unavailable(e) => AppError::ServiceUnavailable(e.to_string()),
            LlmError::Unauthorized { status } => {
                AppError::ServiceUnavailable(format!("gateway rejected credentials ({status})"))
            }
            LlmError::RateLimited => AppError::RateLimited,
            LlmError::QuotaExhausted => AppError::QuotaExhausted,
            other @ (LlmError::Api { .. } | LlmError::MalformedEnvelope(_)) => {
                AppError::Upstream(other.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::ServiceMisconfigured => tracing::error!("LLM_API_KEY is not configured"),
            AppError::ServiceUnavailable(detail) => tracing::error!("AI service unavailable: {detail}"),
            AppError::Upstream(detail) => tracing::error!("AI gateway error: {detail}"),
            AppError::RateLimited | AppError::QuotaExhausted => {
                tracing::warn!("AI gateway refused request: {self}")
            }
            _ => {}
        }

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.user_message()
            }
        }));

        (self.status(), body).into_response()
    }
}
