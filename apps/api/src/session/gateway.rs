//! How a session reaches the analysis service: in-process or over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::analysis::service::Analyzer;
use crate::errors::AppError;
use crate::models::scorecard::Scorecard;
use crate::models::upload::AnalysisRequest;

const ANALYZE_PATH: &str = "/api/v1/analyze-resume";

/// Failure of one analysis call, as seen by the presenter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisFailure {
    #[error("resume text is empty")]
    MissingInput,

    #[error("analysis service is not configured")]
    ServiceMisconfigured,

    #[error("analysis service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("rate limited")]
    RateLimited,

    #[error("credits exhausted")]
    QuotaExhausted,

    #[error("analysis failed: {0}")]
    Upstream(String),
}

impl AnalysisFailure {
    pub fn user_message(&self) -> &'static str {
        match self {
            AnalysisFailure::MissingInput => {
                "The uploaded file contains no text. Please upload a different file."
            }
            AnalysisFailure::ServiceMisconfigured => "AI service not configured",
            AnalysisFailure::ServiceUnavailable(_) => {
                "AI service is currently unavailable. Please try again later."
            }
            AnalysisFailure::RateLimited => "Rate limit exceeded. Please try again in a moment.",
            AnalysisFailure::QuotaExhausted => {
                "AI service credits exhausted. Please add credits to continue."
            }
            AnalysisFailure::Upstream(_) => {
                "There was an error analyzing your resume. Please try again."
            }
        }
    }
}

impl From<AppError> for AnalysisFailure {
    fn from(err: AppError) -> Self {
        match err {
            AppError::MissingInput => AnalysisFailure::MissingInput,
            AppError::ServiceMisconfigured => AnalysisFailure::ServiceMisconfigured,
            AppError::ServiceUnavailable(detail) => AnalysisFailure::ServiceUnavailable(detail),
            AppError::RateLimited => AnalysisFailure::RateLimited,
            AppError::QuotaExhausted => AnalysisFailure::QuotaExhausted,
            other => AnalysisFailure::Upstream(other.to_string()),
        }
    }
}

/// One round trip to the analysis service.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Scorecard, AnalysisFailure>;
}

/// Runs the analysis in the same process.
pub struct LocalGateway {
    analyzer: Analyzer,
}

impl LocalGateway {
    pub fn new(analyzer: Analyzer) -> Self {
        Self { analyzer }
    }
}

#[async_trait]
impl AnalysisGateway for LocalGateway {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Scorecard, AnalysisFailure> {
        let analysis = self.analyzer.analyze_text(request.text()).await?;
        Ok(analysis.scorecard)
    }
}

/// Calls a running service's `POST /api/v1/analyze-resume`.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AnalysisGateway for HttpGateway {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Scorecard, AnalysisFailure> {
        let url = format!("{}{}", self.base_url, ANALYZE_PATH);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AnalysisFailure::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Scorecard>()
                .await
                .map_err(|e| AnalysisFailure::Upstream(format!("undecodable scorecard: {e}")));
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Analysis service returned {}: {}", status, body);
        let envelope = serde_json::from_str::<ErrorEnvelope>(&body).ok();
        Err(classify_response(status.as_u16(), envelope))
    }
}

/// Maps an error response to a failure, preferring the envelope's code over
/// the bare status.
fn classify_response(status: u16, envelope: Option<ErrorEnvelope>) -> AnalysisFailure {
    if let Some(ErrorEnvelope { error }) = envelope {
        match error.code.as_str() {
            "MISSING_INPUT" => return AnalysisFailure::MissingInput,
            "SERVICE_NOT_CONFIGURED" => return AnalysisFailure::ServiceMisconfigured,
            "SERVICE_UNAVAILABLE" => return AnalysisFailure::ServiceUnavailable(error.message),
            "RATE_LIMITED" => return AnalysisFailure::RateLimited,
            "QUOTA_EXHAUSTED" => return AnalysisFailure::QuotaExhausted,
            _ => {}
        }
    }
    match status {
        429 => AnalysisFailure::RateLimited,
        402 => AnalysisFailure::QuotaExhausted,
        503 => AnalysisFailure::ServiceUnavailable(format!("status {status}")),
        _ => AnalysisFailure::Upstream(format!("status {status}")),
    }
}
