pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::intake::validation::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Headroom over the file limit for multipart framing and JSON escaping, so
/// oversized files reach the validator instead of tripping the body limit.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES as usize + 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/analyze-resume",
            post(handlers::handle_analyze_text).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/v1/resumes/analyze",
            post(handlers::handle_analyze_upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .with_state(state)
}
