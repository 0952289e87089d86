use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version, and whether the LLM gateway key is set.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "scorecard-api",
        "model": state.config.llm_model,
        "llm_configured": state.config.llm_api_key.is_some()
    }))
}
