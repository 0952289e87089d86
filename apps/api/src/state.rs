use crate::analysis::service::Analyzer;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    pub config: Config,
}
