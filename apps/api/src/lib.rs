//! Resume scorecard service.
//!
//! Accepts a resume (text or uploaded file), asks a hosted LLM for a
//! structured assessment, and always answers a successful gateway call with a
//! complete `Scorecard`, falling back to a fixed one when the model's output
//! cannot be decoded.

pub mod analysis;
pub mod config;
pub mod errors;
pub mod intake;
pub mod llm_client;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;

pub use analysis::service::Analyzer;
pub use models::scorecard::Scorecard;
pub use routes::build_router;
pub use state::AppState;
