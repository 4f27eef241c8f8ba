use std::sync::Arc;

use sqlx::PgPool;

use crate::llm_client::ChatCompletion;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Chat-completion backend. Production: `LlmClient`; tests swap in a scripted one.
    pub llm: Arc<dyn ChatCompletion>,
}
