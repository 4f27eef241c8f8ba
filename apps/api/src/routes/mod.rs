pub mod health;

use axum::{
    http::{header::HeaderName, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::interview::handlers::handle_interview_chat;
use crate::profiles::handlers::handle_get_profile;
use crate::sessions::handlers;
use crate::state::AppState;

/// Any origin may call the API; preflight answers with an empty 200.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            HeaderName::from_static("content-type"),
        ])
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless orchestrator
        .route("/functions/v1/interview-chat", post(handle_interview_chat))
        .route("/api/v1/interview-chat", post(handle_interview_chat))
        // Sessions
        .route(
            "/api/v1/interviews",
            get(handlers::handle_list_interviews).post(handlers::handle_create_interview),
        )
        .route("/api/v1/interviews/:id", get(handlers::handle_get_interview))
        .route(
            "/api/v1/interviews/:id/start",
            post(handlers::handle_start_interview),
        )
        .route("/api/v1/interviews/:id/answer", post(handlers::handle_answer))
        .route(
            "/api/v1/interviews/:id/end",
            post(handlers::handle_end_interview),
        )
        // Credits
        .route("/api/v1/profile", get(handle_get_profile))
        .layer(cors_layer())
        .with_state(state)
}
