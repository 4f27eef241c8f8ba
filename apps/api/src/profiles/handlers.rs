use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::extract::AppQuery;
use crate::models::profile::ProfileRow;
use crate::profiles::store;
use crate::sessions::handlers::UserIdQuery;
use crate::state::AppState;

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserIdQuery>,
) -> Result<Json<ProfileRow>, AppError> {
    let mut conn = state.db.acquire().await?;
    let profile = store::get_or_create_profile(&mut *conn, params.user_id).await?;
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::llm_client::testing::ScriptedChat;
    use crate::routes::build_router;
    use crate::state::AppState;

    #[tokio::test]
    async fn test_profile_with_malformed_user_id_is_a_json_400() {
        let db = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/interview_test")
            .unwrap();
        let app = build_router(AppState {
            db,
            llm: Arc::new(ScriptedChat::default()),
        });

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/profile?user_id=someone")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string(), "unexpected body: {body}");
    }
}
