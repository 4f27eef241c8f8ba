//! Axum route handler for the stateless interview-chat endpoint.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::interview::orchestrator::{run_turn, ChatAction, ChatReply, ChatTurn};
use crate::llm_client::ChatMessage;
use crate::state::AppState;

/// Request body, camelCase on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewChatRequest {
    /// Accepted for tracing only; the orchestrator never reads storage.
    #[serde(default)]
    pub interview_id: Option<String>,
    pub role_type: String,
    pub difficulty: String,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub action: ChatAction,
}

/// POST /functions/v1/interview-chat
///
/// Returns `{message}` for start/respond, the feedback object for end,
/// or `{error}` with 429 / 402 / 500 when the gateway call fails.
pub async fn handle_interview_chat(
    State(state): State<AppState>,
    AppJson(request): AppJson<InterviewChatRequest>,
) -> Result<Json<ChatReply>, AppError> {

    info!(
        "interview-chat {:?} for interview {}",
        request.action,
        request.interview_id.as_deref().unwrap_or("-")
    );

    let turn = ChatTurn {
        role_type: &request.role_type,
        difficulty: &request.difficulty,
        job_description: request.job_description.as_deref(),
        transcript: &request.messages,
        action: request.action,
    };

    let reply = run_turn(state.llm.as_ref(), &turn).await?;
    Ok(Json(reply))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::interview::feedback::InterviewFeedback;
    use crate::llm_client::testing::ScriptedChat;
    use crate::llm_client::LlmError;
    use crate::routes::build_router;
    use crate::state::AppState;

    fn app(llm: Arc<ScriptedChat>) -> axum::Router {
        // The chat endpoint never touches the pool, so a lazy one is enough.
        let db = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/interview_test")
            .unwrap();
        build_router(AppState { db, llm })
    }

    async fn post_chat(llm: Arc<ScriptedChat>, body: Value) -> (StatusCode, Value) {
        let response = app(llm)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/functions/v1/interview-chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn chat_body(action: &str) -> Value {
        json!({
            "interviewId": "7d0c2f9e-5d0b-4a55-9d47-1a2b3c4d5e6f",
            "roleType": "frontend",
            "difficulty": "beginner",
            "messages": [
                {"role": "assistant", "content": "Welcome! What is a closure?"},
                {"role": "user", "content": "A function with its lexical scope."}
            ],
            "action": action
        })
    }

    #[tokio::test]
    async fn test_start_returns_message() {
        let llm = Arc::new(ScriptedChat::replying("Welcome! Let's begin."));
        let (status, body) = post_chat(llm.clone(), chat_body("start")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Welcome! Let's begin."}));
        // start drops the supplied transcript: system + instruction only
        assert_eq!(llm.recorded()[0].messages.len(), 2);
    }

    #[tokio::test]
    async fn test_end_with_garbage_output_returns_fallback() {
        let llm = Arc::new(ScriptedChat::replying("Great job overall!"));
        let (status, body) = post_chat(llm, chat_body("end")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::to_value(InterviewFeedback::fallback()).unwrap()
        );
    }

    #[tokio::test]
    async fn test_upstream_statuses_are_propagated() {
        let cases = [
            (LlmError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (LlmError::QuotaExceeded, StatusCode::PAYMENT_REQUIRED),
            (
                LlmError::Api {
                    status: 502,
                    message: "bad gateway".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (LlmError::EmptyContent, StatusCode::INTERNAL_SERVER_ERROR),
            (LlmError::MissingApiKey, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let llm = Arc::new(ScriptedChat::failing(err));
            let (status, body) = post_chat(llm, chat_body("respond")).await;
            assert_eq!(status, expected);
            assert!(body["error"].is_string(), "missing error field: {body}");
        }
    }

    #[tokio::test]
    async fn test_missing_messages_defaults_to_empty_transcript() {
        let llm = Arc::new(ScriptedChat::replying("Next question."));
        let (status, _) = post_chat(
            llm.clone(),
            json!({"roleType": "data", "difficulty": "advanced", "action": "respond"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(llm.recorded()[0].messages.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_action_is_rejected() {
        let llm = Arc::new(ScriptedChat::replying("unused"));
        let (status, body) = post_chat(llm.clone(), chat_body("pause")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert!(llm.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_preflight_returns_cors_headers() {
        let llm = Arc::new(ScriptedChat::replying("unused"));
        let response = app(llm)
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/functions/v1/interview-chat")
                    .header(header::ORIGIN, "https://example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(
                        header::ACCESS_CONTROL_REQUEST_HEADERS,
                        "authorization, content-type",
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
        let allowed = response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS]
            .to_str()
            .unwrap()
            .to_string();
        assert!(allowed.contains("x-client-info"));
        assert!(allowed.contains("apikey"));
    }
}
