/// LLM Client — the single point of entry for all chat-completion gateway calls.
///
/// ARCHITECTURAL RULE: No other module may call the gateway directly.
/// Handlers hold an `Arc<dyn ChatCompletion>`; `LlmClient` is the production backend.
///
/// Model: google/gemini-3-flash-preview (hardcoded — do not make configurable to prevent drift)
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

const GATEWAY_API_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
/// The model used for every interview call.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "google/gemini-3-flash-preview";
const TEMPERATURE: f64 = 0.7;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM_GATEWAY_API_KEY is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited by the AI gateway")]
    RateLimited,

    #[error("AI gateway usage limit reached")]
    QuotaExceeded,

    #[error("AI Gateway error: {status}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No response from AI")]
    EmptyContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Conversation types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
            ChatRole::System => "system",
        }
    }
}

impl FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            "system" => Ok(ChatRole::System),
            other => Err(format!("unknown message role '{other}'")),
        }
    }
}

/// One turn of a conversation, both on the inbound API and on the gateway wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    #[cfg(test)]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// A fully assembled completion request: message list plus the phase's token cap.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

/// The chat-completion seam. Implement this to swap gateways without touching
/// the orchestrator or handlers.
///
/// Carried in `AppState` as `Arc<dyn ChatCompletion>`.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Sends one completion request and returns the model's text.
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gateway wire format (OpenAI-compatible)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct GatewayResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

/// Token accounting. Gateways report any subset of these, so every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

impl GatewayResponse {
    /// Extracts the content of the first choice, treating blank text as absent.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .filter(|text| !text.trim().is_empty())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Production gateway client. One attempt per call; the caller decides whether
/// to retry.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            base_url: base_url.unwrap_or_else(|| GATEWAY_API_URL.to_string()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.base_url
    }

    /// Makes a raw call to the gateway, returning the full response object.
    pub async fn call(&self, request: &ChatRequest) -> Result<GatewayResponse, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let body = GatewayRequest {
            model: MODEL,
            messages: &request.messages,
            temperature: TEMPERATURE,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), body));
        }

        let gateway_response: GatewayResponse = serde_json::from_str(&response.text().await?)?;

        if let Some(usage) = &gateway_response.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={:?}, completion_tokens={:?}, total_tokens={:?}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        Ok(gateway_response)
    }
}

#[async_trait]
impl ChatCompletion for LlmClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let response = self.call(request).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Maps a non-success gateway status onto the error taxonomy.
/// 429 and 402 carry their own variants so they reach the caller with the same status.
fn classify_failure(status: u16, body: String) -> LlmError {
    match status {
        429 => LlmError::RateLimited,
        402 => LlmError::QuotaExceeded,
        _ => {
            error!("AI Gateway error: {status} {body}");
            LlmError::Api {
                status,
                message: body,
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> LlmClient {
        LlmClient::new(Some("test-api-key".into()), Some(base_url.to_string())).unwrap()
    }

    fn test_request(max_tokens: u32) -> ChatRequest {
        ChatRequest {
            messages: vec![
                ChatMessage::system("You are an interviewer."),
                ChatMessage::user("Start the interview."),
            ],
            max_tokens,
        }
    }

    fn completion_body(content: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49}
        })
    }

    #[tokio::test]
    async fn complete_returns_first_choice_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("authorization", "Bearer test-api-key"))
            .and(body_partial_json(serde_json::json!({
                "model": MODEL,
                "temperature": 0.7,
                "max_tokens": 800,
                "messages": [
                    {"role": "system", "content": "You are an interviewer."},
                    {"role": "user", "content": "Start the interview."}
                ]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body(serde_json::json!("Hello, candidate!"))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let text = client.complete(&test_request(800)).await.unwrap();
        assert_eq!(text, "Hello, candidate!");
    }

    #[tokio::test]
    async fn rate_limit_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete(&test_request(800)).await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimited), "got: {err}");
    }

    #[tokio::test]
    async fn payment_required_maps_to_quota_exceeded() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(402))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete(&test_request(1500)).await.unwrap_err();
        assert!(matches!(err, LlmError::QuotaExceeded), "got: {err}");
    }

    #[tokio::test]
    async fn other_failure_status_keeps_status_code() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete(&test_request(800)).await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "overloaded");
            }
            other => panic!("expected Api error, got {other}"),
        }
    }

    #[tokio::test]
    async fn null_content_is_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body(serde_json::Value::Null)),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete(&test_request(800)).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent), "got: {err}");
    }

    #[tokio::test]
    async fn missing_choices_is_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete(&test_request(800)).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent), "got: {err}");
    }

    #[tokio::test]
    async fn partial_usage_block_still_returns_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "Hello!"}}],
                "usage": {"total_tokens": 12}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let text = client.complete(&test_request(800)).await.unwrap();
        assert_eq!(text, "Hello!");

        let response = client.call(&test_request(800)).await.unwrap();
        let usage = response.usage.unwrap();
        assert_eq!(usage.prompt_tokens, None);
        assert_eq!(usage.total_tokens, Some(12));
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = LlmClient::new(None, Some(server.uri())).unwrap();
        let err = client.complete(&test_request(800)).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
        assert_eq!(err.to_string(), "LLM_GATEWAY_API_KEY is not configured");
    }

    #[test]
    fn default_endpoint_is_the_gateway() {
        let client = LlmClient::new(Some("k".into()), None).unwrap();
        assert_eq!(client.endpoint(), GATEWAY_API_URL);
    }

    #[test]
    fn chat_role_round_trips_through_wire_names() {
        for role in [ChatRole::User, ChatRole::Assistant, ChatRole::System] {
            assert_eq!(role.as_str().parse::<ChatRole>().unwrap(), role);
        }
        assert!("moderator".parse::<ChatRole>().is_err());
    }
}
