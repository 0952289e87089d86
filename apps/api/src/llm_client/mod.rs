/// LLM Client: the single point of entry for chat-completion calls.
///
/// No other module may talk to the model gateway directly; everything goes
/// through `CompletionBackend`, which `LlmClient` implements over HTTP.
///
/// One request, one response: no retries. Throttling and billing signals from
/// the gateway are surfaced as distinct error variants for the caller.
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM API key is not configured")]
    NotConfigured,

    #[error("LLM gateway unreachable: {0}")]
    Unavailable(#[source] reqwest::Error),

    #[error("LLM gateway rejected credentials (status {status})")]
    Unauthorized { status: u16 },

    #[error("LLM gateway rate limit exceeded")]
    RateLimited,

    #[error("LLM gateway credits exhausted")]
    QuotaExhausted,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed gateway response: {0}")]
    MalformedEnvelope(String),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

/// Token counts; gateways that omit either one still decode.
#[derive(Debug, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct GatewayError {
    error: GatewayErrorBody,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    message: String,
}

/// Anything that can turn a system + user prompt into model text.
///
/// `LlmClient` is the production backend; tests substitute canned ones.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    gateway_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: Option<String>, gateway_url: String, model: String) -> Self {
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to build HTTP client"),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            gateway_url,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Makes a single call to the gateway, returning the full response object.
    pub async fn call(&self, system: &str, user: &str) -> Result<ChatResponse, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::NotConfigured)?;

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.gateway_url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(LlmError::Unavailable)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM gateway returned {}: {}", status, body);
            return Err(classify_failure(status, body));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedEnvelope(e.to_string()))?;

        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat)
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let response = self.call(system, user).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or_else(|| LlmError::MalformedEnvelope("response has no message content".into()))
    }
}

/// Maps a non-success gateway status to the error the caller sees.
fn classify_failure(status: StatusCode, body: String) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Unauthorized {
            status: status.as_u16(),
        },
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited,
        StatusCode::PAYMENT_REQUIRED => LlmError::QuotaExhausted,
        _ => {
            let message = serde_json::from_str::<GatewayError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            LlmError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rate_limit() {
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, String::new()),
            LlmError::RateLimited
        ));
    }

    #[test]
    fn test_classify_payment_required() {
        assert!(matches!(
            classify_failure(StatusCode::PAYMENT_REQUIRED, String::new()),
            LlmError::QuotaExhausted
        ));
    }

    #[test]
    fn test_classify_auth_failures() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            assert!(matches!(
                classify_failure(status, String::new()),
                LlmError::Unauthorized { .. }
            ));
        }
    }

    #[test]
    fn test_classify_other_extracts_gateway_message() {
        let body = r#"{"error": {"message": "model overloaded"}}"#.to_string();
        match classify_failure(StatusCode::INTERNAL_SERVER_ERROR, body) {
            LlmError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "model overloaded");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_classify_other_keeps_raw_body() {
        match classify_failure(StatusCode::BAD_GATEWAY, "upstream down".to_string()) {
            LlmError::Api { message, .. } => assert_eq!(message, "upstream down"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_response_text_takes_first_choice() {
        let json = r#"{"choices": [
            {"message": {"content": "first"}},
            {"message": {"content": "second"}}
        ]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), Some("first"));
    }

    #[test]
    fn test_partial_usage_still_decodes() {
        let body = r#"{
            "choices": [{"message": {"content": "{}"}}],
            "usage": {"total_tokens": 42}
        }"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), Some("{}"));
        let usage = response.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 0);
        assert_eq!(usage.completion_tokens, 0);
    }

    #[test]
    fn test_response_without_choices_has_no_text() {
        let response: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let client = LlmClient::new(
            Some("   ".to_string()),
            DEFAULT_GATEWAY_URL.to_string(),
            DEFAULT_MODEL.to_string(),
        );
        assert!(!client.is_configured());
    }

    #[tokio::test]
    async fn test_call_without_key_fails_before_network() {
        let client = LlmClient::new(
            None,
            "http://127.0.0.1:9/unreachable".to_string(),
            DEFAULT_MODEL.to_string(),
        );
        let err = client.complete("system", "user").await.unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured));
    }
}
