//! Chat-completion client for Azure OpenAI deployments

use crate::config::{AzureOpenAiCredentials, LlmSettings};
use crate::error::{CareerMentorError, Result};
use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(system: &str, user: String, temperature: f64) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Content of the user turn, if any.
    pub fn user_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
    }
}

/// A hosted chat-completion service.
///
/// Returns the assistant's text, trimmed. Transport, status and quota
/// failures surface as [`CareerMentorError::ExternalService`].
pub trait ChatClient {
    fn complete(&self, request: &ChatRequest) -> impl Future<Output = Result<String>> + Send;

    /// Identifier of the model or deployment answering requests.
    fn model_name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Surface the service's `error.message` when the body carries one.
fn completion_error(status: StatusCode, body: &str) -> CareerMentorError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    CareerMentorError::ExternalService(format!("Azure OpenAI returned {}: {}", status, message))
}

/// Azure OpenAI chat completions over REST, authenticated with an `api-key` header.
#[derive(Clone)]
pub struct AzureChatClient {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    deployment: String,
}

impl AzureChatClient {
    pub fn new(credentials: &AzureOpenAiCredentials, settings: &LlmSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| CareerMentorError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: credentials.endpoint.trim_end_matches('/').to_string(),
            api_key: credentials.api_key.clone(),
            api_version: credentials.api_version.clone(),
            deployment: credentials.deployment.clone(),
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

impl ChatClient for AzureChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let response = self
            .client
            .post(self.completions_url())
            .header("api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(completion_error(status, &body));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        debug!("Chat completion returned {} characters", content.len());
        Ok(content.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.deployment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest::new("You are helpful.", "Hi".to_string(), 0.3).with_max_tokens(500);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Hi");
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(request.user_prompt(), Some("Hi"));
    }

    #[test]
    fn test_max_tokens_omitted_when_unset() {
        let request = ChatRequest::new("sys", "user".to_string(), 0.3);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_completions_url() {
        let credentials = AzureOpenAiCredentials {
            endpoint: "https://mentor.openai.azure.com/".to_string(),
            api_key: "key".to_string(),
            api_version: "2024-02-01".to_string(),
            deployment: "gpt-4o".to_string(),
        };
        let client = AzureChatClient::new(&credentials, &LlmSettings::default()).unwrap();

        assert_eq!(
            client.completions_url(),
            "https://mentor.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-02-01"
        );
        assert_eq!(client.model_name(), "gpt-4o");
    }

    #[test]
    fn test_error_message_is_surfaced() {
        let body = r#"{"error": {"code": "429", "message": "Rate limit is exceeded. Try again in 20 seconds."}}"#;
        let err = completion_error(StatusCode::TOO_MANY_REQUESTS, body);

        match err {
            CareerMentorError::ExternalService(message) => {
                assert!(message.contains("429"));
                assert!(message.contains("Rate limit is exceeded"));
                assert!(!message.contains("\"code\""));
            }
            other => panic!("expected a service error, got {:?}", other),
        }
    }

    #[test]
    fn test_unstructured_error_body_is_kept() {
        let err = completion_error(StatusCode::BAD_GATEWAY, "  upstream unavailable\n");
        assert!(err.to_string().contains("502 Bad Gateway: upstream unavailable"));
    }

    #[test]
    fn test_completion_response_shape() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"  [\"SQL\"]  "}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("  [\"SQL\"]  "));
    }
}
