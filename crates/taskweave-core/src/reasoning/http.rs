//! HTTP reasoning backend — calls an Anthropic-style messages endpoint.
//!
//! Configuration is explicit; the core never reads ambient environment
//! state. The CLI (or any embedding server) resolves env vars and hands a
//! finished config in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::reasoning::Reasoning;

#[derive(Debug, Clone)]
pub struct HttpReasoningConfig {
    /// API base URL, e.g. `https://api.anthropic.com`.
    pub base_url: String,
    /// API key / auth token.
    pub api_key: String,
    /// Model ID.
    pub model: String,
    /// Maximum tokens for a reply.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpReasoningConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            api_key: String::new(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 2048,
            temperature: None,
            timeout_secs: 300,
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug)]
pub struct HttpReasoning {
    client: reqwest::Client,
    config: HttpReasoningConfig,
}

impl HttpReasoning {
    pub fn new(config: HttpReasoningConfig) -> Result<Self, CoreError> {
        if config.api_key.is_empty() {
            return Err(CoreError::Configuration(
                "HTTP reasoning backend requires an API key".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::Configuration(format!("HTTP client build failed: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Reasoning for HttpReasoning {
    async fn predict(&self, prompt: &str) -> Result<String, CoreError> {
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::Reasoning(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CoreError::Reasoning(format!(
                "endpoint returned {}: {}",
                status,
                detail.chars().take(300).collect::<String>()
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| CoreError::Reasoning(format!("unreadable response body: {}", e)))?;

        let text = parsed
            .content
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("");
        if text.is_empty() {
            return Err(CoreError::Reasoning("empty completion".to_string()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_a_configuration_error() {
        let err = HttpReasoning::new(HttpReasoningConfig::default()).unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));
    }

    #[test]
    fn test_request_body_shape() {
        let body = MessagesRequest {
            model: "m",
            max_tokens: 64,
            temperature: None,
            messages: vec![RequestMessage {
                role: "user",
                content: "hello",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "m");
        assert!(json.get("temperature").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
