// crates/llm_connector/src/openrouter.rs

use std::time::Duration;

use async_trait::async_trait;
use matchday_core::{MatchdayError, MatchdayResult};
use reqwest::Client;
use serde_json::{json, Value};

use crate::{CompletionRequest, CompletionResponse, LlmConfig, LlmProvider, Usage};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// OpenAI-compatible chat completions client (OpenRouter by default).
pub struct OpenRouterProvider {
    config: LlmConfig,
    client: Client,
    api_key: String,
}

impl OpenRouterProvider {
    pub fn new(config: LlmConfig, api_key: String) -> MatchdayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_s))
            .build()
            .map_err(|e| MatchdayError::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    async fn complete(&self, request: CompletionRequest) -> MatchdayResult<CompletionResponse> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.config.model,
                "messages": request.messages,
                "max_tokens": request.max_tokens.unwrap_or(self.config.max_tokens),
                "temperature": request.temperature.unwrap_or(self.config.temperature),
                "top_p": request.top_p.unwrap_or(self.config.top_p),
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MatchdayError::Timeout(self.config.timeout_s * 1000)
                } else {
                    MatchdayError::Network(format!("Request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(MatchdayError::Llm(format!("API error {}: {}", status, text)));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| MatchdayError::Llm(format!("Failed to parse response: {}", e)))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .trim()
            .to_string();

        if content.is_empty() {
            return Err(MatchdayError::Llm("Empty completion".to_string()));
        }

        let usage = Usage {
            prompt_tokens: json["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as usize,
            completion_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0) as usize,
            total_tokens: json["usage"]["total_tokens"].as_u64().unwrap_or(0) as usize,
        };

        Ok(CompletionResponse { content, usage })
    }

    fn name(&self) -> &str {
        "OpenRouter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchday_core::ChatTurn;

    fn provider(base_url: String) -> OpenRouterProvider {
        let config = LlmConfig {
            base_url: Some(base_url),
            model: "test-model".to_string(),
            ..LlmConfig::default()
        };
        OpenRouterProvider::new(config, "test-key".to_string()).unwrap()
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new(vec![ChatTurn::user("Who won the 2010 World Cup?")])
    }

    #[tokio::test]
    async fn returns_trimmed_completion_with_usage() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "choices": [{"message": {"role": "assistant", "content": "  Spain won it.  "}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
            }"#,
            )
            .create_async()
            .await;

        let response = provider(server.url()).complete(request()).await.unwrap();

        assert_eq!(response.content, "Spain won it.");
        assert_eq!(response.usage.total_tokens, 16);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let err = provider(server.url()).complete(request()).await.unwrap_err();
        assert!(matches!(err, MatchdayError::Llm(_)));
    }

    #[tokio::test]
    async fn empty_completion_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": "   "}}]}"#)
            .create_async()
            .await;

        assert!(provider(server.url()).complete(request()).await.is_err());
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let p = provider("http://localhost:9999/v1/".to_string());
        assert_eq!(p.endpoint(), "http://localhost:9999/v1/chat/completions");
    }
}
