// crates/llm_connector/src/lib.rs

use std::sync::Arc;

use async_trait::async_trait;
use matchday_core::{ChatTurn, MatchdayResult};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub mod cache;
pub mod fallback;
pub mod openrouter;
pub mod prompt_builder;

pub use cache::{CacheConfig, ResponseCache};
pub use fallback::{FallbackOutcome, FallbackReply, FallbackResponder};
pub use openrouter::OpenRouterProvider;
pub use prompt_builder::PromptBuilder;

/// Remote generative service configuration. The credential itself is read
/// from the environment variable named by `api_key_env`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub api_key_env: String,
    pub base_url: Option<String>,
    pub max_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout_s: u64,
    pub system_prompt: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "tngtech/deepseek-r1t2-chimera:free".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            base_url: None,
            max_tokens: 150,
            temperature: 0.7,
            top_p: 0.95,
            timeout_s: 10,
            system_prompt: prompt_builder::DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Text-in, text-out completion service.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> MatchdayResult<CompletionResponse>;
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatTurn>,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatTurn>) -> Self {
        Self {
            messages,
            max_tokens: None,
            temperature: None,
            top_p: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub usage: Usage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// Builds the configured provider, or `None` when the credential is absent.
pub fn provider_from_env(config: &LlmConfig) -> MatchdayResult<Option<Arc<dyn LlmProvider>>> {
    let api_key = match std::env::var(&config.api_key_env) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            warn!(
                env = %config.api_key_env,
                "Remote generative service not configured; fallback replies stay local"
            );
            return Ok(None);
        }
    };

    let provider = OpenRouterProvider::new(config.clone(), api_key)?;
    info!(provider = provider.name(), model = %config.model, "Remote generative service configured");
    Ok(Some(Arc::new(provider)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_yields_no_provider() {
        let config = LlmConfig {
            api_key_env: "MATCHDAY_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmConfig::default()
        };
        assert!(provider_from_env(&config).unwrap().is_none());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: LlmConfig = serde_json::from_str(r#"{"model":"openrouter/auto"}"#).unwrap();
        assert_eq!(config.model, "openrouter/auto");
        assert_eq!(config.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.timeout_s, 10);
    }
}
