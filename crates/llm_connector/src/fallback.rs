// crates/llm_connector/src/fallback.rs

use std::sync::Arc;
use std::time::Duration;

use matchday_core::{AnswerMethod, ChatTurn, MatchdayError, MatchdayResult, Predicate, RuleTable};
use tracing::{debug, warn};

use crate::{CompletionRequest, LlmConfig, LlmProvider, PromptBuilder};

pub const NOT_CONFIGURED_REPLY: &str = "I understand your question, but I'm optimized for specific sports queries. Try asking about match details like scores, stadiums, or tournaments!";
pub const APOLOGETIC_REPLY: &str = "I understand your question, but I'm not sure how to respond right now. Try asking about specific match details!";

/// How a fallback reply was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackOutcome {
    Canned,
    NotConfigured,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackReply {
    pub answer: String,
    pub outcome: FallbackOutcome,
}

impl FallbackReply {
    fn new(answer: impl Into<String>, outcome: FallbackOutcome) -> Self {
        Self {
            answer: answer.into(),
            outcome,
        }
    }

    pub fn method(&self) -> AnswerMethod {
        match self.outcome {
            FallbackOutcome::Completed => AnswerMethod::Llm,
            _ => AnswerMethod::Fallback,
        }
    }
}

/// Free-text responder: canned replies first, then one remote completion
/// bounded by a timeout. Never returns an error.
pub struct FallbackResponder {
    canned: RuleTable<&'static str>,
    provider: Option<Arc<dyn LlmProvider>>,
    prompt_builder: PromptBuilder,
    timeout: Duration,
    max_tokens: usize,
    temperature: f32,
}

impl FallbackResponder {
    pub fn new(config: &LlmConfig, provider: Option<Arc<dyn LlmProvider>>) -> MatchdayResult<Self> {
        Ok(Self {
            canned: canned_replies()?,
            provider,
            prompt_builder: PromptBuilder::new(config.system_prompt.clone()),
            timeout: Duration::from_secs(config.timeout_s),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Canned reply for greetings, help and thanks, if the text is one.
    pub fn canned(&self, text: &str) -> Option<&'static str> {
        self.canned.first_match(text).map(|rule| rule.value)
    }

    pub async fn reply(&self, text: &str, history: &[ChatTurn]) -> FallbackReply {
        if let Some(answer) = self.canned(text) {
            debug!("Answered with canned reply");
            return FallbackReply::new(answer, FallbackOutcome::Canned);
        }

        let Some(provider) = &self.provider else {
            return FallbackReply::new(NOT_CONFIGURED_REPLY, FallbackOutcome::NotConfigured);
        };

        match self.complete(provider.as_ref(), text, history).await {
            Ok(answer) => FallbackReply::new(answer, FallbackOutcome::Completed),
            Err(e) => {
                warn!(provider = provider.name(), "Remote completion failed: {}", e);
                FallbackReply::new(APOLOGETIC_REPLY, FallbackOutcome::Failed)
            }
        }
    }

    async fn complete(
        &self,
        provider: &dyn LlmProvider,
        text: &str,
        history: &[ChatTurn],
    ) -> MatchdayResult<String> {
        let mut request = CompletionRequest::new(self.prompt_builder.build_messages(text, history));
        request.max_tokens = Some(self.max_tokens);
        request.temperature = Some(self.temperature);

        let response = tokio::time::timeout(self.timeout, provider.complete(request))
            .await
            .map_err(|_| MatchdayError::Timeout(self.timeout.as_millis() as u64))??;

        let content = response.content.trim();
        if content.is_empty() {
            return Err(MatchdayError::Llm("Empty completion".to_string()));
        }
        Ok(content.to_string())
    }
}

fn canned_replies() -> MatchdayResult<RuleTable<&'static str>> {
    let mut table = RuleTable::new();
    table
        .push(
            "greeting",
            Predicate::keywords(&["hello", "hi", "hey", "greetings"])?,
            "Hello! I'm your sports assistant. Ask me about match scores, stadiums, dates, tournaments, or player stats!",
        )
        .push(
            "help",
            Predicate::keywords(&["help", "what can you do", "commands"])?,
            "I can help you with: match scores, stadium info, goal scorers, match dates, tournaments, team rankings, and top scorers. Try asking 'What was the score of Alpha FC vs Beta United?'",
        )
        .push(
            "thanks",
            Predicate::keywords(&["thanks", "thank you", "appreciate"])?,
            "You're welcome! Feel free to ask about any sports information.",
        );
    Ok(table)
}
