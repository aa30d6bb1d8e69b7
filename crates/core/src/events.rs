// crates/core/src/events.rs
use serde::{Deserialize, Serialize};

use crate::Intent;

/// Classifier output for one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub intent: Intent,
    pub confidence: f32,
}

impl ClassificationResult {
    pub fn new(intent: Intent, confidence: f32) -> Self {
        Self {
            intent,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Lowest-confidence "general" result returned when no model is available.
    pub fn neutral() -> Self {
        Self {
            intent: Intent::General,
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Team,
    Player,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitySource {
    /// Names taken verbatim from the known-entity catalog.
    Catalog,
    /// Literal text on both sides of a "vs" separator; may name unknown teams.
    Pattern,
}

/// Entities recognised in a request, in first-match priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMatch {
    pub kind: EntityKind,
    pub source: EntitySource,
    pub names: Vec<String>,
}

impl EntityMatch {
    pub fn empty(kind: EntityKind) -> Self {
        Self {
            kind,
            source: EntitySource::Catalog,
            names: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    pub fn pair(&self) -> Option<(&str, &str)> {
        match self.names.as_slice() {
            [a, b, ..] => Some((a.as_str(), b.as_str())),
            _ => None,
        }
    }
}

/// Confidence gate decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Structured,
    /// Confident structured intent that lacks entities; answered with a prompt
    /// asking for `required` of them.
    Clarify { required: usize },
    Fallback,
}

impl Route {
    pub fn is_structured(self) -> bool {
        matches!(self, Route::Structured | Route::Clarify { .. })
    }
}

/// Everything the NLU stage decided about one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NluResult {
    pub text: String,
    pub classification: ClassificationResult,
    pub entities: EntityMatch,
    pub route: Route,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerMethod {
    Structured,
    Fallback,
    Llm,
}

impl AnswerMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerMethod::Structured => "structured",
            AnswerMethod::Fallback => "fallback",
            AnswerMethod::Llm => "llm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Request accepted by the pipeline entry point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

impl AskRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub intent: String,
    pub confidence: f32,
    pub method: AnswerMethod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_request_history_is_optional() {
        let request: AskRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(request.message, "hi");
        assert!(request.history.is_empty());

        let request: AskRequest = serde_json::from_str(
            r#"{"message":"and the date?","history":[{"role":"user","content":"score?"},{"role":"assistant","content":"2-1"}]}"#,
        )
        .unwrap();
        assert_eq!(request.history.len(), 2);
        assert_eq!(request.history[1].role, Role::Assistant);
    }

    #[test]
    fn response_serialises_method_in_lowercase() {
        let response = AskResponse {
            answer: "Hello".to_string(),
            intent: "general".to_string(),
            confidence: 0.2,
            method: AnswerMethod::Fallback,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["method"], "fallback");
        assert_eq!(json["intent"], "general");
    }

    #[test]
    fn clarify_counts_as_structured_route() {
        assert!(Route::Clarify { required: 2 }.is_structured());
        assert!(!Route::Fallback.is_structured());
    }
}
