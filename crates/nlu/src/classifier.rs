// crates/nlu/src/classifier.rs

use matchday_core::{ClassificationResult, MatchdayResult};
use tracing::{debug, warn};

use crate::linear::LinearIntentModel;
use crate::patterns::KeywordIntentModel;
use crate::ModelSource;

/// Text → (intent, confidence) model.
pub trait IntentModel: Send + Sync {
    fn predict(&self, text: &str) -> MatchdayResult<ClassificationResult>;
    fn name(&self) -> &str;
}

/// Holds at most one loaded model. Never fails: a missing or broken model
/// yields the neutral result so every request routes to fallback.
pub struct IntentClassifier {
    model: Option<Box<dyn IntentModel>>,
}

impl IntentClassifier {
    pub fn load(source: &ModelSource) -> Self {
        let model: MatchdayResult<Box<dyn IntentModel>> = match source {
            ModelSource::Keyword => {
                KeywordIntentModel::new().map(|m| Box::new(m) as Box<dyn IntentModel>)
            }
            ModelSource::Linear { artifact_path } => {
                LinearIntentModel::load(artifact_path).map(|m| Box::new(m) as Box<dyn IntentModel>)
            }
        };

        match model {
            Ok(model) => {
                debug!(model = model.name(), "Intent classifier loaded");
                Self { model: Some(model) }
            }
            Err(e) => {
                warn!("Intent classifier unavailable, all requests will fall back: {}", e);
                Self { model: None }
            }
        }
    }

    pub fn from_model(model: Box<dyn IntentModel>) -> Self {
        Self { model: Some(model) }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.name())
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        let Some(model) = &self.model else {
            return ClassificationResult::neutral();
        };

        match model.predict(text) {
            Ok(result) => result,
            Err(e) => {
                warn!(model = model.name(), "Classification failed: {}", e);
                ClassificationResult::neutral()
            }
        }
    }
}
