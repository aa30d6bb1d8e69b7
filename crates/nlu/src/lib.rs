use std::{
    fs,
    path::{Path, PathBuf},
};

use matchday_core::{MatchdayError, MatchdayResult, NluResult};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

pub mod classifier;
pub mod entities;
pub mod gate;
pub mod linear;
pub mod patterns;

pub use classifier::{IntentClassifier, IntentModel};
pub use entities::{normalize, Catalog, EntityExtractor};
pub use gate::ConfidenceGate;
pub use linear::{LinearIntentModel, LinearModelArtifact};
pub use patterns::KeywordIntentModel;

const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NluConfig {
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    #[serde(default)]
    pub model: ModelSource,
}

/// Where the intent model comes from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSource {
    #[default]
    Keyword,
    Linear { artifact_path: PathBuf },
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            model: ModelSource::default(),
        }
    }
}

fn default_confidence_threshold() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

/// Classifier, entity extractor and gate run together for one request.
pub struct NluEngine {
    classifier: IntentClassifier,
    extractor: EntityExtractor,
    gate: ConfidenceGate,
}

impl NluEngine {
    pub fn new(config: &NluConfig) -> MatchdayResult<Self> {
        Self::with_classifier(
            IntentClassifier::load(&config.model),
            config.confidence_threshold,
        )
    }

    pub fn with_classifier(classifier: IntentClassifier, threshold: f32) -> MatchdayResult<Self> {
        Ok(Self {
            classifier,
            extractor: EntityExtractor::new()?,
            gate: ConfidenceGate::new(threshold),
        })
    }

    pub fn analyze(&self, text: &str, catalog: &Catalog) -> NluResult {
        let classification = self.classifier.classify(text);
        let entities =
            self.extractor
                .extract_for(text, classification.intent.requirement(), catalog);
        let route = self
            .gate
            .route(classification.intent, classification.confidence, &entities);

        debug!(
            intent = %classification.intent,
            confidence = classification.confidence,
            entities = ?entities.names,
            ?route,
            "NLU analysis complete"
        );

        NluResult {
            text: text.to_string(),
            classification,
            entities,
            route,
        }
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn threshold(&self) -> f32 {
        self.gate.threshold()
    }
}

/// Reads a JSON or YAML file, chosen by extension.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> MatchdayResult<T> {
    let contents = fs::read_to_string(path)
        .map_err(|e| MatchdayError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");

    if ext.eq_ignore_ascii_case("json") {
        serde_json::from_str(&contents)
            .map_err(|e| MatchdayError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    } else {
        serde_yaml::from_str(&contents)
            .map_err(|e| MatchdayError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }
}
