// crates/nlu/src/linear.rs

use std::collections::{HashMap, HashSet};
use std::path::Path;

use matchday_core::{ClassificationResult, Intent, MatchdayError, MatchdayResult};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::classifier::IntentModel;
use crate::load_config;

/// Offline-trained TF-IDF + logistic regression artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModelArtifact {
    pub labels: Vec<String>,
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f32>,
    pub coef: Vec<Vec<f32>>,
    pub intercept: Vec<f32>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub stop_words: Vec<String>,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 2)
}

/// Runtime form of [`LinearModelArtifact`], validated once at load.
pub struct LinearIntentModel {
    labels: Vec<Intent>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    coef: Vec<Vec<f32>>,
    intercept: Vec<f32>,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
    stop_words: HashSet<String>,
    token_pattern: Regex,
}

impl LinearIntentModel {
    pub fn load(path: &Path) -> MatchdayResult<Self> {
        let artifact: LinearModelArtifact = load_config(path)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: LinearModelArtifact) -> MatchdayResult<Self> {
        let labels = artifact
            .labels
            .iter()
            .map(|label| label.parse::<Intent>())
            .collect::<MatchdayResult<Vec<_>>>()?;

        if labels.len() < 2 {
            return Err(MatchdayError::Classifier(
                "Artifact must define at least two labels".to_string(),
            ));
        }

        let features = artifact.idf.len();
        if artifact.vocabulary.values().any(|&idx| idx >= features) {
            return Err(MatchdayError::Classifier(
                "Vocabulary index exceeds IDF vector length".to_string(),
            ));
        }

        // Binary models store one coefficient row for the positive class.
        let expected_rows = if labels.len() == 2 { 1..=2 } else { labels.len()..=labels.len() };
        if !expected_rows.contains(&artifact.coef.len()) {
            return Err(MatchdayError::Classifier(format!(
                "Expected coefficient rows for {} labels, found {}",
                labels.len(),
                artifact.coef.len()
            )));
        }
        if artifact.coef.iter().any(|row| row.len() != features) {
            return Err(MatchdayError::Classifier(
                "Coefficient row length does not match feature count".to_string(),
            ));
        }
        if artifact.intercept.len() != artifact.coef.len() {
            return Err(MatchdayError::Classifier(
                "Intercept length does not match coefficient rows".to_string(),
            ));
        }

        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(MatchdayError::Classifier(format!(
                "Invalid n-gram range ({}, {})",
                min_n, max_n
            )));
        }

        let token_pattern = Regex::new(r"\b\w\w+\b")
            .map_err(|e| MatchdayError::Classifier(format!("Invalid token pattern: {}", e)))?;

        debug!(
            labels = labels.len(),
            features, "Loaded linear intent model"
        );

        Ok(Self {
            labels,
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            coef: artifact.coef,
            intercept: artifact.intercept,
            ngram_range: artifact.ngram_range,
            sublinear_tf: artifact.sublinear_tf,
            stop_words: artifact.stop_words.into_iter().map(|w| w.to_lowercase()).collect(),
            token_pattern,
        })
    }

    pub fn labels(&self) -> &[Intent] {
        &self.labels
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.token_pattern
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .filter(|token| !self.stop_words.contains(token))
            .collect()
    }

    /// Sparse L2-normalised TF-IDF vector as (feature index, weight) pairs.
    fn features(&self, text: &str) -> Vec<(usize, f32)> {
        let tokens = self.tokens(text);
        let mut counts: HashMap<usize, f32> = HashMap::new();

        for n in self.ngram_range.0..=self.ngram_range.1 {
            if tokens.len() < n {
                break;
            }
            for window in tokens.windows(n) {
                let gram = window.join(" ");
                if let Some(&idx) = self.vocabulary.get(&gram) {
                    *counts.entry(idx).or_insert(0.0) += 1.0;
                }
            }
        }

        let mut weights = counts
            .into_iter()
            .map(|(idx, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (idx, tf * self.idf[idx])
            })
            .collect::<Vec<_>>();

        let norm = weights.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut weights {
                *w /= norm;
            }
        }
        weights.sort_by_key(|(idx, _)| *idx);
        weights
    }

    /// Class probability distribution in label order.
    pub fn probabilities(&self, text: &str) -> Vec<f32> {
        let features = self.features(text);
        let logits = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, bias)| bias + features.iter().map(|(idx, w)| row[*idx] * w).sum::<f32>())
            .collect::<Vec<_>>();

        if logits.len() == 1 {
            let p = 1.0 / (1.0 + (-logits[0]).exp());
            return vec![1.0 - p, p];
        }

        let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps = logits.iter().map(|l| (l - max).exp()).collect::<Vec<_>>();
        let total = exps.iter().sum::<f32>();
        exps.into_iter().map(|e| e / total).collect()
    }
}

impl IntentModel for LinearIntentModel {
    fn predict(&self, text: &str) -> MatchdayResult<ClassificationResult> {
        let probabilities = self.probabilities(text);

        // Strictly greater keeps the first-indexed class on ties.
        let mut best = 0;
        for (idx, p) in probabilities.iter().enumerate() {
            if *p > probabilities[best] {
                best = idx;
            }
        }

        let confidence = probabilities
            .get(best)
            .copied()
            .filter(|p| p.is_finite())
            .ok_or_else(|| MatchdayError::Classifier("Model produced no probabilities".to_string()))?;

        Ok(ClassificationResult::new(self.labels[best], confidence))
    }

    fn name(&self) -> &str {
        "LinearIntentModel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> LinearModelArtifact {
        let vocabulary = [("score", 0), ("stadium", 1), ("where", 2), ("the score", 3)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        LinearModelArtifact {
            labels: vec!["score".into(), "stadium".into(), "general".into()],
            vocabulary,
            idf: vec![1.5, 1.5, 1.2, 2.0],
            coef: vec![
                vec![4.0, -1.0, -0.5, 2.0],
                vec![-1.0, 4.0, 2.5, -1.0],
                vec![-1.0, -1.0, -1.0, -1.0],
            ],
            intercept: vec![0.0, 0.0, 0.5],
            ngram_range: (1, 2),
            sublinear_tf: false,
            stop_words: vec![],
        }
    }

    #[test]
    fn picks_highest_probability_class() {
        let model = LinearIntentModel::from_artifact(artifact()).unwrap();

        let score = model.predict("What was the score?").unwrap();
        assert_eq!(score.intent, Intent::Score);
        assert!(score.confidence > 0.5);

        let stadium = model.predict("Where is the stadium").unwrap();
        assert_eq!(stadium.intent, Intent::Stadium);
    }

    #[test]
    fn probabilities_form_a_distribution() {
        let model = LinearIntentModel::from_artifact(artifact()).unwrap();
        let probs = model.probabilities("score at the stadium");
        let total: f32 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn unknown_vocabulary_falls_back_to_intercepts() {
        let model = LinearIntentModel::from_artifact(artifact()).unwrap();
        let result = model.predict("tell me a joke").unwrap();
        assert_eq!(result.intent, Intent::General);
    }

    #[test]
    fn same_input_yields_same_output() {
        let model = LinearIntentModel::from_artifact(artifact()).unwrap();
        let a = model.predict("the score please").unwrap();
        let b = model.predict("the score please").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn binary_artifact_uses_sigmoid() {
        let mut binary = artifact();
        binary.labels = vec!["general".into(), "score".into()];
        binary.coef = vec![vec![3.0, 0.0, 0.0, 0.0]];
        binary.intercept = vec![-0.5];
        let model = LinearIntentModel::from_artifact(binary).unwrap();

        assert_eq!(model.predict("score").unwrap().intent, Intent::Score);
        assert_eq!(model.predict("hello").unwrap().intent, Intent::General);
    }

    #[test]
    fn rejects_inconsistent_shapes() {
        let mut broken = artifact();
        broken.coef[1].pop();
        assert!(LinearIntentModel::from_artifact(broken).is_err());

        let mut broken = artifact();
        broken.labels.push("weather".into());
        assert!(LinearIntentModel::from_artifact(broken).is_err());

        let mut broken = artifact();
        broken.vocabulary.insert("ghost".into(), 9);
        assert!(LinearIntentModel::from_artifact(broken).is_err());
    }
}
