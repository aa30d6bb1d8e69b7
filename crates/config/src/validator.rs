// crates/config/src/validator.rs

use matchday_core::{MatchdayError, MatchdayResult};
use matchday_nlu::ModelSource;
use tracing::warn;

use crate::MatchdayConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &MatchdayConfig) -> MatchdayResult<()> {
        if !LOG_LEVELS.contains(&config.app.log_level.trim().to_ascii_lowercase().as_str()) {
            return Err(MatchdayError::Config(format!(
                "Unknown log level: {}",
                config.app.log_level
            )));
        }

        let threshold = config.nlu.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(MatchdayError::Config(
                "Confidence threshold must be 0.0-1.0".to_string(),
            ));
        }
        if let ModelSource::Linear { artifact_path } = &config.nlu.model {
            if !artifact_path.exists() {
                warn!("Classifier artifact does not exist: {:?}", artifact_path);
            }
        }

        if config.answers.query_timeout_ms == 0 {
            return Err(MatchdayError::Config("Query timeout must be > 0".to_string()));
        }
        if !config.answers.data_path.exists() {
            warn!("Dataset path does not exist: {:?}", config.answers.data_path);
        }

        if config.llm.model.trim().is_empty() {
            return Err(MatchdayError::Config("LLM model must not be empty".to_string()));
        }
        if config.llm.timeout_s == 0 {
            return Err(MatchdayError::Config("LLM timeout must be > 0".to_string()));
        }

        if config.cache.enabled {
            if config.cache.max_entries == 0 {
                return Err(MatchdayError::Config("Cache max_entries must be > 0".to_string()));
            }
            if config.cache.ttl_s == 0 {
                return Err(MatchdayError::Config("Cache TTL must be > 0".to_string()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ConfigValidator::validate(&MatchdayConfig::default()).is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases: Vec<Box<dyn Fn(&mut MatchdayConfig)>> = vec![
            Box::new(|c: &mut MatchdayConfig| c.nlu.confidence_threshold = -0.1),
            Box::new(|c: &mut MatchdayConfig| c.nlu.confidence_threshold = f32::NAN),
            Box::new(|c: &mut MatchdayConfig| c.answers.query_timeout_ms = 0),
            Box::new(|c: &mut MatchdayConfig| c.llm.model = " ".to_string()),
            Box::new(|c: &mut MatchdayConfig| c.llm.timeout_s = 0),
            Box::new(|c: &mut MatchdayConfig| c.cache.max_entries = 0),
            Box::new(|c: &mut MatchdayConfig| c.cache.ttl_s = 0),
            Box::new(|c: &mut MatchdayConfig| c.app.log_level = "loud".to_string()),
        ];

        for mutate in cases {
            let mut config = MatchdayConfig::default();
            mutate(&mut config);
            assert!(ConfigValidator::validate(&config).is_err());
        }
    }

    #[test]
    fn disabled_cache_skips_cache_checks() {
        let mut config = MatchdayConfig::default();
        config.cache.enabled = false;
        config.cache.max_entries = 0;
        assert!(ConfigValidator::validate(&config).is_ok());
    }
}
