// crates/config/src/loader.rs

use std::path::{Path, PathBuf};
use std::str::FromStr;

use matchday_core::{MatchdayError, MatchdayResult};
use matchday_nlu::ModelSource;
use tracing::debug;

use crate::MatchdayConfig;

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load_from_file(path: &Path) -> MatchdayResult<MatchdayConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MatchdayError::Config(format!("Failed to read config: {}", e)))?;

        let config: MatchdayConfig = toml::from_str(&content)
            .map_err(|e| MatchdayError::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    pub fn save_to_file(path: &Path, config: &MatchdayConfig) -> MatchdayResult<()> {
        let content = toml::to_string_pretty(config)
            .map_err(|e| MatchdayError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| MatchdayError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Defaults with environment overrides applied.
    pub fn load_from_env() -> MatchdayResult<MatchdayConfig> {
        let mut config = MatchdayConfig::default();
        Self::apply_env_overrides(&mut config)?;
        Ok(config)
    }

    pub fn apply_env_overrides(config: &mut MatchdayConfig) -> MatchdayResult<()> {
        Self::apply_overrides(config, |key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`; empty values are ignored.
    pub fn apply_overrides<F>(config: &mut MatchdayConfig, lookup: F) -> MatchdayResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(level) = var("MATCHDAY_LOG_LEVEL") {
            config.app.log_level = level;
        }
        if let Some(threshold) = var("MATCHDAY_CONFIDENCE_THRESHOLD") {
            config.nlu.confidence_threshold = parse("MATCHDAY_CONFIDENCE_THRESHOLD", &threshold)?;
        }
        if let Some(path) = var("MATCHDAY_DATA_PATH") {
            config.answers.data_path = PathBuf::from(path);
        }
        if let Some(path) = var("MATCHDAY_MODEL_PATH") {
            config.nlu.model = ModelSource::Linear {
                artifact_path: PathBuf::from(path),
            };
        }
        if let Some(model) = var("OPENROUTER_MODEL") {
            config.llm.model = model;
        }
        if let Some(url) = var("MATCHDAY_LLM_BASE_URL") {
            config.llm.base_url = Some(url);
        }
        if let Some(ttl) = var("MATCHDAY_CACHE_TTL_S") {
            config.cache.ttl_s = parse("MATCHDAY_CACHE_TTL_S", &ttl)?;
        }
        if let Some(max) = var("MATCHDAY_CACHE_MAX_ENTRIES") {
            config.cache.max_entries = parse("MATCHDAY_CACHE_MAX_ENTRIES", &max)?;
        }

        debug!("Environment overrides applied");
        Ok(())
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> MatchdayResult<T> {
    value
        .parse()
        .map_err(|_| MatchdayError::Config(format!("Invalid value for {}: {}", key, value)))
}
