// crates/config/src/lib.rs

use matchday_core::MatchdayResult;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub mod loader;
pub mod validator;

pub use loader::ConfigLoader;
pub use matchday_answers::AnswersConfig;
pub use matchday_llm::{CacheConfig, LlmConfig};
pub use matchday_nlu::{ModelSource, NluConfig};
pub use matchday_observability::ObservabilityConfig;
pub use validator::ConfigValidator;

pub const DEFAULT_CONFIG_PATH: &str = "config/matchday.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchdayConfig {
    pub app: AppConfig,
    pub nlu: NluConfig,
    pub answers: AnswersConfig,
    pub llm: LlmConfig,
    pub cache: CacheConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    /// Conversation turns kept by the interactive CLI.
    pub max_history_turns: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            max_history_turns: 10,
        }
    }
}

/// Validated configuration shared across the process.
pub struct ConfigManager {
    config_path: PathBuf,
    config: Arc<RwLock<MatchdayConfig>>,
}

impl ConfigManager {
    /// Loads the file, applies environment overrides and validates.
    pub fn new(config_path: impl AsRef<Path>) -> MatchdayResult<Self> {
        let config_path = config_path.as_ref().to_path_buf();
        let mut config = ConfigLoader::load_from_file(&config_path)?;
        ConfigLoader::apply_env_overrides(&mut config)?;

        ConfigValidator::validate(&config)?;
        info!(path = %config_path.display(), "Configuration loaded");

        Ok(Self {
            config_path,
            config: Arc::new(RwLock::new(config)),
        })
    }

    /// Defaults plus environment overrides, for runs without a config file.
    pub fn from_env() -> MatchdayResult<Self> {
        let config = ConfigLoader::load_from_env()?;
        ConfigValidator::validate(&config)?;

        Ok(Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            config: Arc::new(RwLock::new(config)),
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            config: Arc::new(RwLock::new(MatchdayConfig::default())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn get(&self) -> MatchdayConfig {
        self.config.read().clone()
    }

    /// Applies `f` to a copy and keeps it only if it still validates.
    pub fn update<F>(&self, f: F) -> MatchdayResult<()>
    where
        F: FnOnce(&mut MatchdayConfig),
    {
        let mut candidate = self.get();
        f(&mut candidate);

        ConfigValidator::validate(&candidate)?;

        *self.config.write() = candidate;
        Ok(())
    }

    pub fn save(&self) -> MatchdayResult<()> {
        let config = self.config.read();
        ConfigLoader::save_to_file(&self.config_path, &config)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_file_fills_defaults() {
        let config: MatchdayConfig = toml::from_str(
            r#"
            [nlu]
            confidence_threshold = 0.4

            [cache]
            ttl_s = 60
            "#,
        )
        .unwrap();

        assert!((config.nlu.confidence_threshold - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.cache.ttl_s, 60);
        assert_eq!(config.cache.max_entries, 1000);
        assert_eq!(config.llm.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.nlu.model, ModelSource::Keyword);
    }

    #[test]
    fn update_rejects_invalid_changes() {
        let manager = ConfigManager::with_defaults();

        let result = manager.update(|c| c.nlu.confidence_threshold = 1.5);
        assert!(result.is_err());
        assert!((manager.get().nlu.confidence_threshold - 0.6).abs() < f32::EPSILON);

        manager.update(|c| c.cache.ttl_s = 120).unwrap();
        assert_eq!(manager.get().cache.ttl_s, 120);
    }

    #[test]
    fn save_then_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matchday.toml");
        std::fs::write(&path, "[app]\nmax_history_turns = 4\n").unwrap();

        let manager = ConfigManager::new(&path).unwrap();
        manager
            .update(|c| {
                c.nlu.model = ModelSource::Linear {
                    artifact_path: PathBuf::from("models/intent.json"),
                }
            })
            .unwrap();
        manager.save().unwrap();

        let reloaded = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(reloaded.app.max_history_turns, 4);
        assert_eq!(
            reloaded.nlu.model,
            ModelSource::Linear {
                artifact_path: PathBuf::from("models/intent.json")
            }
        );
    }
}
