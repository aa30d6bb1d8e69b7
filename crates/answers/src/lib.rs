// crates/answers/src/lib.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use matchday_core::MatchdayResult;
use serde::{Deserialize, Serialize};

pub mod answerer;
pub mod store;

pub use answerer::{
    clarify, LookupStatus, StructuredAnswer, StructuredAnswerer, UNAVAILABLE_REPLY,
};
pub use store::{Dataset, InMemoryStore, MatchStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswersConfig {
    /// Dataset file (YAML, JSON or TOML).
    pub data_path: PathBuf,
    pub query_timeout_ms: u64,
    /// Fixed "today" for next-match answers; the local date when unset.
    pub reference_date: Option<NaiveDate>,
}

impl Default for AnswersConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/demo_matches.yaml"),
            query_timeout_ms: 2000,
            reference_date: None,
        }
    }
}

impl AnswersConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

/// Opens the configured dataset and builds an answerer over it.
pub fn build_answerer(config: &AnswersConfig) -> MatchdayResult<StructuredAnswerer> {
    let store = Arc::new(InMemoryStore::from_file(&config.data_path)?);
    Ok(StructuredAnswerer::new(store, config.query_timeout())
        .with_reference_date(config.reference_date))
}
