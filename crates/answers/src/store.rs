// crates/answers/src/store.rs

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use matchday_core::{
    same_name, FixtureRecord, MatchRecord, MatchdayError, MatchdayResult, PlayerRecord,
    StandingRecord, TeamRecord,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Read-only query surface over structured match data.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Every match between the two teams, in either home/away order.
    async fn matches_between(&self, a: &str, b: &str) -> MatchdayResult<Vec<MatchRecord>>;
    async fn player(&self, name: &str) -> MatchdayResult<Option<PlayerRecord>>;
    async fn players(&self) -> MatchdayResult<Vec<PlayerRecord>>;
    async fn standings(&self, team: &str) -> MatchdayResult<Vec<StandingRecord>>;
    async fn fixtures(&self, team: &str) -> MatchdayResult<Vec<FixtureRecord>>;
    async fn team_names(&self) -> MatchdayResult<Vec<String>>;
    async fn player_names(&self) -> MatchdayResult<Vec<String>>;
    fn name(&self) -> &str;
}

/// Serialized form of a full dataset file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub teams: Vec<TeamRecord>,
    #[serde(default)]
    pub players: Vec<PlayerRecord>,
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
    #[serde(default)]
    pub standings: Vec<StandingRecord>,
    #[serde(default)]
    pub fixtures: Vec<FixtureRecord>,
}

impl Dataset {
    /// Loads YAML, JSON or TOML, chosen by file extension (YAML otherwise).
    pub fn load(path: &Path) -> MatchdayResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            MatchdayError::Store(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let parsed = match ext.as_str() {
            "json" => serde_json::from_str(&contents).map_err(|e| e.to_string()),
            "toml" => toml::from_str(&contents).map_err(|e| e.to_string()),
            _ => serde_yaml::from_str(&contents).map_err(|e| e.to_string()),
        };

        parsed.map_err(|e| MatchdayError::Store(format!("Failed to parse {}: {}", path.display(), e)))
    }
}

/// Dataset held in memory for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    dataset: Dataset,
}

impl InMemoryStore {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    pub fn from_file(path: &Path) -> MatchdayResult<Self> {
        let dataset = Dataset::load(path)?;
        info!(
            path = %path.display(),
            teams = dataset.teams.len(),
            players = dataset.players.len(),
            matches = dataset.matches.len(),
            "Loaded match dataset"
        );
        Ok(Self::new(dataset))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn matches_between(&self, a: &str, b: &str) -> MatchdayResult<Vec<MatchRecord>> {
        Ok(self
            .dataset
            .matches
            .iter()
            .filter(|m| m.involves_pair(a, b))
            .cloned()
            .collect())
    }

    async fn player(&self, name: &str) -> MatchdayResult<Option<PlayerRecord>> {
        Ok(self
            .dataset
            .players
            .iter()
            .find(|p| same_name(&p.name, name))
            .cloned())
    }

    async fn players(&self) -> MatchdayResult<Vec<PlayerRecord>> {
        Ok(self.dataset.players.clone())
    }

    async fn standings(&self, team: &str) -> MatchdayResult<Vec<StandingRecord>> {
        Ok(self
            .dataset
            .standings
            .iter()
            .filter(|s| same_name(&s.team, team))
            .cloned()
            .collect())
    }

    async fn fixtures(&self, team: &str) -> MatchdayResult<Vec<FixtureRecord>> {
        Ok(self
            .dataset
            .fixtures
            .iter()
            .filter(|f| f.involves(team))
            .cloned()
            .collect())
    }

    /// Declared teams plus every match participant.
    async fn team_names(&self) -> MatchdayResult<Vec<String>> {
        let names = self
            .dataset
            .teams
            .iter()
            .map(|t| t.name.clone())
            .chain(
                self.dataset
                    .matches
                    .iter()
                    .flat_map(|m| [m.home.clone(), m.away.clone()]),
            )
            .collect::<BTreeSet<_>>();
        Ok(names.into_iter().collect())
    }

    async fn player_names(&self) -> MatchdayResult<Vec<String>> {
        let names = self
            .dataset
            .players
            .iter()
            .map(|p| p.name.clone())
            .collect::<BTreeSet<_>>();
        Ok(names.into_iter().collect())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const YAML: &str = r#"
teams:
  - name: Alpha FC
    stadium: Alpha Stadium
players:
  - name: Rodriguez
    team: Alpha FC
    goals: 12
matches:
  - id: 1
    home: Alpha FC
    away: Beta United
    home_score: 2
    away_score: 1
    date: 2024-11-01
    venue: Alpha Stadium
    competition: City Cup
    scorers:
      - { player: Rodriguez, minute: 34 }
"#;

    #[tokio::test]
    async fn loads_yaml_and_answers_queries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.yaml");
        fs::write(&path, YAML).unwrap();

        let store = InMemoryStore::from_file(&path).unwrap();

        assert_eq!(store.matches_between("beta united", "alpha fc").await.unwrap().len(), 1);
        assert_eq!(store.player("RODRIGUEZ").await.unwrap().unwrap().goals, 12);
        assert!(store.player("Nobody").await.unwrap().is_none());
        assert_eq!(
            store.team_names().await.unwrap(),
            vec!["Alpha FC".to_string(), "Beta United".to_string()]
        );
    }

    #[tokio::test]
    async fn loads_json_and_toml_by_extension() {
        let dir = tempdir().unwrap();

        let json_path = dir.path().join("data.json");
        fs::write(
            &json_path,
            r#"{"players": [{"name": "Smith", "team": "Beta United", "goals": 3}]}"#,
        )
        .unwrap();
        let store = InMemoryStore::from_file(&json_path).unwrap();
        assert_eq!(store.player_names().await.unwrap(), vec!["Smith".to_string()]);

        let toml_path = dir.path().join("data.toml");
        fs::write(
            &toml_path,
            "[[standings]]\nteam = \"Alpha FC\"\ncompetition = \"Premier League\"\nposition = 1\npoints = 80\n",
        )
        .unwrap();
        let store = InMemoryStore::from_file(&toml_path).unwrap();
        assert_eq!(store.standings("alpha fc").await.unwrap()[0].points, 80);
    }

    #[test]
    fn malformed_file_is_store_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(Dataset::load(&path), Err(MatchdayError::Store(_))));
        assert!(Dataset::load(&dir.path().join("missing.yaml")).is_err());
    }
}
