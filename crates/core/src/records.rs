// crates/core/src/records.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Case-insensitive name equality, Unicode aware. Every record lookup uses
/// this so pair, side and team checks agree on what a name is.
pub fn same_name(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerEntry {
    pub player: String,
    pub minute: u32,
}

/// A played match. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: u64,
    pub home: String,
    pub away: String,
    pub home_score: u32,
    pub away_score: u32,
    pub date: NaiveDate,
    pub venue: String,
    pub competition: String,
    #[serde(default)]
    pub scorers: Vec<ScorerEntry>,
}

impl MatchRecord {
    /// True when the two teams played each other, in either home/away order.
    pub fn involves_pair(&self, a: &str, b: &str) -> bool {
        (same_name(&self.home, a) && same_name(&self.away, b))
            || (same_name(&self.home, b) && same_name(&self.away, a))
    }

    pub fn involves(&self, team: &str) -> bool {
        same_name(&self.home, team) || same_name(&self.away, team)
    }

    /// Goals scored by `team` in this match, if it took part.
    pub fn goals_for(&self, team: &str) -> Option<u32> {
        if same_name(&self.home, team) {
            Some(self.home_score)
        } else if same_name(&self.away, team) {
            Some(self.away_score)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub stadium: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub team: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub appearances: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingRecord {
    pub team: String,
    pub competition: String,
    pub position: u32,
    pub points: u32,
    #[serde(default)]
    pub played: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub draws: u32,
    #[serde(default)]
    pub losses: u32,
}

/// A scheduled match without a result yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub home: String,
    pub away: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub venue: Option<String>,
    pub competition: String,
}

impl FixtureRecord {
    pub fn involves(&self, team: &str) -> bool {
        same_name(&self.home, team) || same_name(&self.away, team)
    }
}
