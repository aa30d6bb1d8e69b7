// crates/core/src/intent.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::MatchdayError;

/// Closed set of question categories the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Score,
    Stadium,
    Scorers,
    Date,
    Tournament,
    PlayerStats,
    TeamRanking,
    HeadToHead,
    NextMatch,
    LeagueTopScorer,
    General,
}

/// What an intent needs extracted from the text before it can be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRequirement {
    /// Two teams, e.g. "Alpha FC vs Beta United".
    TeamPair,
    Team,
    Player,
    None,
}

impl EntityRequirement {
    pub fn count(self) -> usize {
        match self {
            EntityRequirement::TeamPair => 2,
            EntityRequirement::Team | EntityRequirement::Player => 1,
            EntityRequirement::None => 0,
        }
    }
}

impl Intent {
    pub const ALL: [Intent; 11] = [
        Intent::Score,
        Intent::Stadium,
        Intent::Scorers,
        Intent::Date,
        Intent::Tournament,
        Intent::PlayerStats,
        Intent::TeamRanking,
        Intent::HeadToHead,
        Intent::NextMatch,
        Intent::LeagueTopScorer,
        Intent::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Score => "score",
            Intent::Stadium => "stadium",
            Intent::Scorers => "scorers",
            Intent::Date => "date",
            Intent::Tournament => "tournament",
            Intent::PlayerStats => "player_stats",
            Intent::TeamRanking => "team_ranking",
            Intent::HeadToHead => "head_to_head",
            Intent::NextMatch => "next_match",
            Intent::LeagueTopScorer => "league_top_scorer",
            Intent::General => "general",
        }
    }

    pub fn requirement(self) -> EntityRequirement {
        match self {
            Intent::Score
            | Intent::Stadium
            | Intent::Scorers
            | Intent::Date
            | Intent::Tournament
            | Intent::HeadToHead => EntityRequirement::TeamPair,
            Intent::TeamRanking | Intent::NextMatch => EntityRequirement::Team,
            Intent::PlayerStats => EntityRequirement::Player,
            Intent::LeagueTopScorer | Intent::General => EntityRequirement::None,
        }
    }

    pub fn is_general(self) -> bool {
        matches!(self, Intent::General)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = MatchdayError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = value.trim().to_lowercase();
        // Older artifacts label small talk as "chitchat".
        if key == "chitchat" {
            return Ok(Intent::General);
        }
        Intent::ALL
            .iter()
            .copied()
            .find(|intent| intent.as_str() == key)
            .ok_or_else(|| MatchdayError::Classifier(format!("Unknown intent label '{}'", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_str() {
        for intent in Intent::ALL {
            assert_eq!(intent.as_str().parse::<Intent>().unwrap(), intent);
        }
    }

    #[test]
    fn chitchat_maps_to_general() {
        assert_eq!("chitchat".parse::<Intent>().unwrap(), Intent::General);
        assert!("weather".parse::<Intent>().is_err());
    }

    #[test]
    fn requirements_follow_intent_scope() {
        assert_eq!(Intent::Score.requirement().count(), 2);
        assert_eq!(Intent::HeadToHead.requirement().count(), 2);
        assert_eq!(Intent::TeamRanking.requirement(), EntityRequirement::Team);
        assert_eq!(Intent::PlayerStats.requirement(), EntityRequirement::Player);
        assert_eq!(Intent::LeagueTopScorer.requirement().count(), 0);
    }
}
