// crates/nlu/src/patterns.rs

use matchday_core::{ClassificationResult, Intent, MatchdayResult, Predicate, RuleTable};

use crate::classifier::IntentModel;

const RULE_CONFIDENCE: f32 = 0.95;
const SEPARATOR_CONFIDENCE: f32 = 0.8;
const NO_MATCH_CONFIDENCE: f32 = 0.2;

/// Keyword rule model: an ordered table of (predicate, intent) pairs.
///
/// Order is the precedence. Narrow phrasings ("top scorer", "head to head")
/// sit above the broad single words they contain ("scorer", "league"), and
/// score wording outranks any venue, date or competition word in the same
/// question.
pub struct KeywordIntentModel {
    rules: RuleTable<(Intent, f32)>,
}

impl KeywordIntentModel {
    pub fn new() -> MatchdayResult<Self> {
        let mut rules = RuleTable::new();

        rules.push(
            "head_to_head",
            Predicate::keywords(&[
                "head to head",
                "head-to-head",
                "h2h",
                "historical record",
                "record between",
                "how many times have",
                "all time record",
            ])?,
            (Intent::HeadToHead, RULE_CONFIDENCE),
        );
        rules.push(
            "league_top_scorer",
            Predicate::keywords(&[
                "top scorer",
                "leading scorer",
                "highest scorer",
                "most goals",
                "golden boot",
                "top goalscorer",
            ])?,
            (Intent::LeagueTopScorer, RULE_CONFIDENCE),
        );
        rules.push(
            "next_match",
            Predicate::keywords(&[
                "next match",
                "next game",
                "next fixture",
                "upcoming match",
                "upcoming game",
                "play next",
                "playing next",
            ])?,
            (Intent::NextMatch, RULE_CONFIDENCE),
        );
        rules.push(
            "score",
            Predicate::keywords(&[
                "score",
                "scoreline",
                "result",
                "final",
                "won",
                "win",
                "beat",
                "lost",
                "lose",
                "defeat",
            ])?,
            (Intent::Score, RULE_CONFIDENCE),
        );
        rules.push(
            "team_ranking",
            Predicate::keywords(&[
                "ranking",
                "rank",
                "position",
                "table",
                "standing",
                "standings",
                "what place",
            ])?,
            (Intent::TeamRanking, RULE_CONFIDENCE),
        );
        rules.push(
            "player_stats",
            Predicate::keywords(&[
                "stats",
                "statistics",
                "how many goals",
                "goal record",
                "goal count",
                "appearances",
                "performance",
                "performing",
            ])?,
            (Intent::PlayerStats, RULE_CONFIDENCE),
        );
        rules.push(
            "scorers",
            Predicate::keywords(&[
                "scorer",
                "scorers",
                "who scored",
                "goalscorer",
                "goalscorers",
                "goal scorers",
                "scored by",
                "found the net",
            ])?,
            (Intent::Scorers, RULE_CONFIDENCE),
        );
        rules.push(
            "stadium",
            Predicate::pattern(
                r"\b(?:stadium|venue|ground|arena|location|hosted)\b|\bwhere\b.*\b(?:played|play|held)\b",
            )?,
            (Intent::Stadium, RULE_CONFIDENCE),
        );
        rules.push(
            "date",
            Predicate::keywords(&["date", "when", "what day", "played on"])?,
            (Intent::Date, RULE_CONFIDENCE),
        );
        rules.push(
            "tournament",
            Predicate::keywords(&["tournament", "competition", "league", "cup", "championship"])?,
            (Intent::Tournament, RULE_CONFIDENCE),
        );
        rules.push(
            "team_pair",
            Predicate::pattern(r"\s(?:vs\.?|v|versus|against)\s")?,
            (Intent::Score, SEPARATOR_CONFIDENCE),
        );

        Ok(Self { rules })
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.rules().iter().map(|r| r.name.as_str()).collect()
    }
}

impl IntentModel for KeywordIntentModel {
    fn predict(&self, text: &str) -> MatchdayResult<ClassificationResult> {
        Ok(match self.rules.first_match(text) {
            Some(rule) => ClassificationResult::new(rule.value.0, rule.value.1),
            None => ClassificationResult::new(Intent::General, NO_MATCH_CONFIDENCE),
        })
    }

    fn name(&self) -> &str {
        "KeywordIntentModel"
    }
}
