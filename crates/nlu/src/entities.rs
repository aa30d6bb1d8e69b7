// crates/nlu/src/entities.rs

use std::collections::HashSet;
use std::ops::Range;

use matchday_core::{
    EntityKind, EntityMatch, EntityRequirement, EntitySource, MatchdayError, MatchdayResult,
};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Known team and player names, ordered longest-first so a longer name is
/// tried before any shorter name it contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    teams: Vec<String>,
    players: Vec<String>,
}

impl Catalog {
    pub fn new<T, P>(teams: T, players: P) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            teams: ordered(teams),
            players: ordered(players),
        }
    }

    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty() && self.players.is_empty()
    }

    fn names(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Team => &self.teams,
            EntityKind::Player => &self.players,
        }
    }
}

fn ordered<I>(names: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut seen = HashSet::new();
    let mut names = names
        .into_iter()
        .map(Into::into)
        .map(|n: String| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert(normalize(n)))
        .collect::<Vec<_>>();
    names.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));
    names
}

/// Lowercase with runs of whitespace collapsed to one space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct EntityExtractor {
    separator: Regex,
}

impl EntityExtractor {
    pub fn new() -> MatchdayResult<Self> {
        // Left side drops a leading question ("what was the score of ..."),
        // right side drops a trailing verb ("... played?").
        let separator = RegexBuilder::new(
            r"^\s*(?:.*\b(?:of|in|between|for|about|was|is|did)\s+)?(.+?)\s+(?:vs\.?|v\.?|versus|against)\s+(.+?)(?:\s+(?:played|play|match|game|held))?\s*[?.!]*\s*$",
        )
        .case_insensitive(true)
        .build()
        .map_err(|e| MatchdayError::Config(format!("Invalid separator pattern: {}", e)))?;

        Ok(Self { separator })
    }

    /// Entities needed by an intent with the given requirement.
    pub fn extract_for(&self, text: &str, requirement: EntityRequirement, catalog: &Catalog) -> EntityMatch {
        match requirement {
            EntityRequirement::TeamPair => self.extract(text, catalog),
            EntityRequirement::Team => self.extract_teams(text, catalog, 1),
            EntityRequirement::Player => self.extract_player(text, catalog),
            EntityRequirement::None => EntityMatch::empty(EntityKind::Team),
        }
    }

    /// Up to two teams; falls back to the literal sides of a "vs" separator
    /// when the catalog yields fewer than two.
    pub fn extract(&self, text: &str, catalog: &Catalog) -> EntityMatch {
        let found = self.extract_teams(text, catalog, 2);
        if found.len() >= 2 {
            return found;
        }

        match self.split_on_separator(text) {
            Some((left, right)) => {
                debug!(left = %left, right = %right, "Using separator fallback for team pair");
                EntityMatch {
                    kind: EntityKind::Team,
                    source: EntitySource::Pattern,
                    names: vec![left, right],
                }
            }
            None => found,
        }
    }

    pub fn extract_teams(&self, text: &str, catalog: &Catalog, limit: usize) -> EntityMatch {
        scan(text, catalog, EntityKind::Team, limit)
    }

    pub fn extract_player(&self, text: &str, catalog: &Catalog) -> EntityMatch {
        scan(text, catalog, EntityKind::Player, 1)
    }

    fn split_on_separator(&self, text: &str) -> Option<(String, String)> {
        let caps = self.separator.captures(text)?;
        let left = team_side(caps.get(1)?.as_str(), true)?;
        let right = team_side(caps.get(2)?.as_str(), false)?;
        Some((left, right))
    }
}

/// Question and intent words that can open a clause before the team names.
const LEAD_WORDS: &[&str] = &[
    "who", "what", "which", "how", "when", "where", "was", "is", "were", "did", "does", "do",
    "has", "have", "had", "tell", "me", "score", "scored", "scores", "result", "final", "won",
    "beat", "lost", "played", "play",
];

/// Words that never name a team on their own.
const FILLER_WORDS: &[&str] = &[
    "the", "a", "an", "of", "in", "between", "for", "about", "match", "game", "team", "teams",
    "goal", "goals", "them", "us", "it",
];

/// Cleans one side of a separator split. `None` when nothing but question,
/// intent or stop words remain.
fn team_side(side: &str, strip_lead: bool) -> Option<String> {
    let mut words = side.split_whitespace().collect::<Vec<_>>();
    if strip_lead {
        let lead = words.iter().take_while(|w| is_one_of(w, LEAD_WORDS)).count();
        words.drain(..lead);
    }
    if words
        .iter()
        .all(|w| is_one_of(w, LEAD_WORDS) || is_one_of(w, FILLER_WORDS))
    {
        return None;
    }
    Some(words.join(" "))
}

fn is_one_of(word: &str, list: &[&str]) -> bool {
    let word = word
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    list.contains(&word.as_str())
}

fn scan(text: &str, catalog: &Catalog, kind: EntityKind, limit: usize) -> EntityMatch {
    let mut result = EntityMatch::empty(kind);
    if limit == 0 {
        return result;
    }

    let haystack = normalize(text);
    let mut consumed: Vec<Range<usize>> = Vec::new();

    for name in catalog.names(kind) {
        let needle = normalize(name);
        let hit = haystack
            .match_indices(&needle)
            .map(|(start, m)| start..start + m.len())
            .find(|span| !consumed.iter().any(|c| c.start < span.end && span.start < c.end));

        if let Some(span) = hit {
            consumed.push(span);
            result.names.push(name.clone());
            if result.names.len() == limit {
                break;
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(
            ["Alpha FC", "Beta United", "Beta", "Gamma Rovers"],
            ["Rodriguez", "Smith"],
        )
    }

    #[test]
    fn catalog_is_longest_first_and_deduplicated() {
        let catalog = Catalog::new(["Beta", "beta", "Beta United", "Alpha FC"], Vec::<String>::new());
        assert_eq!(catalog.teams(), ["Beta United", "Alpha FC", "Beta"]);
    }

    #[test]
    fn finds_both_teams_around_vs() {
        let extractor = EntityExtractor::new().unwrap();
        let result = extractor.extract("What was the score of Alpha FC vs Beta United?", &catalog());

        assert_eq!(result.source, EntitySource::Catalog);
        let names: HashSet<_> = result.names.iter().map(String::as_str).collect();
        assert_eq!(names, HashSet::from(["Alpha FC", "Beta United"]));
    }

    #[test]
    fn longer_name_shadows_its_substring() {
        let extractor = EntityExtractor::new().unwrap();
        let result = extractor.extract_teams("how did beta united do", &catalog(), 2);
        assert_eq!(result.names, vec!["Beta United".to_string()]);
    }

    #[test]
    fn matching_ignores_case_and_spacing() {
        let extractor = EntityExtractor::new().unwrap();
        let result = extractor.extract("ALPHA   fc against gamma rovers", &catalog());
        assert_eq!(result.len(), 2);
        assert!(result.names.contains(&"Alpha FC".to_string()));
        assert!(result.names.contains(&"Gamma Rovers".to_string()));
    }

    #[test]
    fn separator_fallback_keeps_unknown_names() {
        let extractor = EntityExtractor::new().unwrap();
        let result = extractor.extract("What was the score of Delta City vs Omega Town?", &catalog());

        assert_eq!(result.source, EntitySource::Pattern);
        assert_eq!(result.names, vec!["Delta City".to_string(), "Omega Town".to_string()]);
    }

    #[test]
    fn separator_fallback_drops_trailing_verb() {
        let extractor = EntityExtractor::new().unwrap();
        let result = extractor.extract("Where was Delta City vs Omega Town played?", &catalog());
        assert_eq!(result.pair(), Some(("Delta City", "Omega Town")));
    }

    #[test]
    fn question_words_are_not_team_names() {
        let extractor = EntityExtractor::new().unwrap();

        let result = extractor.extract("Who scored against Alpha FC?", &catalog());
        assert_eq!(result.names, vec!["Alpha FC".to_string()]);
        assert_eq!(result.source, EntitySource::Catalog);

        let result = extractor.extract("What was the score against Beta United?", &catalog());
        assert_eq!(result.names, vec!["Beta United".to_string()]);

        assert!(extractor.extract("What was the score vs them?", &catalog()).is_empty());
    }

    #[test]
    fn leading_question_clause_is_stripped_from_unknown_pair() {
        let extractor = EntityExtractor::new().unwrap();
        let result = extractor.extract("Who won Delta City against Omega Town?", &catalog());
        assert_eq!(result.pair(), Some(("Delta City", "Omega Town")));
    }

    #[test]
    fn any_two_catalog_teams_around_a_separator_are_found() {
        let teams = ["Alpha FC", "Beta", "Beta United", "Gamma Rovers", "Epsilon Athletic"];
        let catalog = Catalog::new(teams, Vec::<String>::new());
        let extractor = EntityExtractor::new().unwrap();
        let templates = [
            "What was the score of {a} {sep} {b}?",
            "Who scored in {a} {sep} {b}",
            "{a} {sep} {b}",
            "where was {a} {sep} {b} played?",
            "Tell me about   {a} {sep} {b} last season!",
        ];

        for a in teams {
            for b in teams.iter().copied().filter(|b| *b != a) {
                for sep in ["vs", "v", "versus", "against", "VS"] {
                    for template in templates {
                        let text = template
                            .replace("{a}", a)
                            .replace("{b}", b)
                            .replace("{sep}", sep);
                        for text in [text.clone(), text.to_lowercase()] {
                            let result = extractor.extract(&text, &catalog);
                            assert_eq!(result.source, EntitySource::Catalog, "{}", text);
                            let names: HashSet<_> = result.names.iter().map(String::as_str).collect();
                            assert_eq!(names, HashSet::from([a, b]), "{}", text);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn single_team_without_separator_is_partial() {
        let extractor = EntityExtractor::new().unwrap();
        let result = extractor.extract("What was the score of the Alpha FC game?", &catalog());
        assert_eq!(result.names, vec!["Alpha FC".to_string()]);
        assert_eq!(result.source, EntitySource::Catalog);
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let extractor = EntityExtractor::new().unwrap();
        assert!(extractor.extract("Hello there", &catalog()).is_empty());
        assert!(extractor.extract_player("Who is the best?", &catalog()).is_empty());
    }

    #[test]
    fn player_requirement_uses_player_catalog() {
        let extractor = EntityExtractor::new().unwrap();
        let result = extractor.extract_for(
            "How many goals has Rodriguez scored?",
            EntityRequirement::Player,
            &catalog(),
        );
        assert_eq!(result.kind, EntityKind::Player);
        assert_eq!(result.first(), Some("Rodriguez"));
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  Alpha \t FC\n"), "alpha fc");
    }
}
