// crates/core/src/rules.rs

use regex::{Regex, RegexBuilder};

use crate::{MatchdayError, MatchdayResult};

/// Text predicate evaluated case-insensitively against raw input.
#[derive(Debug, Clone)]
pub struct Predicate {
    regex: Regex,
}

impl Predicate {
    /// Matches when any keyword or phrase occurs as whole words.
    pub fn keywords(words: &[&str]) -> MatchdayResult<Self> {
        if words.is_empty() {
            return Err(MatchdayError::Config(
                "Keyword predicate needs at least one keyword".to_string(),
            ));
        }
        let mut variants = words.iter().map(|w| w.trim().to_lowercase()).collect::<Vec<_>>();
        variants.sort_by(|a, b| b.len().cmp(&a.len()));
        let escaped = variants
            .iter()
            .map(|v| regex::escape(v).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");
        Self::pattern(&format!(r"\b(?:{})\b", escaped))
    }

    pub fn pattern(pattern: &str) -> MatchdayResult<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .unicode(true)
            .build()
            .map_err(|e| MatchdayError::Config(format!("Invalid rule pattern '{}': {}", pattern, e)))?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

#[derive(Debug, Clone)]
pub struct Rule<T> {
    pub name: String,
    pub predicate: Predicate,
    pub value: T,
}

/// Ordered (predicate, value) pairs evaluated top to bottom; first match wins.
#[derive(Debug, Clone)]
pub struct RuleTable<T> {
    rules: Vec<Rule<T>>,
}

impl<T> Default for RuleTable<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T> RuleTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, predicate: Predicate, value: T) -> &mut Self {
        self.rules.push(Rule {
            name: name.into(),
            predicate,
            value,
        });
        self
    }

    pub fn first_match(&self, text: &str) -> Option<&Rule<T>> {
        self.rules.iter().find(|rule| rule.predicate.is_match(text))
    }

    pub fn rules(&self) -> &[Rule<T>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_respect_word_boundaries() {
        let greeting = Predicate::keywords(&["hi", "hello"]).unwrap();
        assert!(greeting.is_match("Hi there"));
        assert!(greeting.is_match("well, HELLO!"));
        assert!(!greeting.is_match("this is a question"));
    }

    #[test]
    fn phrases_tolerate_extra_whitespace() {
        let p = Predicate::keywords(&["top scorer"]).unwrap();
        assert!(p.is_match("who is the top   scorer?"));
        assert!(!p.is_match("who scored at the top"));
    }

    #[test]
    fn first_match_wins_in_table_order() {
        let mut table = RuleTable::new();
        table
            .push("specific", Predicate::keywords(&["top scorer"]).unwrap(), 1)
            .push("generic", Predicate::keywords(&["scorer"]).unwrap(), 2);

        assert_eq!(table.first_match("top scorer please").unwrap().value, 1);
        assert_eq!(table.first_match("any scorer").unwrap().value, 2);
        assert!(table.first_match("nothing here").is_none());
    }

    #[test]
    fn empty_keyword_list_is_rejected() {
        assert!(Predicate::keywords(&[]).is_err());
    }
}
