// src/commands.rs
use serde::{Deserialize, Serialize};

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Ask(String),
    Health,
    Stats,
    /// Prometheus text exposition of the request counters.
    Metrics,
    /// Clears the conversation history.
    Reset,
    /// Reloads the entity catalog from the store.
    Refresh,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(name) = line.strip_prefix('/') else {
            return Command::Ask(line.to_string());
        };

        match name.trim().to_ascii_lowercase().as_str() {
            "health" => Command::Health,
            "stats" => Command::Stats,
            "metrics" => Command::Metrics,
            "reset" => Command::Reset,
            "refresh" => Command::Refresh,
            "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

pub const HELP_TEXT: &str = "Commands: /health /stats /metrics /reset /refresh /quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slash_commands() {
        assert_eq!(Command::parse("/health"), Command::Health);
        assert_eq!(Command::parse("  /STATS "), Command::Stats);
        assert_eq!(Command::parse("/exit"), Command::Quit);
        assert_eq!(Command::parse("/metrics"), Command::Metrics);
        assert_eq!(
            Command::parse("/dance"),
            Command::Unknown("/dance".to_string())
        );
    }

    #[test]
    fn plain_text_is_a_question() {
        assert_eq!(
            Command::parse(" Who scored in Alpha FC vs Beta United? "),
            Command::Ask("Who scored in Alpha FC vs Beta United?".to_string())
        );
    }
}
