// crates/answers/src/answerer.rs

use std::cmp::Reverse;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use matchday_core::{
    same_name, EntityMatch, Intent, MatchRecord, MatchdayError, MatchdayResult, PlayerRecord,
    StandingRecord,
};
use tracing::{debug, warn};

use crate::store::MatchStore;

pub const UNAVAILABLE_REPLY: &str =
    "Match data is temporarily unavailable. Please try again in a moment.";

/// Whether the store could be consulted for an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStatus {
    /// Includes "not found" and clarify prompts.
    Answered,
    /// Store error or query timeout.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredAnswer {
    pub text: String,
    pub status: LookupStatus,
}

impl StructuredAnswer {
    fn answered(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: LookupStatus::Answered,
        }
    }

    fn unavailable() -> Self {
        Self {
            text: UNAVAILABLE_REPLY.to_string(),
            status: LookupStatus::Unavailable,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.status == LookupStatus::Unavailable
    }
}

/// Deterministic answers built only from store lookups. Missing data is an
/// answer string, never an error.
pub struct StructuredAnswerer {
    store: Arc<dyn MatchStore>,
    query_timeout: Duration,
    reference_date: Option<NaiveDate>,
}

impl StructuredAnswerer {
    pub fn new(store: Arc<dyn MatchStore>, query_timeout: Duration) -> Self {
        Self {
            store,
            query_timeout,
            reference_date: None,
        }
    }

    /// Pins "today" for next-match lookups.
    pub fn with_reference_date(mut self, date: Option<NaiveDate>) -> Self {
        self.reference_date = date;
        self
    }

    pub fn store(&self) -> &Arc<dyn MatchStore> {
        &self.store
    }

    pub async fn answer(&self, intent: Intent, entities: &EntityMatch) -> StructuredAnswer {
        let required = intent.requirement().count();
        if entities.len() < required {
            return StructuredAnswer::answered(clarify(intent, required));
        }

        let result = match intent {
            Intent::Score
            | Intent::Stadium
            | Intent::Scorers
            | Intent::Date
            | Intent::Tournament => match entities.pair() {
                Some((a, b)) => self.match_answer(intent, a, b).await,
                None => return StructuredAnswer::answered(clarify(intent, required)),
            },
            Intent::HeadToHead => match entities.pair() {
                Some((a, b)) => self.head_to_head(a, b).await,
                None => return StructuredAnswer::answered(clarify(intent, required)),
            },
            Intent::PlayerStats => match entities.first() {
                Some(player) => self.player_stats(player).await,
                None => return StructuredAnswer::answered(clarify(intent, required)),
            },
            Intent::TeamRanking => match entities.first() {
                Some(team) => self.team_ranking(team).await,
                None => return StructuredAnswer::answered(clarify(intent, required)),
            },
            Intent::NextMatch => match entities.first() {
                Some(team) => self.next_match(team).await,
                None => return StructuredAnswer::answered(clarify(intent, required)),
            },
            Intent::LeagueTopScorer => self.top_scorer().await,
            Intent::General => {
                return StructuredAnswer::answered(
                    "I recognize this as a general question, but I need more specific information to help you.",
                )
            }
        };

        match result {
            Ok(text) => StructuredAnswer::answered(text),
            Err(e) => {
                warn!(%intent, "Structured lookup failed: {}", e);
                StructuredAnswer::unavailable()
            }
        }
    }

    async fn query<T, F>(&self, fut: F) -> MatchdayResult<T>
    where
        F: Future<Output = MatchdayResult<T>>,
    {
        tokio::time::timeout(self.query_timeout, fut)
            .await
            .map_err(|_| MatchdayError::Timeout(self.query_timeout.as_millis() as u64))?
    }

    async fn match_answer(&self, intent: Intent, a: &str, b: &str) -> MatchdayResult<String> {
        let matches = self.query(self.store.matches_between(a, b)).await?;
        let Some(m) = most_recent(&matches) else {
            debug!(%intent, a, b, "No match record for pair");
            return Ok(not_found(intent, a, b));
        };

        Ok(match intent {
            Intent::Score => format!(
                "{} {}-{} {} ({})",
                m.home, m.home_score, m.away_score, m.away, m.competition
            ),
            Intent::Stadium => format!("The match was played at {}", m.venue),
            Intent::Scorers => format_scorers(m),
            Intent::Date => format!("The match was played on {}", m.date.format("%Y-%m-%d")),
            _ => format!("The match was part of the {}", m.competition),
        })
    }

    async fn head_to_head(&self, a: &str, b: &str) -> MatchdayResult<String> {
        let matches = self.query(self.store.matches_between(a, b)).await?;
        if matches.is_empty() {
            return Ok(format!("No head-to-head record found between {} and {}.", a, b));
        }

        let (mut a_wins, mut b_wins, mut draws) = (0, 0, 0);
        for m in &matches {
            let (Some(for_a), Some(for_b)) = (m.goals_for(a), m.goals_for(b)) else {
                continue;
            };
            match for_a.cmp(&for_b) {
                std::cmp::Ordering::Greater => a_wins += 1,
                std::cmp::Ordering::Less => b_wins += 1,
                std::cmp::Ordering::Equal => draws += 1,
            }
        }

        let (a, b) = display_pair(&matches[0], a, b);
        Ok(format!(
            "Head-to-head: {a} and {b} have met {} times. {a}: {a_wins} wins, {b}: {b_wins} wins, Draws: {draws}",
            matches.len()
        ))
    }

    async fn player_stats(&self, name: &str) -> MatchdayResult<String> {
        Ok(match self.query(self.store.player(name)).await? {
            Some(p) => format!(
                "{} ({}) - Position: {}, Goals: {}, Appearances: {}",
                p.name,
                p.team,
                p.position.as_deref().unwrap_or("Unknown"),
                p.goals,
                p.appearances
            ),
            None => format!("No statistics found for player {}.", name),
        })
    }

    async fn team_ranking(&self, team: &str) -> MatchdayResult<String> {
        let standings = self.query(self.store.standings(team)).await?;
        Ok(match best_standing(&standings) {
            Some(s) => format!(
                "{} is currently {} in the {} with {} points ({}W-{}D-{}L)",
                s.team,
                ordinal(s.position),
                s.competition,
                s.points,
                s.wins,
                s.draws,
                s.losses
            ),
            None => format!("No ranking information found for {}.", team),
        })
    }

    async fn next_match(&self, team: &str) -> MatchdayResult<String> {
        let today = self
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive());
        let fixtures = self.query(self.store.fixtures(team)).await?;

        let next = fixtures
            .iter()
            .filter(|f| f.date >= today)
            .min_by(|x, y| x.date.cmp(&y.date).then_with(|| x.home.cmp(&y.home)));

        Ok(match next {
            Some(f) => {
                let venue = f
                    .venue
                    .as_deref()
                    .map(|v| format!(" at {}", v))
                    .unwrap_or_default();
                format!(
                    "Next match: {} vs {} on {}{} ({})",
                    f.home,
                    f.away,
                    f.date.format("%Y-%m-%d"),
                    venue,
                    f.competition
                )
            }
            None => format!("No upcoming fixture found for {}.", team),
        })
    }

    async fn top_scorer(&self) -> MatchdayResult<String> {
        let players = self.query(self.store.players()).await?;
        Ok(match top_scorer(&players) {
            Some(p) => format!(
                "{} ({}) is the current top scorer with {} goals",
                p.name, p.team, p.goals
            ),
            None => "No top scorer information available.".to_string(),
        })
    }
}

/// Prompt returned when a confident intent lacks the entities it needs.
pub fn clarify(intent: Intent, required: usize) -> String {
    match (intent, required) {
        (Intent::PlayerStats, _) => "Please mention a player to get their statistics.".to_string(),
        (_, 2) => format!(
            "Please mention two teams to get the {} (e.g., 'Alpha FC vs Beta United').",
            subject(intent)
        ),
        _ => format!("Please mention a team to get its {}.", subject(intent)),
    }
}

fn subject(intent: Intent) -> &'static str {
    match intent {
        Intent::Score => "match score",
        Intent::Stadium => "stadium information",
        Intent::Scorers => "goal scorers",
        Intent::Date => "match date",
        Intent::Tournament => "tournament information",
        Intent::HeadToHead => "head-to-head record",
        Intent::TeamRanking => "ranking",
        Intent::NextMatch => "next match",
        Intent::PlayerStats => "player statistics",
        Intent::LeagueTopScorer => "top scorer",
        Intent::General => "answer",
    }
}

fn not_found(intent: Intent, a: &str, b: &str) -> String {
    let what = match intent {
        Intent::Score => "match data",
        Intent::Stadium => "stadium information",
        Intent::Scorers => "scorer information",
        Intent::Date => "match date",
        _ => "tournament information",
    };
    format!("No {} found for {} vs {}.", what, a, b)
}

/// Most recent by date; lowest id among same-day records.
fn most_recent(matches: &[MatchRecord]) -> Option<&MatchRecord> {
    matches.iter().min_by_key(|m| (Reverse(m.date), m.id))
}

/// Most points, then best position, then competition name.
fn best_standing(standings: &[StandingRecord]) -> Option<&StandingRecord> {
    standings.iter().min_by(|x, y| {
        y.points
            .cmp(&x.points)
            .then_with(|| x.position.cmp(&y.position))
            .then_with(|| x.competition.cmp(&y.competition))
    })
}

/// Most goals, then player name, then team name. Players without goals never win.
fn top_scorer(players: &[PlayerRecord]) -> Option<&PlayerRecord> {
    players.iter().filter(|p| p.goals > 0).min_by(|x, y| {
        y.goals
            .cmp(&x.goals)
            .then_with(|| x.name.cmp(&y.name))
            .then_with(|| x.team.cmp(&y.team))
    })
}

fn format_scorers(m: &MatchRecord) -> String {
    if m.scorers.is_empty() {
        return format!("No goals were scored in {} vs {}.", m.home, m.away);
    }
    let mut scorers = m.scorers.iter().collect::<Vec<_>>();
    // Stable sort keeps source order for same-minute goals.
    scorers.sort_by_key(|s| s.minute);
    let list = scorers
        .iter()
        .map(|s| format!("{} ({}')", s.player, s.minute))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Scorers: {}", list)
}

/// Canonical spelling from the record when the request used another case.
fn display_pair<'a>(m: &'a MatchRecord, a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    let canonical = |name: &'a str| -> &'a str {
        if same_name(&m.home, name) {
            &m.home
        } else if same_name(&m.away, name) {
            &m.away
        } else {
            name
        }
    };
    (canonical(a), canonical(b))
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
