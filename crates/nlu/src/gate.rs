// crates/nlu/src/gate.rs

use matchday_core::{EntityMatch, Intent, Route};
use tracing::debug;

/// Decides between the structured path and the fallback path.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceGate {
    threshold: f32,
}

impl ConfidenceGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Below-threshold or general intents always fall back. A confident
    /// structured intent missing entities gets a clarify route instead.
    pub fn route(&self, intent: Intent, confidence: f32, entities: &EntityMatch) -> Route {
        // Negated comparison so NaN confidence falls back.
        if intent.is_general() || !(confidence >= self.threshold) {
            debug!(%intent, confidence, threshold = self.threshold, "Routing to fallback");
            return Route::Fallback;
        }

        let required = intent.requirement().count();
        if entities.len() < required {
            debug!(%intent, found = entities.len(), required, "Routing to clarify prompt");
            return Route::Clarify { required };
        }

        debug!(%intent, confidence, "Routing to structured answer");
        Route::Structured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchday_core::{EntityKind, EntitySource};

    fn teams(names: &[&str]) -> EntityMatch {
        EntityMatch {
            kind: EntityKind::Team,
            source: EntitySource::Catalog,
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    #[test]
    fn below_threshold_never_structured() {
        let gate = ConfidenceGate::new(0.6);
        let pair = teams(&["Alpha FC", "Beta United"]);
        for intent in Intent::ALL {
            for confidence in [0.0, 0.1, 0.3, 0.59, 0.5999] {
                assert_eq!(gate.route(intent, confidence, &pair), Route::Fallback);
            }
        }
        assert_eq!(gate.route(Intent::Score, f32::NAN, &pair), Route::Fallback);
    }

    #[test]
    fn general_always_falls_back() {
        let gate = ConfidenceGate::new(0.6);
        assert_eq!(gate.route(Intent::General, 1.0, &teams(&[])), Route::Fallback);
    }

    #[test]
    fn threshold_is_inclusive() {
        let gate = ConfidenceGate::new(0.6);
        let pair = teams(&["Alpha FC", "Beta United"]);
        assert_eq!(gate.route(Intent::Score, 0.6, &pair), Route::Structured);
    }

    #[test]
    fn missing_entities_route_to_clarify() {
        let gate = ConfidenceGate::new(0.6);
        assert_eq!(
            gate.route(Intent::Score, 0.95, &teams(&["Alpha FC"])),
            Route::Clarify { required: 2 }
        );
        assert_eq!(
            gate.route(Intent::TeamRanking, 0.95, &teams(&[])),
            Route::Clarify { required: 1 }
        );
    }

    #[test]
    fn league_wide_intents_need_no_entities() {
        let gate = ConfidenceGate::new(0.4);
        assert_eq!(
            gate.route(Intent::LeagueTopScorer, 0.95, &teams(&[])),
            Route::Structured
        );
    }
}
