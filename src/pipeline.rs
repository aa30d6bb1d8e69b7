// src/pipeline.rs

use std::sync::Arc;
use std::time::Instant;

use matchday_answers::{clarify, StructuredAnswerer};
use matchday_config::MatchdayConfig;
use matchday_core::{
    AnswerMethod, AskRequest, AskResponse, Intent, MatchdayResult, NluResult, Route,
};
use matchday_llm::{FallbackOutcome, FallbackResponder, LlmProvider, ResponseCache};
use matchday_nlu::{Catalog, NluEngine};
use matchday_observability::{ComponentStatus, HealthStatus, MetricType, MetricsCollector};
use parking_lot::RwLock;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

pub const EMPTY_MESSAGE_REPLY: &str = "Please provide a message.";

/// Process-scoped state behind the single `ask` entry point.
pub struct QueryPipeline {
    nlu: NluEngine,
    catalog: RwLock<Arc<Catalog>>,
    answerer: StructuredAnswerer,
    responder: FallbackResponder,
    cache: Option<ResponseCache>,
    metrics: Arc<MetricsCollector>,
}

impl QueryPipeline {
    /// Assembles the pipeline and loads the first catalog snapshot.
    pub async fn new(
        nlu: NluEngine,
        answerer: StructuredAnswerer,
        responder: FallbackResponder,
        cache: Option<ResponseCache>,
        metrics: Arc<MetricsCollector>,
    ) -> MatchdayResult<Self> {
        let pipeline = Self {
            nlu,
            catalog: RwLock::new(Arc::new(Catalog::default())),
            answerer,
            responder,
            cache,
            metrics,
        };
        pipeline.refresh_catalog().await?;
        Ok(pipeline)
    }

    /// Builds every component from configuration. `provider` replaces the
    /// environment-configured remote client when given.
    pub async fn from_config(
        config: &MatchdayConfig,
        provider: Option<Arc<dyn LlmProvider>>,
    ) -> MatchdayResult<Self> {
        let nlu = NluEngine::new(&config.nlu)?;
        let answerer = matchday_answers::build_answerer(&config.answers)?;

        let provider = match provider {
            Some(p) => Some(p),
            None => matchday_llm::provider_from_env(&config.llm)?,
        };
        let responder = FallbackResponder::new(&config.llm, provider)?;

        let cache = config
            .cache
            .enabled
            .then(|| ResponseCache::from_config(&config.cache));
        let metrics = Arc::new(MetricsCollector::with_config(config.observability.clone()));

        Self::new(nlu, answerer, responder, cache, metrics).await
    }

    /// Reloads team and player names from the store. On failure the previous
    /// snapshot stays in place.
    pub async fn refresh_catalog(&self) -> MatchdayResult<usize> {
        let store = self.answerer.store();
        let teams = store.team_names().await?;
        let players = store.player_names().await?;

        let catalog = Catalog::new(teams, players);
        let size = catalog.teams().len() + catalog.players().len();
        info!(
            store = store.name(),
            teams = catalog.teams().len(),
            players = catalog.players().len(),
            "Catalog refreshed"
        );

        *self.catalog.write() = Arc::new(catalog);
        Ok(size)
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.read().clone()
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    pub fn analyze(&self, text: &str) -> NluResult {
        self.nlu.analyze(text, &self.catalog())
    }

    /// Answers one request. Never fails: every error becomes a reply.
    pub async fn ask(&self, request: AskRequest) -> AskResponse {
        let request_id = Uuid::new_v4();
        let span = info_span!("ask", %request_id);

        async move {
            let started = Instant::now();
            let response = self.answer(request).await;
            self.metrics.record_answer(response.method, started.elapsed());

            info!(
                intent = %response.intent,
                confidence = response.confidence,
                method = response.method.as_str(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Request answered"
            );
            response
        }
        .instrument(span)
        .await
    }

    async fn answer(&self, request: AskRequest) -> AskResponse {
        let message = request.message.trim();
        if message.is_empty() {
            return respond(EMPTY_MESSAGE_REPLY, Intent::General, 0.0, AnswerMethod::Fallback);
        }

        let nlu = self.analyze(message);
        let intent = nlu.classification.intent;
        let confidence = nlu.classification.confidence;

        match nlu.route {
            Route::Structured => {
                let answer = self.answerer.answer(intent, &nlu.entities).await;
                if answer.is_unavailable() {
                    self.metrics.increment(MetricType::Errors);
                }
                respond(answer.text, intent, confidence, AnswerMethod::Structured)
            }
            Route::Clarify { required } => {
                debug!(required, found = nlu.entities.len(), "Asking for missing entities");
                respond(
                    clarify(intent, required),
                    intent,
                    confidence,
                    AnswerMethod::Structured,
                )
            }
            Route::Fallback => {
                let (answer, method) = self.fallback(message, intent, &request).await;
                respond(answer, intent, confidence, method)
            }
        }
    }

    async fn fallback(
        &self,
        message: &str,
        intent: Intent,
        request: &AskRequest,
    ) -> (String, AnswerMethod) {
        if let Some(answer) = self.responder.canned(message) {
            return (answer.to_string(), AnswerMethod::Fallback);
        }

        // Replies that depend on prior turns are never cached.
        let cache = self.cache.as_ref().filter(|_| request.history.is_empty());
        let key = ResponseCache::key(message, Some(intent));

        if let Some(cache) = cache {
            if let Some(answer) = cache.get(key) {
                debug!("Response cache hit");
                self.metrics.record_cache(true);
                return (answer, AnswerMethod::Llm);
            }
            self.metrics.record_cache(false);
        }

        let reply = self.responder.reply(message, &request.history).await;
        match reply.outcome {
            FallbackOutcome::Completed => {
                if let Some(cache) = cache {
                    cache.set(key, reply.answer.clone());
                }
            }
            FallbackOutcome::Failed => {
                self.metrics.record_remote_failure();
                warn!("Fallback degraded to apologetic reply");
            }
            FallbackOutcome::Canned | FallbackOutcome::NotConfigured => {}
        }

        let method = reply.method();
        (reply.answer, method)
    }

    pub fn health(&self) -> HealthStatus {
        let catalog = self.catalog();
        self.metrics.get_health_status(ComponentStatus {
            version: env!("CARGO_PKG_VERSION").to_string(),
            build_timestamp: option_env!("BUILD_TIMESTAMP").map(str::to_string),
            classifier_loaded: self.nlu.classifier().is_loaded(),
            llm_configured: self.responder.is_configured(),
            teams: catalog.teams().len(),
            players: catalog.players().len(),
        })
    }
}

fn respond(
    answer: impl Into<String>,
    intent: Intent,
    confidence: f32,
    method: AnswerMethod,
) -> AskResponse {
    AskResponse {
        answer: answer.into(),
        intent: intent.as_str().to_string(),
        confidence,
        method,
    }
}
