// crates/observability/src/lib.rs

use std::time::{Duration, Instant};

use matchday_core::AnswerMethod;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub mod metrics;

pub use metrics::{LatencyMonitor, LatencyStats, MetricType, Metrics};

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
    pub service_name: String,
    /// Request durations kept in the latency log.
    pub latency_capacity: usize,
    /// Most recent durations summarised by the latency stats.
    pub latency_window: usize,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            service_name: "matchday".to_string(),
            latency_capacity: 1000,
            latency_window: 100,
        }
    }
}

struct PrometheusMetrics {
    registry: Registry,
    answers: IntCounterVec,
    cache_hits: IntCounter,
    cache_misses: IntCounter,
    remote_failures: IntCounter,
    request_duration: Histogram,
}

impl PrometheusMetrics {
    fn new(service_name: &str) -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some(service_name.replace('-', "_")), None)?;

        let answers = IntCounterVec::new(
            Opts::new("answers_total", "Answers produced, by method"),
            &["method"],
        )?;
        let cache_hits = IntCounter::new("cache_hits_total", "Response cache hits")?;
        let cache_misses = IntCounter::new("cache_misses_total", "Response cache misses")?;
        let remote_failures =
            IntCounter::new("remote_failures_total", "Failed remote completion calls")?;
        let request_duration = Histogram::with_opts(HistogramOpts::new(
            "request_duration_seconds",
            "End-to-end ask latency",
        ))?;

        registry.register(Box::new(answers.clone()))?;
        registry.register(Box::new(cache_hits.clone()))?;
        registry.register(Box::new(cache_misses.clone()))?;
        registry.register(Box::new(remote_failures.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            answers,
            cache_hits,
            cache_misses,
            remote_failures,
            request_duration,
        })
    }
}

/// Metrics collector
pub struct MetricsCollector {
    metrics: Metrics,
    latency: LatencyMonitor,
    prometheus: Option<PrometheusMetrics>,
    start_time: Instant,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::with_config(ObservabilityConfig::default())
    }

    pub fn with_config(config: ObservabilityConfig) -> Self {
        let prometheus = if config.metrics_enabled {
            match PrometheusMetrics::new(&config.service_name) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!("Prometheus registry unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            metrics: Metrics::new(),
            latency: LatencyMonitor::new(config.latency_capacity, config.latency_window),
            prometheus,
            start_time: Instant::now(),
        }
    }

    pub fn record_answer(&self, method: AnswerMethod, elapsed: Duration) {
        self.metrics.increment(MetricType::TotalRequests);
        self.metrics.increment(MetricType::for_method(method));
        self.latency.record(elapsed.as_secs_f64() * 1000.0);

        if let Some(p) = &self.prometheus {
            p.answers.with_label_values(&[method.as_str()]).inc();
            p.request_duration.observe(elapsed.as_secs_f64());
        }
    }

    pub fn record_cache(&self, hit: bool) {
        if hit {
            self.metrics.increment(MetricType::CacheHits);
        } else {
            self.metrics.increment(MetricType::CacheMisses);
        }
        if let Some(p) = &self.prometheus {
            if hit {
                p.cache_hits.inc();
            } else {
                p.cache_misses.inc();
            }
        }
    }

    pub fn record_remote_failure(&self) {
        self.metrics.increment(MetricType::RemoteFailures);
        if let Some(p) = &self.prometheus {
            p.remote_failures.inc();
        }
    }

    pub fn increment(&self, metric: MetricType) {
        self.metrics.increment(metric);
    }

    pub fn summary(&self) -> MetricsSummary {
        self.metrics.get_summary()
    }

    pub fn latency(&self) -> LatencyStats {
        self.latency.stats()
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn get_prometheus_metrics(&self) -> String {
        let Some(p) = &self.prometheus else {
            return String::new();
        };

        let encoder = TextEncoder::new();
        let mut buffer = vec![];
        if let Err(e) = encoder.encode(&p.registry.gather(), &mut buffer) {
            warn!("Failed to encode Prometheus metrics: {}", e);
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }

    pub fn get_health_status(&self, components: ComponentStatus) -> HealthStatus {
        HealthStatus {
            healthy: components.classifier_loaded,
            uptime_seconds: self.uptime().as_secs(),
            version: components.version,
            build_timestamp: components.build_timestamp,
            classifier_loaded: components.classifier_loaded,
            llm_configured: components.llm_configured,
            teams: components.teams,
            players: components.players,
            metrics: self.summary(),
            latency: self.latency(),
        }
    }
}

/// Pipeline component state reported alongside metrics in health checks.
#[derive(Debug, Clone, Default)]
pub struct ComponentStatus {
    pub version: String,
    pub build_timestamp: Option<String>,
    pub classifier_loaded: bool,
    pub llm_configured: bool,
    pub teams: usize,
    pub players: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub uptime_seconds: u64,
    pub version: String,
    pub build_timestamp: Option<String>,
    pub classifier_loaded: bool,
    pub llm_configured: bool,
    pub teams: usize,
    pub players: usize,
    pub metrics: MetricsSummary,
    pub latency: LatencyStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSummary {
    pub total_requests: u64,
    pub structured_answers: u64,
    pub fallback_answers: u64,
    pub llm_answers: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub remote_failures: u64,
    pub errors: u64,
}
