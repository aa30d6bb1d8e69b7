use std::collections::{HashMap, VecDeque};

use matchday_core::AnswerMethod;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::MetricsSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    TotalRequests,
    StructuredAnswers,
    FallbackAnswers,
    LlmAnswers,
    CacheHits,
    CacheMisses,
    RemoteFailures,
    Errors,
}

impl MetricType {
    pub fn for_method(method: AnswerMethod) -> Self {
        match method {
            AnswerMethod::Structured => MetricType::StructuredAnswers,
            AnswerMethod::Fallback => MetricType::FallbackAnswers,
            AnswerMethod::Llm => MetricType::LlmAnswers,
        }
    }
}

#[derive(Default)]
pub struct Metrics {
    values: RwLock<HashMap<MetricType, f64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, metric: MetricType, value: f64) {
        let mut values = self.values.write();
        *values.entry(metric).or_insert(0.0) += value;
    }

    pub fn increment(&self, metric: MetricType) {
        self.add(metric, 1.0);
    }

    pub fn get_summary(&self) -> MetricsSummary {
        let values = self.values.read();
        let count = |metric| values.get(&metric).copied().unwrap_or_default() as u64;

        MetricsSummary {
            total_requests: count(MetricType::TotalRequests),
            structured_answers: count(MetricType::StructuredAnswers),
            fallback_answers: count(MetricType::FallbackAnswers),
            llm_answers: count(MetricType::LlmAnswers),
            cache_hits: count(MetricType::CacheHits),
            cache_misses: count(MetricType::CacheMisses),
            remote_failures: count(MetricType::RemoteFailures),
            errors: count(MetricType::Errors),
        }
    }
}

/// Bounded log of request durations.
pub struct LatencyMonitor {
    capacity: usize,
    window: usize,
    samples: Mutex<VecDeque<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatencyStats {
    pub samples: usize,
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl LatencyMonitor {
    /// Keeps the last `capacity` samples; stats cover the last `window`.
    pub fn new(capacity: usize, window: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            window: window.clamp(1, capacity),
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn record(&self, duration_ms: f64) {
        let mut samples = self.samples.lock();
        if samples.len() == self.capacity {
            samples.pop_front();
        }
        samples.push_back(duration_ms);
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> LatencyStats {
        let samples = self.samples.lock();
        let recent = samples
            .iter()
            .skip(samples.len().saturating_sub(self.window))
            .copied()
            .collect::<Vec<_>>();

        if recent.is_empty() {
            return LatencyStats::default();
        }

        LatencyStats {
            samples: recent.len(),
            avg_ms: recent.iter().sum::<f64>() / recent.len() as f64,
            min_ms: recent.iter().copied().fold(f64::INFINITY, f64::min),
            max_ms: recent.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_per_method() {
        let metrics = Metrics::new();
        metrics.increment(MetricType::for_method(AnswerMethod::Structured));
        metrics.increment(MetricType::for_method(AnswerMethod::Structured));
        metrics.increment(MetricType::for_method(AnswerMethod::Llm));

        let summary = metrics.get_summary();
        assert_eq!(summary.structured_answers, 2);
        assert_eq!(summary.llm_answers, 1);
        assert_eq!(summary.fallback_answers, 0);
    }

    #[test]
    fn latency_log_is_bounded() {
        let monitor = LatencyMonitor::new(5, 3);
        for ms in 1..=8 {
            monitor.record(ms as f64);
        }
        assert_eq!(monitor.len(), 5);

        let stats = monitor.stats();
        assert_eq!(stats.samples, 3);
        assert_eq!(stats.min_ms, 6.0);
        assert_eq!(stats.max_ms, 8.0);
        assert!((stats.avg_ms - 7.0).abs() < 1e-9);
    }

    #[test]
    fn empty_monitor_reports_zeroes() {
        assert_eq!(LatencyMonitor::new(10, 5).stats(), LatencyStats::default());
    }
}
