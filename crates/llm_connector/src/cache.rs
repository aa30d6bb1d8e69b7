use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use matchday_core::Intent;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
    pub ttl_s: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 1000,
            ttl_s: 3600,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    answer: String,
    created_at: Instant,
    last_access: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<u64, CacheEntry>,
    tick: u64,
}

impl CacheState {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

/// Bounded in-memory answer cache: entries expire after `ttl` and the least
/// recently accessed entry is evicted when full. One lock per operation.
#[derive(Debug)]
pub struct ResponseCache {
    max_entries: usize,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl ResponseCache {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            max_entries: max_entries.max(1),
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, Duration::from_secs(config.ttl_s))
    }

    /// Hash of the whitespace-collapsed, lowercased text and the intent.
    pub fn key(text: &str, intent: Option<Intent>) -> u64 {
        let normalized = text
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");

        let mut hasher = DefaultHasher::new();
        normalized.hash(&mut hasher);
        intent.map(Intent::as_str).hash(&mut hasher);
        hasher.finish()
    }

    pub fn get(&self, key: u64) -> Option<String> {
        let mut state = self.state.lock();
        let tick = state.next_tick();

        let expired = match state.entries.get_mut(&key) {
            Some(entry) if entry.created_at.elapsed() <= self.ttl => {
                entry.last_access = tick;
                return Some(entry.answer.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            debug!(key, "Dropping expired cache entry");
            state.entries.remove(&key);
        }
        None
    }

    pub fn set(&self, key: u64, answer: impl Into<String>) {
        let mut state = self.state.lock();
        let tick = state.next_tick();

        if !state.entries.contains_key(&key) && state.entries.len() >= self.max_entries {
            let victim = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(k, _)| *k);
            if let Some(victim) = victim {
                debug!(key = victim, "Evicting least recently used cache entry");
                state.entries.remove(&victim);
            }
        }

        state.entries.insert(
            key,
            CacheEntry {
                answer: answer.into(),
                created_at: Instant::now(),
                last_access: tick,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_returns_value() {
        let cache = ResponseCache::new(10, Duration::from_secs(60));
        let key = ResponseCache::key("Who won the 2010 World Cup?", None);
        cache.set(key, "Spain");
        assert_eq!(cache.get(key).as_deref(), Some("Spain"));
    }

    #[tokio::test]
    async fn expired_entries_are_absent_and_removed() {
        let cache = ResponseCache::new(10, Duration::from_millis(20));
        let key = ResponseCache::key("question", Some(Intent::General));
        cache.set(key, "answer");

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(cache.get(key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn full_cache_evicts_least_recently_accessed() {
        let cache = ResponseCache::new(3, Duration::from_secs(60));
        cache.set(1, "one");
        cache.set(2, "two");
        cache.set(3, "three");

        // Touch the oldest insert so "two" becomes least recently accessed.
        assert!(cache.get(1).is_some());

        cache.set(4, "four");

        assert_eq!(cache.len(), 3);
        assert!(cache.get(2).is_none());
        assert_eq!(cache.get(1).as_deref(), Some("one"));
        assert_eq!(cache.get(3).as_deref(), Some("three"));
        assert_eq!(cache.get(4).as_deref(), Some("four"));
    }

    #[test]
    fn overwriting_existing_key_does_not_evict() {
        let cache = ResponseCache::new(2, Duration::from_secs(60));
        cache.set(1, "one");
        cache.set(2, "two");
        cache.set(2, "deux");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(1).as_deref(), Some("one"));
        assert_eq!(cache.get(2).as_deref(), Some("deux"));
    }

    #[test]
    fn key_normalises_text_and_includes_intent() {
        let a = ResponseCache::key("  Who won   THE cup? ", None);
        let b = ResponseCache::key("who won the cup?", None);
        let c = ResponseCache::key("who won the cup?", Some(Intent::General));
        assert_eq!(a, b);
        assert_ne!(b, c);
    }
}
