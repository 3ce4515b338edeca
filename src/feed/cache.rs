//! In-memory cache of rendered feed documents
//!
//! Entries are keyed by the full set of feed options and stamped with the time
//! they were generated. Freshness is judged against a [`CachePolicy`]; an
//! expired entry is kept so it can still be served when regeneration fails.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::FeedOptions;
use crate::clock::Clock;

/// How long a cached feed is considered fresh
pub const DEFAULT_TTL_SECS: i64 = 60 * 60;

/// Freshness rules for cached feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub ttl: Duration,
    /// Hand out an expired entry when a rebuild fails
    pub serve_stale_on_failure: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
            serve_stale_on_failure: true,
        }
    }
}

/// A rendered feed and the time it was generated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFeed {
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Feed cache shared by all requests of one process
pub struct FeedCache {
    entries: RwLock<HashMap<FeedOptions, CachedFeed>>,
    policy: CachePolicy,
    clock: Arc<dyn Clock>,
}

impl FeedCache {
    pub fn new(policy: CachePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            policy,
            clock,
        }
    }

    /// Cached content younger than the TTL
    pub fn get_fresh(&self, key: &FeedOptions) -> Option<String> {
        let now = self.clock.now();
        self.entries
            .read()
            .get(key)
            .filter(|cached| now - cached.timestamp <= self.policy.ttl)
            .map(|cached| cached.content.clone())
    }

    /// Cached content of any age, if the policy allows serving stale entries
    pub fn get_stale(&self, key: &FeedOptions) -> Option<String> {
        if !self.policy.serve_stale_on_failure {
            return None;
        }
        self.entries
            .read()
            .get(key)
            .map(|cached| cached.content.clone())
    }

    /// Store freshly generated content, replacing whatever was there
    pub fn put(&self, key: FeedOptions, content: String) {
        let cached = CachedFeed {
            content,
            timestamp: self.clock.now(),
        };
        self.entries.write().insert(key, cached);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::feed::FeedFormat;

    fn cache(policy: CachePolicy) -> (Arc<ManualClock>, FeedCache) {
        let clock = Arc::new(ManualClock::default());
        let cache = FeedCache::new(policy, clock.clone());
        (clock, cache)
    }

    #[test]
    fn test_fresh_until_ttl() {
        let (clock, cache) = cache(CachePolicy::default());
        let key = FeedOptions::new(FeedFormat::Rss, 20, false);
        cache.put(key, "<rss/>".to_string());

        clock.advance(Duration::minutes(59));
        assert_eq!(cache.get_fresh(&key).as_deref(), Some("<rss/>"));

        clock.advance(Duration::minutes(2));
        assert_eq!(cache.get_fresh(&key), None);
        assert_eq!(cache.get_stale(&key).as_deref(), Some("<rss/>"));
    }

    #[test]
    fn test_keys_are_independent() {
        let (_clock, cache) = cache(CachePolicy::default());
        let rss = FeedOptions::new(FeedFormat::Rss, 20, false);
        let full = FeedOptions::new(FeedFormat::Rss, 20, true);
        cache.put(rss, "summary".to_string());

        assert_eq!(cache.get_fresh(&full), None);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stale_disabled_by_policy() {
        let policy = CachePolicy {
            serve_stale_on_failure: false,
            ..CachePolicy::default()
        };
        let (_clock, cache) = cache(policy);
        let key = FeedOptions::new(FeedFormat::Json, 5, false);
        cache.put(key, "{}".to_string());
        assert_eq!(cache.get_stale(&key), None);
    }
}
