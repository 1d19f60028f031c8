// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Access-review cache: `(token-hash, verb, resource, namespace) -> allowed`,
//! TTL ≤ 30s, eagerly invalidated on any downstream 401/403. A guarded
//! `HashMap` keyed by a `sha2::Sha256` fingerprint of the token, so the raw
//! token itself is never retained as a map key.

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    token_hash: [u8; 32],
    verb: String,
    resource: String,
    namespace: String,
}

struct CacheEntry {
    allowed: bool,
    expires_at: Instant,
}

pub struct AccessReviewCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
}

pub fn hash_token(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

impl AccessReviewCache {
    pub fn new(ttl: Duration) -> Self {
        Self { entries: Mutex::new(HashMap::new()), ttl }
    }

    pub fn get(&self, token: &str, verb: &str, resource: &str, namespace: &str) -> Option<bool> {
        let key = CacheKey { token_hash: hash_token(token), verb: verb.to_string(), resource: resource.to_string(), namespace: namespace.to_string() };
        let mut entries = self.entries.lock();
        match entries.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.allowed),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, token: &str, verb: &str, resource: &str, namespace: &str, allowed: bool) {
        let key = CacheKey { token_hash: hash_token(token), verb: verb.to_string(), resource: resource.to_string(), namespace: namespace.to_string() };
        let mut entries = self.entries.lock();
        entries.insert(key, CacheEntry { allowed, expires_at: Instant::now() + self.ttl });
        // Opportunistic sweep on insert bounds growth without a background task.
        entries.retain(|_, v| v.expires_at > Instant::now());
    }

    /// Eagerly invalidated whenever a downstream call returns 401/403 for
    /// this token, so a revoked grant never serves a stale "allowed" hit.
    pub fn invalidate_token(&self, token: &str) {
        let hash = hash_token(token);
        self.entries.lock().retain(|k, _| k.token_hash != hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caches_a_hit_until_ttl_expires() {
        let cache = AccessReviewCache::new(Duration::from_millis(20));
        assert_eq!(cache.get("tok", "create", "agenticsessions", "demo"), None);
        cache.insert("tok", "create", "agenticsessions", "demo", true);
        assert_eq!(cache.get("tok", "create", "agenticsessions", "demo"), Some(true));
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.get("tok", "create", "agenticsessions", "demo"), None);
    }

    #[test]
    fn invalidate_token_removes_every_entry_for_that_token() {
        let cache = AccessReviewCache::new(Duration::from_secs(30));
        cache.insert("tok", "create", "agenticsessions", "demo", true);
        cache.insert("tok", "get", "agenticsessions", "demo", true);
        cache.invalidate_token("tok");
        assert_eq!(cache.get("tok", "create", "agenticsessions", "demo"), None);
        assert_eq!(cache.get("tok", "get", "agenticsessions", "demo"), None);
    }

    #[test]
    fn distinct_tokens_hash_to_distinct_keys() {
        let cache = AccessReviewCache::new(Duration::from_secs(30));
        cache.insert("tok-a", "create", "agenticsessions", "demo", true);
        assert_eq!(cache.get("tok-b", "create", "agenticsessions", "demo"), None);
    }
}
