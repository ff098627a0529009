//! TTL-bounded in-memory caches.
//!
//! Three independent tables back the client: a singleton token slot, a
//! node-search table keyed by `(scope, short name)`, and an impact-graph
//! table keyed by node id. All are process-wide, start empty, and are never
//! invalidated except by TTL expiry. Expired entries are treated as absent
//! and lazily replaced on the next insert, never eagerly evicted.
//!
//! # Lock Ordering
//!
//! Each table has its own `tokio::sync::Mutex`; no code path holds more
//! than one table lock at a time. The lock serializes the check-expiry-
//! then-write sequence within one table, but two concurrent token
//! expirations may still both trigger a fetch (idempotent, both tokens
//! are valid).

use crate::config::Config;
use crate::graph::{GraphNode, ImpactGraph};
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// A map whose entries become invisible once their TTL elapses.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, (V, Instant)>,
    ttl: Duration,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    /// Create an empty cache with the given time-to-live.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Look up a key, treating expired entries as absent.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_at(key, Instant::now())
    }

    /// Look up a key as of an explicit instant.
    ///
    /// A value stored with expiry `e` is returned iff `now < e`.
    pub fn get_at(&self, key: &K, now: Instant) -> Option<&V> {
        match self.entries.get(key) {
            Some((value, expiry)) if now < *expiry => Some(value),
            _ => None,
        }
    }

    /// Insert a value, stamping it with `now + ttl`.
    pub fn insert(&mut self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    /// Insert a value as of an explicit instant.
    pub fn insert_at(&mut self, key: K, value: V, now: Instant) {
        self.entries.insert(key, (value, now + self.ttl));
    }

    /// Number of stored entries, including expired ones awaiting replacement.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cache key for node searches: `(scope, short name)`.
///
/// The scope is a materialized-view id for method searches; database
/// entity searches suffix it with the entity kind and, for columns, the
/// owning table, so differently filtered searches never collide.
pub type SearchKey = (String, String);

/// The three cache tables shared by every client call.
///
/// Constructed once at startup from [`Config`] TTLs and passed by `Arc`
/// into the client — no hidden module-level state, so tests can inject a
/// fresh instance.
#[derive(Debug)]
pub struct Caches {
    token: Mutex<Option<(String, Instant)>>,
    token_ttl: Duration,
    search: Mutex<TtlCache<SearchKey, Vec<GraphNode>>>,
    impact: Mutex<TtlCache<String, ImpactGraph>>,
}

impl Caches {
    /// Create empty caches with TTLs from the configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            token: Mutex::new(None),
            token_ttl: config.token_cache_ttl,
            search: Mutex::new(TtlCache::new(config.search_cache_ttl)),
            impact: Mutex::new(TtlCache::new(config.impact_cache_ttl)),
        }
    }

    /// Return the cached token if it has not expired.
    pub async fn token(&self) -> Option<String> {
        let slot = self.token.lock().await;
        match slot.as_ref() {
            Some((token, expiry)) if Instant::now() < *expiry => Some(token.clone()),
            _ => None,
        }
    }

    /// Store a freshly obtained token with a new expiry.
    pub async fn store_token(&self, token: String) {
        let mut slot = self.token.lock().await;
        *slot = Some((token, Instant::now() + self.token_ttl));
    }

    /// Return cached search results for a key, if fresh.
    pub async fn search_results(&self, key: &SearchKey) -> Option<Vec<GraphNode>> {
        self.search.lock().await.get(key).cloned()
    }

    /// Store search results for a key.
    pub async fn store_search_results(&self, key: SearchKey, nodes: Vec<GraphNode>) {
        self.search.lock().await.insert(key, nodes);
    }

    /// Return a cached impact graph for a node id, if fresh.
    pub async fn impact(&self, node_id: &str) -> Option<ImpactGraph> {
        self.impact.lock().await.get(&node_id.to_string()).cloned()
    }

    /// Store an impact graph for a node id.
    pub async fn store_impact(&self, node_id: String, graph: ImpactGraph) {
        self.impact.lock().await.insert(node_id, graph);
    }
}
