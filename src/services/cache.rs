// src/services/cache.rs
// DOCUMENTATION: In-memory cache of resolved restaurant locations
// PURPOSE: Guarantee at most one live geocoding attempt per distinct name

use crate::models::{Confidence, ResolvedLocation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-lifetime location cache
/// DOCUMENTATION: Keyed by the normalized name composite. Entries never
/// expire; failed lookups are cached as `Confidence::None` so they are not
/// retried. `clear` is the only invalidation.
#[derive(Clone, Default)]
pub struct LocationCache {
    store: Arc<RwLock<HashMap<String, ResolvedLocation>>>,
}

impl LocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get cached value
    pub async fn get(&self, key: &str) -> Option<ResolvedLocation> {
        let store = self.store.read().await;

        match store.get(key) {
            Some(entry) => {
                log::debug!("Cache HIT for key: {}", key);
                Some(entry.clone())
            }
            None => {
                log::debug!("Cache MISS for key: {}", key);
                None
            }
        }
    }

    /// Set cached value
    pub async fn set(&self, key: String, value: ResolvedLocation) {
        let mut store = self.store.write().await;
        log::debug!("Cache SET for key: {} ({:?})", key, value.confidence);
        store.insert(key, value);
    }

    /// Clear all cache entries
    pub async fn clear(&self) -> usize {
        let mut store = self.store.write().await;
        let count = store.len();
        store.clear();
        log::info!("Location cache cleared: {} entries removed", count);
        count
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        let total = store.len();
        let unresolved = store
            .values()
            .filter(|e| e.confidence == Confidence::None)
            .count();

        CacheStats {
            total_entries: total,
            located_entries: total - unresolved,
            unresolved_entries: unresolved,
        }
    }
}

/// Cache statistics
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub located_entries: usize,
    pub unresolved_entries: usize,
}
