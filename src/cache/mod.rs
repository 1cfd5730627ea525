use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::ExtractedArticle;

/// One retrieved article as the cache holds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedArticle {
    /// Sequential identifier assigned at insertion, starting from 1
    pub id: u64,
    pub url: String,
    pub article: ExtractedArticle,
    pub fetched_at: DateTime<Utc>,
    /// Stable fingerprint of the source URL
    pub fingerprint: String,
}

/// In-process store of retrieved articles for downstream features (read,
/// save, fact-check). Keys are small sequential numbers so a human can refer
/// to "article 3"; re-retrieving a URL refreshes the existing entry instead
/// of burning a new id.
#[derive(Default)]
pub struct ArticleCache {
    inner: Mutex<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    next_id: u64,
    by_id: BTreeMap<u64, CachedArticle>,
    id_by_fingerprint: HashMap<String, u64>,
}

impl ArticleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an article, returning its identifier. The same URL always maps
    /// to the same identifier; its content and timestamp are refreshed.
    pub fn insert(&self, url: &str, article: ExtractedArticle) -> u64 {
        let fingerprint = url_fingerprint(url);
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let id = match inner.id_by_fingerprint.get(&fingerprint) {
            Some(&existing) => existing,
            None => {
                inner.next_id += 1;
                let fresh = inner.next_id;
                inner.id_by_fingerprint.insert(fingerprint.clone(), fresh);
                fresh
            }
        };

        tracing::debug!(id, url, "caching article");
        inner.by_id.insert(
            id,
            CachedArticle {
                id,
                url: url.to_string(),
                article,
                fetched_at: Utc::now(),
                fingerprint,
            },
        );
        id
    }

    pub fn get(&self, id: u64) -> Option<CachedArticle> {
        let inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.by_id.get(&id).cloned()
    }

    pub fn get_by_url(&self, url: &str) -> Option<CachedArticle> {
        let fingerprint = url_fingerprint(url);
        let inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let id = inner.id_by_fingerprint.get(&fingerprint)?;
        inner.by_id.get(id).cloned()
    }

    /// All cached articles in identifier order.
    pub fn list(&self) -> Vec<CachedArticle> {
        let inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.by_id.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry. Identifiers are not reused afterwards.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.by_id.clear();
        inner.id_by_fingerprint.clear();
    }
}

/// Deterministic fingerprint for a source URL.
pub fn url_fingerprint(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
