use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::KeyValueStore;

const CACHE_TTL_MINUTES: i64 = 20;
const CACHE_KEY_PREFIX: &str = "coach:message:";
const CACHE_INDEX_KEY: &str = "coach:message-index";

/// One cached generated message per category, replaced whole on refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedMessage {
    pub category: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Time-boxed cache for generated messages. Collaborators that mutate state
/// relevant to generated content (a new food log, most notably) call
/// [`ResponseCache::clear`] so stale insights are never served.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn KeyValueStore>,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, category: &str) -> Option<String> {
        let raw = match self.store.get(&entry_key(category)).await {
            Ok(raw) => raw?,
            Err(error) => {
                warn!(?error, category, "failed to read cached message");
                return None;
            }
        };

        let entry: CachedMessage = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(error) => {
                debug!(?error, category, "corrupt cache entry treated as miss");
                return None;
            }
        };

        if Utc::now() - entry.created_at >= Duration::minutes(CACHE_TTL_MINUTES) {
            return None;
        }
        Some(entry.message)
    }

    pub async fn put(&self, category: &str, message: &str) {
        let entry = CachedMessage {
            category: category.to_owned(),
            message: message.to_owned(),
            created_at: Utc::now(),
        };

        match serde_json::to_string(&entry) {
            Ok(serialized) => {
                if let Err(error) = self.store.set(&entry_key(category), &serialized).await {
                    warn!(?error, category, "failed to write cached message");
                    return;
                }
                self.index_category(category).await;
            }
            Err(error) => warn!(?error, category, "failed to serialize cached message"),
        }
    }

    /// Drops every cached message. The invalidation hook for state-changing
    /// user actions.
    pub async fn clear(&self) {
        for category in self.indexed_categories().await {
            if let Err(error) = self.store.delete(&entry_key(&category)).await {
                warn!(?error, category = %category, "failed to clear cached message");
            }
        }
        if let Err(error) = self.store.delete(CACHE_INDEX_KEY).await {
            warn!(?error, "failed to clear cache index");
        }
    }

    pub async fn clear_category(&self, category: &str) {
        if let Err(error) = self.store.delete(&entry_key(category)).await {
            warn!(?error, category, "failed to clear cached message");
        }
        let remaining = self
            .indexed_categories()
            .await
            .into_iter()
            .filter(|indexed| indexed != category)
            .collect::<Vec<_>>();
        self.write_index(&remaining).await;
    }

    async fn index_category(&self, category: &str) {
        let mut categories = self.indexed_categories().await;
        if !categories.iter().any(|indexed| indexed == category) {
            categories.push(category.to_owned());
            self.write_index(&categories).await;
        }
    }

    async fn indexed_categories(&self) -> Vec<String> {
        match self.store.get(CACHE_INDEX_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(error) => {
                warn!(?error, "failed to read cache index");
                Vec::new()
            }
        }
    }

    async fn write_index(&self, categories: &[String]) {
        match serde_json::to_string(categories) {
            Ok(serialized) => {
                if let Err(error) = self.store.set(CACHE_INDEX_KEY, &serialized).await {
                    warn!(?error, "failed to write cache index");
                }
            }
            Err(error) => warn!(?error, "failed to serialize cache index"),
        }
    }
}

fn entry_key(category: &str) -> String {
    format!("{CACHE_KEY_PREFIX}{category}")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use super::{CachedMessage, ResponseCache, entry_key};
    use crate::store::{InMemoryKeyValueStore, KeyValueStore};

    fn cache() -> (ResponseCache, Arc<InMemoryKeyValueStore>) {
        let store = Arc::new(InMemoryKeyValueStore::default());
        (ResponseCache::new(store.clone()), store)
    }

    #[tokio::test]
    async fn put_then_get_returns_message_unchanged() {
        let (cache, _store) = cache();

        cache.put("greeting", "Good morning!").await;
        assert_eq!(
            cache.get("greeting").await,
            Some("Good morning!".to_owned())
        );
    }

    #[tokio::test]
    async fn get_misses_after_ttl_elapses() {
        let (cache, store) = cache();
        let stale = CachedMessage {
            category: "insight".to_owned(),
            message: "old insight".to_owned(),
            created_at: Utc::now() - Duration::minutes(21),
        };
        store
            .set(
                &entry_key("insight"),
                &serde_json::to_string(&stale).expect("entry should serialize"),
            )
            .await
            .expect("set should succeed");

        assert_eq!(cache.get("insight").await, None);
    }

    #[tokio::test]
    async fn put_overwrites_previous_entry() {
        let (cache, _store) = cache();

        cache.put("insight", "first").await;
        cache.put("insight", "second").await;
        assert_eq!(cache.get("insight").await, Some("second".to_owned()));
    }

    #[tokio::test]
    async fn corrupt_entry_is_a_miss() {
        let (cache, store) = cache();
        store
            .set(&entry_key("summary"), "{broken")
            .await
            .expect("set should succeed");

        assert_eq!(cache.get("summary").await, None);
    }

    #[tokio::test]
    async fn clear_drops_every_category_including_unknown_ones() {
        let (cache, _store) = cache();

        cache.put("greeting", "hi").await;
        cache.put("insight", "deep").await;
        cache.put("custom_panel", "side text").await;

        cache.clear().await;
        assert_eq!(cache.get("greeting").await, None);
        assert_eq!(cache.get("insight").await, None);
        assert_eq!(cache.get("custom_panel").await, None);
    }

    #[tokio::test]
    async fn clear_category_leaves_other_entries() {
        let (cache, _store) = cache();

        cache.put("greeting", "hi").await;
        cache.put("insight", "deep").await;

        cache.clear_category("greeting").await;
        assert_eq!(cache.get("greeting").await, None);
        assert_eq!(cache.get("insight").await, Some("deep".to_owned()));
    }
}
