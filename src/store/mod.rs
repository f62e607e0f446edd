mod in_memory;

use async_trait::async_trait;

pub use in_memory::InMemoryKeyValueStore;

/// Generic persistent string store backing quota state, cached messages and
/// the last-open marker.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}
