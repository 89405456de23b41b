pub mod json_map_store;
pub mod map_store;

use async_trait::async_trait;

use crate::errors::ServiceError;

/// Trait abstraction over a string-keyed record store.
/// Implementations can be in-memory or JSON-file persisted; services that
/// need durability hold an `Arc<dyn KeyedStore<_>>` so tests can swap in the
/// memory flavor.
#[async_trait]
pub trait KeyedStore<V: Clone + Send + Sync>: Send + Sync {
    async fn list(&self) -> Vec<(String, V)>;
    async fn get(&self, key: &str) -> Option<V>;
    async fn insert(&self, key: String, value: V) -> Result<(), ServiceError>;
    async fn remove(&self, key: &str) -> Result<bool, ServiceError>;
    /// Apply a mutation to an existing entry; `NotFound` if the key is absent.
    async fn update_entry(
        &self,
        key: &str,
        f: Box<dyn for<'a> FnOnce(&'a mut V) -> Result<(), ServiceError> + Send>,
    ) -> Result<V, ServiceError>;
}
