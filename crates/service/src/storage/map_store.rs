use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::ServiceError;
use crate::storage::KeyedStore;

/// In-memory string-keyed map store.
///
/// Records exist from create until delete and do not survive the process;
/// this is the default backing for every operational resource.
#[derive(Clone, Default)]
pub struct MapStore<V> {
    inner: Arc<RwLock<HashMap<String, V>>>,
}

impl<V: Clone + Send + Sync> MapStore<V> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { inner: Arc::new(RwLock::new(HashMap::new())) })
    }

    /// List all entries as `(key, value)` pairs, unordered.
    pub async fn list(&self) -> Vec<(String, V)> {
        let map = self.inner.read().await;
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Snapshot of all values, unordered.
    pub async fn values(&self) -> Vec<V> {
        let map = self.inner.read().await;
        map.values().cloned().collect()
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    pub async fn insert(&self, key: String, value: V) {
        let mut map = self.inner.write().await;
        map.insert(key, value);
    }

    /// Remove a key; returns whether it existed.
    pub async fn remove(&self, key: &str) -> bool {
        let mut map = self.inner.write().await;
        map.remove(key).is_some()
    }

    pub async fn len(&self) -> usize {
        let map = self.inner.read().await;
        map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Check whether any value matches the predicate.
    pub async fn any<F>(&self, pred: F) -> bool
    where
        F: Fn(&V) -> bool,
    {
        let map = self.inner.read().await;
        map.values().any(pred)
    }

    /// Mutate an existing entry in place and return the updated value.
    pub async fn update_entry<F>(&self, key: &str, f: F) -> Result<V, ServiceError>
    where
        F: FnOnce(&mut V) -> Result<(), ServiceError>,
    {
        let mut map = self.inner.write().await;
        let entry = map.get_mut(key).ok_or_else(|| ServiceError::not_found("record"))?;
        f(entry)?;
        Ok(entry.clone())
    }
}

#[async_trait]
impl<V: Clone + Send + Sync + 'static> KeyedStore<V> for MapStore<V> {
    async fn list(&self) -> Vec<(String, V)> { self.list().await }
    async fn get(&self, key: &str) -> Option<V> { self.get(key).await }
    async fn insert(&self, key: String, value: V) -> Result<(), ServiceError> {
        self.insert(key, value).await;
        Ok(())
    }
    async fn remove(&self, key: &str) -> Result<bool, ServiceError> { Ok(self.remove(key).await) }
    async fn update_entry(
        &self,
        key: &str,
        f: Box<dyn for<'a> FnOnce(&'a mut V) -> Result<(), ServiceError> + Send>,
    ) -> Result<V, ServiceError> {
        self.update_entry(key, f).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn map_store_basic_crud() {
        let store = MapStore::<String>::new();
        assert!(store.is_empty().await);

        store.insert("a".into(), "1".into()).await;
        store.insert("b".into(), "2".into()).await;
        assert_eq!(store.len().await, 2);
        assert_eq!(store.get("a").await.as_deref(), Some("1"));
        assert!(store.any(|v| v == "2").await);

        let updated = store
            .update_entry("a", |v| {
                *v = "10".into();
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(updated, "10");

        assert!(store.remove("b").await);
        assert!(!store.remove("b").await);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_entry_missing_key_is_not_found() {
        let store = MapStore::<i32>::new();
        let err = store.update_entry("nope", |_| Ok(())).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
