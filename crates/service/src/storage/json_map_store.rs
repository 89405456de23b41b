use std::{collections::HashMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};

use crate::errors::ServiceError;
use crate::storage::KeyedStore;

/// JSON file-backed string-keyed map store.
///
/// Persists the whole map to a JSON file on every mutation. Used for the few
/// resources that must survive restarts (issued provisioning tokens,
/// unattend profiles); a database would be overkill for these.
#[derive(Clone)]
pub struct JsonMapStore<V> {
    inner: Arc<RwLock<HashMap<String, V>>>,
    file_path: PathBuf,
}

impl<V> JsonMapStore<V>
where
    V: serde::Serialize + serde::de::DeserializeOwned + Clone + Send + Sync,
{
    /// Initialize the store from a path. Creates the file with an empty map if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: HashMap<String, V> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => {
                let empty: HashMap<String, V> = HashMap::new();
                fs::write(
                    &file_path,
                    serde_json::to_vec(&empty).map_err(|e| ServiceError::Storage(e.to_string()))?,
                )
                .await
                .map_err(|e| ServiceError::Storage(e.to_string()))?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    async fn save(&self) -> Result<(), ServiceError> {
        let map = self.inner.read().await;
        let data = serde_json::to_vec(&*map).map_err(|e| ServiceError::Storage(e.to_string()))?;
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }

    /// List all entries as `(key, value)` pairs.
    pub async fn list(&self) -> Vec<(String, V)> {
        let map = self.inner.read().await;
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Insert or update a value by key and persist.
    pub async fn insert(&self, key: String, value: V) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        map.insert(key, value);
        drop(map);
        self.save().await
    }

    /// Remove a key and persist; returns whether it existed.
    pub async fn remove(&self, key: &str) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        let existed = map.remove(key).is_some();
        drop(map);
        self.save().await?;
        Ok(existed)
    }

    /// Mutate an existing entry, persist, and return the updated value.
    pub async fn update_entry<F>(&self, key: &str, f: F) -> Result<V, ServiceError>
    where
        F: FnOnce(&mut V) -> Result<(), ServiceError>,
    {
        let mut map = self.inner.write().await;
        let entry = map.get_mut(key).ok_or_else(|| ServiceError::not_found("record"))?;
        f(entry)?;
        let updated = entry.clone();
        drop(map);
        self.save().await?;
        Ok(updated)
    }
}

#[async_trait]
impl<V> KeyedStore<V> for JsonMapStore<V>
where
    V: serde::Serialize + serde::de::DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn list(&self) -> Vec<(String, V)> { self.list().await }
    async fn get(&self, key: &str) -> Option<V> { self.get(key).await }
    async fn insert(&self, key: String, value: V) -> Result<(), ServiceError> {
        self.insert(key, value).await
    }
    async fn remove(&self, key: &str) -> Result<bool, ServiceError> { self.remove(key).await }
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
    use uuid::Uuid;

    #[tokio::test]
    async fn json_map_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", Uuid::new_v4()));
        let store = JsonMapStore::<String>::new(&tmp).await?;

        // initially empty
        assert_eq!(store.list().await.len(), 0);

        store.insert("a".into(), "1".into()).await?;
        store.insert("b".into(), "2".into()).await?;
        assert_eq!(store.get("a").await.as_deref(), Some("1"));

        let updated = store
            .update_entry("a", |v| {
                *v = "10".into();
                Ok(())
            })
            .await?;
        assert_eq!(updated, "10");

        // remove and reload persistence
        let existed = store.remove("b").await?;
        assert!(existed);
        let reloaded = JsonMapStore::<String>::new(&tmp).await?;
        let entries = reloaded.list().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(reloaded.get("a").await.as_deref(), Some("10"));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
