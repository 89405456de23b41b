use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use models::ids;
use models::license::{self, License};

use crate::errors::ServiceError;
use crate::storage::map_store::MapStore;

#[derive(Clone, Debug, Deserialize)]
pub struct LicenseInput {
    pub key: String,
    pub product: String,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LicensePatch {
    pub key: Option<String>,
    pub product: Option<String>,
    pub bot_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// License decorated with its expiry state at read time.
#[derive(Clone, Debug, Serialize)]
pub struct LicenseView {
    #[serde(flatten)]
    pub license: License,
    pub expired: bool,
}

#[derive(Clone)]
pub struct LicenseService {
    store: Arc<MapStore<License>>,
}

impl LicenseService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { store: MapStore::new() })
    }

    pub async fn list(&self) -> Vec<LicenseView> {
        let now = Utc::now();
        let mut licenses = self.store.values().await;
        licenses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        licenses
            .into_iter()
            .map(|l| LicenseView { expired: l.is_expired(now), license: l })
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<License, ServiceError> {
        self.store.get(id).await.ok_or_else(|| ServiceError::not_found("license"))
    }

    pub async fn create(&self, input: LicenseInput) -> Result<License, ServiceError> {
        license::validate_key(&input.key)?;
        license::validate_product(&input.product)?;
        if self.store.any(|l| l.key == input.key).await {
            return Err(ServiceError::Conflict(format!("license key '{}' already exists", input.key)));
        }
        let now = Utc::now();
        let rec = License {
            id: ids::uuid(),
            key: input.key,
            product: input.product,
            bot_id: input.bot_id,
            expires_at: input.expires_at,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(rec.id.clone(), rec.clone()).await;
        Ok(rec)
    }

    pub async fn patch(&self, id: &str, patch: LicensePatch) -> Result<License, ServiceError> {
        if let Some(key) = &patch.key {
            license::validate_key(key)?;
            if self.store.any(|l| l.key == *key && l.id != id).await {
                return Err(ServiceError::Conflict(format!("license key '{key}' already exists")));
            }
        }
        if let Some(product) = &patch.product {
            license::validate_product(product)?;
        }
        self.store
            .update_entry(id, |l| {
                if let Some(key) = patch.key { l.key = key; }
                if let Some(product) = patch.product { l.product = product; }
                if let Some(bot_id) = patch.bot_id { l.bot_id = Some(bot_id); }
                if let Some(expires_at) = patch.expires_at { l.expires_at = Some(expires_at); }
                l.updated_at = Utc::now();
                Ok(())
            })
            .await
            .map_err(|_| ServiceError::not_found("license"))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        if !self.store.remove(id).await {
            return Err(ServiceError::not_found("license"));
        }
        Ok(())
    }

    /// Back-reference written when a bot gets this license assigned.
    pub(crate) async fn set_bot(&self, id: &str, bot_id: &str) -> Result<License, ServiceError> {
        self.store
            .update_entry(id, |l| {
                l.bot_id = Some(bot_id.to_string());
                l.updated_at = Utc::now();
                Ok(())
            })
            .await
            .map_err(|_| ServiceError::not_found("license"))
    }
}
