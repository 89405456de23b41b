use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use models::ids;
use models::theme_asset::{self, ThemeAsset};

use crate::errors::ServiceError;
use crate::storage::map_store::MapStore;

#[derive(Clone, Debug, Deserialize)]
pub struct PresignInput {
    pub file_name: String,
    pub content_type: String,
}

/// Hands out mock presigned upload URLs and records the pending asset.
/// There is no object store behind the URL; the shape matches what the
/// dashboard expects from a real presigner.
#[derive(Clone)]
pub struct ThemeAssetService {
    store: Arc<MapStore<ThemeAsset>>,
    base_url: String,
    ttl_secs: u64,
}

impl ThemeAssetService {
    pub fn new(base_url: String, ttl_secs: u64) -> Arc<Self> {
        Arc::new(Self { store: MapStore::new(), base_url, ttl_secs })
    }

    pub async fn presign_upload(&self, input: PresignInput) -> Result<ThemeAsset, ServiceError> {
        theme_asset::validate_file_name(&input.file_name)?;
        theme_asset::validate_content_type(&input.content_type)?;
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.ttl_secs as i64);
        let object_key = Uuid::new_v4();
        let rec = ThemeAsset {
            id: ids::uuid(),
            upload_url: format!(
                "{}/uploads/{}/{}?expires={}",
                self.base_url.trim_end_matches('/'),
                object_key,
                input.file_name,
                expires_at.timestamp()
            ),
            file_name: input.file_name,
            content_type: input.content_type,
            expires_at,
            created_at: now,
        };
        self.store.insert(rec.id.clone(), rec.clone()).await;
        Ok(rec)
    }

    pub async fn list(&self) -> Vec<ThemeAsset> {
        let mut assets = self.store.values().await;
        assets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        assets
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        if !self.store.remove(id).await {
            return Err(ServiceError::not_found("asset"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svc() -> Arc<ThemeAssetService> {
        ThemeAssetService::new("https://assets.botmox.local".into(), 900)
    }

    #[tokio::test]
    async fn presign_records_asset_with_expiry() {
        let svc = svc();
        let asset = svc
            .presign_upload(PresignInput {
                file_name: "logo.png".into(),
                content_type: "image/png".into(),
            })
            .await
            .unwrap();
        assert!(asset.upload_url.starts_with("https://assets.botmox.local/uploads/"));
        assert!(asset.upload_url.contains("/logo.png?expires="));
        assert!(asset.expires_at > Utc::now());
        assert_eq!(svc.list().await.len(), 1);
    }

    #[tokio::test]
    async fn presign_rejects_bad_inputs() {
        let svc = svc();
        assert!(svc
            .presign_upload(PresignInput {
                file_name: "archive.zip".into(),
                content_type: "application/zip".into(),
            })
            .await
            .is_err());
        assert!(svc
            .presign_upload(PresignInput {
                file_name: "../theme.png".into(),
                content_type: "image/png".into(),
            })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let svc = svc();
        let asset = svc
            .presign_upload(PresignInput {
                file_name: "bg.webp".into(),
                content_type: "image/webp".into(),
            })
            .await
            .unwrap();
        svc.delete(&asset.id).await.unwrap();
        assert!(svc.list().await.is_empty());
        assert!(matches!(svc.delete(&asset.id).await, Err(ServiceError::NotFound(_))));
    }
}
