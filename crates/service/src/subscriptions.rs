use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use models::ids;
use models::subscription::{self, Subscription};

use crate::errors::ServiceError;
use crate::storage::map_store::MapStore;

#[derive(Clone, Debug, Deserialize)]
pub struct SubscriptionInput {
    pub bot_id: String,
    pub plan: String,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub auto_renew: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubscriptionPatch {
    pub plan: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub auto_renew: Option<bool>,
}

/// Subscription decorated with remaining time at read time.
#[derive(Clone, Debug, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub days_left: i64,
    pub active: bool,
}

#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<MapStore<Subscription>>,
}

impl SubscriptionService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { store: MapStore::new() })
    }

    /// List sorted by soonest expiry first; `active` filters on expiry state.
    pub async fn list(&self, active: Option<bool>) -> Vec<SubscriptionView> {
        let now = Utc::now();
        let mut subs = self.store.values().await;
        subs.sort_by(|a, b| a.expires_at.cmp(&b.expires_at));
        subs.into_iter()
            .map(|s| SubscriptionView {
                days_left: s.days_left(now),
                active: s.is_active(now),
                subscription: s,
            })
            .filter(|v| active.is_none_or(|want| v.active == want))
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Subscription, ServiceError> {
        self.store.get(id).await.ok_or_else(|| ServiceError::not_found("subscription"))
    }

    pub async fn create(&self, input: SubscriptionInput) -> Result<Subscription, ServiceError> {
        subscription::validate_plan(&input.plan)?;
        if input.bot_id.trim().is_empty() {
            return Err(ServiceError::Validation("bot_id must not be empty".into()));
        }
        let started_at = input.started_at.unwrap_or_else(Utc::now);
        subscription::validate_window(started_at, input.expires_at)?;
        let now = Utc::now();
        let rec = Subscription {
            id: ids::uuid(),
            bot_id: input.bot_id,
            plan: input.plan,
            started_at,
            expires_at: input.expires_at,
            auto_renew: input.auto_renew,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(rec.id.clone(), rec.clone()).await;
        Ok(rec)
    }

    pub async fn patch(&self, id: &str, patch: SubscriptionPatch) -> Result<Subscription, ServiceError> {
        if let Some(plan) = &patch.plan {
            subscription::validate_plan(plan)?;
        }
        if let Some(expires_at) = patch.expires_at {
            let current = self.get(id).await?;
            subscription::validate_window(current.started_at, expires_at)?;
        }
        self.store
            .update_entry(id, |s| {
                if let Some(plan) = patch.plan { s.plan = plan; }
                if let Some(expires_at) = patch.expires_at { s.expires_at = expires_at; }
                if let Some(auto_renew) = patch.auto_renew { s.auto_renew = auto_renew; }
                s.updated_at = Utc::now();
                Ok(())
            })
            .await
            .map_err(|_| ServiceError::not_found("subscription"))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        if !self.store.remove(id).await {
            return Err(ServiceError::not_found("subscription"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn input(bot: &str, days: i64) -> SubscriptionInput {
        SubscriptionInput {
            bot_id: bot.into(),
            plan: "monthly".into(),
            started_at: None,
            expires_at: Utc::now() + Duration::days(days),
            auto_renew: false,
        }
    }

    #[tokio::test]
    async fn create_and_days_left() {
        let svc = SubscriptionService::new();
        svc.create(input("b1", 30)).await.unwrap();
        let views = svc.list(None).await;
        assert_eq!(views.len(), 1);
        assert!(views[0].active);
        assert!((28..=30).contains(&views[0].days_left));
    }

    #[tokio::test]
    async fn active_filter_separates_overdue() {
        let svc = SubscriptionService::new();
        svc.create(input("live", 10)).await.unwrap();
        let mut overdue = input("dead", 10);
        overdue.started_at = Some(Utc::now() - Duration::days(40));
        overdue.expires_at = Utc::now() - Duration::days(5);
        svc.create(overdue).await.unwrap();

        let active = svc.list(Some(true)).await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].subscription.bot_id, "live");
        let inactive = svc.list(Some(false)).await;
        assert_eq!(inactive.len(), 1);
        assert!(inactive[0].days_left < 0);
    }

    #[tokio::test]
    async fn window_validation_applies_to_patch() {
        let svc = SubscriptionService::new();
        let sub = svc.create(input("b1", 30)).await.unwrap();
        let err = svc
            .patch(
                &sub.id,
                SubscriptionPatch {
                    expires_at: Some(sub.started_at - Duration::days(1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Model(_)));
    }
}
