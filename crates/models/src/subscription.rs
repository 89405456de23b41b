use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub bot_id: String,
    pub plan: String,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Whole days until expiry; negative once overdue.
    pub fn days_left(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_days()
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

pub fn validate_plan(plan: &str) -> Result<(), ModelError> {
    if plan.trim().is_empty() {
        return Err(ModelError::Validation("plan must not be empty".into()));
    }
    Ok(())
}

pub fn validate_window(
    started_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Result<(), ModelError> {
    if expires_at <= started_at {
        return Err(ModelError::Validation("expires_at must be after started_at".into()));
    }
    Ok(())
}
