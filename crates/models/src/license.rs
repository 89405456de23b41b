use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub id: String,
    pub key: String,
    pub product: String,
    pub bot_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl License {
    /// Expired relative to `now`; a license without `expires_at` never expires.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

pub fn validate_key(key: &str) -> Result<(), ModelError> {
    if key.trim().is_empty() {
        return Err(ModelError::Validation("license key must not be empty".into()));
    }
    Ok(())
}

pub fn validate_product(product: &str) -> Result<(), ModelError> {
    if product.trim().is_empty() {
        return Err(ModelError::Validation("product must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expiry_is_relative_to_now() {
        let now = Utc::now();
        let lic = License {
            id: "l1".into(),
            key: "KEY-1".into(),
            product: "client".into(),
            bot_id: None,
            expires_at: Some(now - Duration::hours(1)),
            created_at: now,
            updated_at: now,
        };
        assert!(lic.is_expired(now));
        let perpetual = License { expires_at: None, ..lic };
        assert!(!perpetual.is_expired(now));
    }
}
