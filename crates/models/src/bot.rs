use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Bot account record. `proxy_id` / `license_id` / `project_id` are loose
/// string references; no referential integrity is enforced at this layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bot {
    pub id: String,
    pub login: String,
    pub display_name: String,
    pub email: String,
    pub status: String,
    pub project_id: Option<String>,
    pub proxy_id: Option<String>,
    pub license_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const BOT_STATUSES: [&str; 4] = ["fresh", "active", "resting", "banned"];

pub fn validate_status(s: &str) -> Result<String, ModelError> {
    let low = s.to_ascii_lowercase();
    if !BOT_STATUSES.contains(&low.as_str()) {
        return Err(ModelError::Validation(format!(
            "invalid bot status '{s}' (expected one of {})",
            BOT_STATUSES.join("|")
        )));
    }
    Ok(low)
}

pub fn validate_login(login: &str) -> Result<(), ModelError> {
    if login.trim().is_empty() {
        return Err(ModelError::Validation("login must not be empty".into()));
    }
    if !login.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.') {
        return Err(ModelError::Validation(
            "login may only contain alphanumerics, '_', '-' and '.'".into(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let ok = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    });
    if !ok {
        return Err(ModelError::Validation(format!("invalid email '{email}'")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_normalizes_case() {
        assert_eq!(validate_status("Active").unwrap(), "active");
        assert!(validate_status("zombie").is_err());
    }

    #[test]
    fn login_rejects_spaces() {
        assert!(validate_login("good_bot.01").is_ok());
        assert!(validate_login("bad bot").is_err());
        assert!(validate_login("").is_err());
    }

    #[test]
    fn email_needs_local_and_dotted_domain() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("@b.com").is_err());
    }
}
