use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Pending theme upload recorded when a presigned URL is handed out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThemeAsset {
    pub id: String,
    pub file_name: String,
    pub content_type: String,
    pub upload_url: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

pub const ALLOWED_CONTENT_TYPES: [&str; 4] =
    ["image/png", "image/jpeg", "image/webp", "image/svg+xml"];

pub fn validate_content_type(ct: &str) -> Result<(), ModelError> {
    if !ALLOWED_CONTENT_TYPES.contains(&ct) {
        return Err(ModelError::Validation(format!(
            "unsupported content type '{ct}' (expected one of {})",
            ALLOWED_CONTENT_TYPES.join(", ")
        )));
    }
    Ok(())
}

pub fn validate_file_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("file_name must not be empty".into()));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(ModelError::Validation("file_name must not contain path separators".into()));
    }
    Ok(())
}
