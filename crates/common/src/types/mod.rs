use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Pagination metadata attached to list responses.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

/// Success envelope: `{ "success": true, "data": ..., "meta"?: ... }`
#[derive(Serialize, Debug)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ListMeta>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data, meta: None }
    }

    pub fn ok_with_meta(data: T, meta: ListMeta) -> Self {
        Self { success: true, data, meta: Some(meta) }
    }
}

/// Error body inside the failure envelope.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize, Debug)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

impl ErrorEnvelope {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorBody { code: code.to_string(), message: message.into() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_meta_is_omitted_when_absent() {
        let v = serde_json::to_value(Envelope::ok(1)).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["data"], 1);
        assert!(v.get("meta").is_none());
    }

    #[test]
    fn error_envelope_shape() {
        let v = serde_json::to_value(ErrorEnvelope::new("NOT_FOUND", "bot not found")).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["error"]["code"], "NOT_FOUND");
        assert_eq!(v["error"]["message"], "bot not found");
    }
}
