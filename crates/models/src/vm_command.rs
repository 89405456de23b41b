use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Queued VM operation. A record here represents a *request*; there is no
/// delivery or completion engine behind it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VmCommand {
    pub id: String,
    pub vm_id: String,
    pub action: String,
    pub payload: Option<String>,
    pub status: String,
    pub result: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const VM_ACTIONS: [&str; 5] = ["start", "stop", "restart", "reinstall", "exec"];
pub const VM_STATUSES: [&str; 4] = ["queued", "sent", "done", "failed"];

pub fn validate_action(action: &str) -> Result<String, ModelError> {
    let low = action.to_ascii_lowercase();
    if !VM_ACTIONS.contains(&low.as_str()) {
        return Err(ModelError::Validation(format!(
            "invalid vm action '{action}' (expected {})",
            VM_ACTIONS.join("|")
        )));
    }
    Ok(low)
}

pub fn validate_status(status: &str) -> Result<String, ModelError> {
    let low = status.to_ascii_lowercase();
    if !VM_STATUSES.contains(&low.as_str()) {
        return Err(ModelError::Validation(format!("invalid vm command status '{status}'")));
    }
    Ok(low)
}

/// Status transitions move strictly forward: queued -> sent -> done | failed.
pub fn transition_allowed(from: &str, to: &str) -> bool {
    matches!(
        (from, to),
        ("queued", "sent") | ("sent", "done") | ("sent", "failed")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exec_is_a_known_action() {
        assert_eq!(validate_action("EXEC").unwrap(), "exec");
        assert!(validate_action("suspend").is_err());
    }

    #[test]
    fn transitions_only_move_forward() {
        assert!(transition_allowed("queued", "sent"));
        assert!(transition_allowed("sent", "done"));
        assert!(transition_allowed("sent", "failed"));
        assert!(!transition_allowed("queued", "done"));
        assert!(!transition_allowed("done", "queued"));
        assert!(!transition_allowed("failed", "sent"));
    }
}
