use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Windows unattended-install profile used to template ISO provisioning
/// payloads. `template_xml` carries `{{placeholder}}` markers that are
/// substituted at payload-generation time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnattendProfile {
    pub id: String,
    pub name: String,
    pub locale: String,
    pub timezone: String,
    pub admin_password: Option<String>,
    pub computer_name_template: String,
    pub template_xml: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("profile name must not be empty".into()));
    }
    Ok(())
}

/// The template must at least place the computer name somewhere.
pub fn validate_template(xml: &str) -> Result<(), ModelError> {
    if xml.trim().is_empty() {
        return Err(ModelError::Validation("template_xml must not be empty".into()));
    }
    if !xml.contains("{{computer_name}}") {
        return Err(ModelError::Validation(
            "template_xml must contain the {{computer_name}} placeholder".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_requires_computer_name_placeholder() {
        assert!(validate_template("<unattend>{{computer_name}}</unattend>").is_ok());
        assert!(validate_template("<unattend/>").is_err());
        assert!(validate_template("  ").is_err());
    }
}
