use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::unattend::{self, UnattendProfile};

use crate::errors::ServiceError;
use crate::storage::json_map_store::JsonMapStore;
use crate::storage::KeyedStore;

/// Issued provisioning token. Keyed by the token string itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token: String,
    pub vm_id: Option<String>,
    pub note: Option<String>,
    pub issued_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct IssueTokenInput {
    pub vm_id: Option<String>,
    pub note: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub admin_password: Option<String>,
    pub computer_name_template: String,
    pub template_xml: String,
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub locale: Option<String>,
    pub timezone: Option<String>,
    pub admin_password: Option<String>,
    pub computer_name_template: Option<String>,
    pub template_xml: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct IsoPayloadInput {
    pub profile_id: String,
    #[serde(default)]
    pub computer_name: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct IsoPayload {
    pub profile_id: String,
    pub payload_base64: String,
    pub byte_size: usize,
}

#[derive(Clone)]
pub struct ProvisioningService {
    tokens: Arc<dyn KeyedStore<TokenRecord>>,
    profiles: Arc<dyn KeyedStore<UnattendProfile>>,
}

impl ProvisioningService {
    pub fn new(
        tokens: Arc<dyn KeyedStore<TokenRecord>>,
        profiles: Arc<dyn KeyedStore<UnattendProfile>>,
    ) -> Arc<Self> {
        Arc::new(Self { tokens, profiles })
    }

    /// File-persisted stores under `data_dir`; issued tokens and profiles
    /// survive restarts.
    pub async fn open(data_dir: &str) -> Result<Arc<Self>, ServiceError> {
        let dir = Path::new(data_dir);
        let tokens = JsonMapStore::<TokenRecord>::new(dir.join("provisioning_tokens.json")).await?;
        let profiles =
            JsonMapStore::<UnattendProfile>::new(dir.join("unattend_profiles.json")).await?;
        Ok(Self::new(tokens, profiles))
    }

    // --- tokens ---

    pub async fn issue_token(&self, input: IssueTokenInput) -> Result<TokenRecord, ServiceError> {
        let rec = TokenRecord {
            token: format!("pvt-{}", Uuid::new_v4().simple()),
            vm_id: input.vm_id,
            note: input.note,
            issued_at: Utc::now(),
        };
        self.tokens.insert(rec.token.clone(), rec.clone()).await?;
        info!(token = %rec.token, vm_id = ?rec.vm_id, "issued provisioning token");
        Ok(rec)
    }

    pub async fn list_tokens(&self) -> Vec<TokenRecord> {
        let mut tokens: Vec<TokenRecord> =
            self.tokens.list().await.into_iter().map(|(_, v)| v).collect();
        tokens.sort_by(|a, b| b.issued_at.cmp(&a.issued_at));
        tokens
    }

    /// A token is valid iff it was issued and has not been revoked.
    pub async fn validate_token(&self, token: &str) -> bool {
        !token.trim().is_empty() && self.tokens.get(token).await.is_some()
    }

    pub async fn revoke_token(&self, token: &str) -> Result<(), ServiceError> {
        if !self.tokens.remove(token).await? {
            return Err(ServiceError::not_found("token"));
        }
        Ok(())
    }

    // --- unattend profiles ---

    pub async fn list_profiles(&self) -> Vec<UnattendProfile> {
        let mut profiles: Vec<UnattendProfile> =
            self.profiles.list().await.into_iter().map(|(_, v)| v).collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        profiles
    }

    pub async fn get_profile(&self, id: &str) -> Result<UnattendProfile, ServiceError> {
        self.profiles.get(id).await.ok_or_else(|| ServiceError::not_found("profile"))
    }

    pub async fn create_profile(&self, input: ProfileInput) -> Result<UnattendProfile, ServiceError> {
        unattend::validate_name(&input.name)?;
        unattend::validate_template(&input.template_xml)?;
        if input.computer_name_template.trim().is_empty() {
            return Err(ServiceError::Validation("computer_name_template must not be empty".into()));
        }
        let now = Utc::now();
        let rec = UnattendProfile {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            locale: input.locale,
            timezone: input.timezone,
            admin_password: input.admin_password,
            computer_name_template: input.computer_name_template,
            template_xml: input.template_xml,
            created_at: now,
            updated_at: now,
        };
        self.profiles.insert(rec.id.clone(), rec.clone()).await?;
        Ok(rec)
    }

    pub async fn patch_profile(&self, id: &str, patch: ProfilePatch) -> Result<UnattendProfile, ServiceError> {
        if let Some(name) = &patch.name {
            unattend::validate_name(name)?;
        }
        if let Some(xml) = &patch.template_xml {
            unattend::validate_template(xml)?;
        }
        self.profiles
            .update_entry(
                id,
                Box::new(move |p| {
                    if let Some(name) = patch.name { p.name = name; }
                    if let Some(locale) = patch.locale { p.locale = locale; }
                    if let Some(timezone) = patch.timezone { p.timezone = timezone; }
                    if let Some(pw) = patch.admin_password { p.admin_password = Some(pw); }
                    if let Some(t) = patch.computer_name_template {
                        if t.trim().is_empty() {
                            return Err(ServiceError::Validation(
                                "computer_name_template must not be empty".into(),
                            ));
                        }
                        p.computer_name_template = t;
                    }
                    if let Some(xml) = patch.template_xml { p.template_xml = xml; }
                    p.updated_at = Utc::now();
                    Ok(())
                }),
            )
            .await
            .map_err(|e| match e {
                ServiceError::NotFound(_) => ServiceError::not_found("profile"),
                other => other,
            })
    }

    pub async fn delete_profile(&self, id: &str) -> Result<(), ServiceError> {
        if !self.profiles.remove(id).await? {
            return Err(ServiceError::not_found("profile"));
        }
        Ok(())
    }

    // --- ISO payload ---

    /// Render the profile template and base64-encode it. This is string
    /// templating only; no disk image is built here.
    pub async fn generate_iso_payload(&self, input: IsoPayloadInput) -> Result<IsoPayload, ServiceError> {
        let profile = self.get_profile(&input.profile_id).await?;
        if let Some(token) = input.token.as_deref() {
            if !self.validate_token(token).await {
                return Err(ServiceError::Validation(format!("unknown provisioning token '{token}'")));
            }
        }

        let computer_name = input
            .computer_name
            .unwrap_or_else(|| render_computer_name(&profile.computer_name_template));
        let rendered = profile
            .template_xml
            .replace("{{computer_name}}", &computer_name)
            .replace("{{locale}}", &profile.locale)
            .replace("{{timezone}}", &profile.timezone)
            .replace("{{admin_password}}", profile.admin_password.as_deref().unwrap_or(""))
            .replace("{{token}}", input.token.as_deref().unwrap_or(""));

        let byte_size = rendered.len();
        info!(profile_id = %profile.id, %computer_name, byte_size, "generated iso payload");
        Ok(IsoPayload {
            profile_id: profile.id,
            payload_base64: BASE64.encode(rendered),
            byte_size,
        })
    }
}

/// Expand `{{rand}}` in the computer-name template to a short uppercase
/// suffix; templates without the marker are used verbatim.
fn render_computer_name(template: &str) -> String {
    if !template.contains("{{rand}}") {
        return template.to_string();
    }
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();
    template.replace("{{rand}}", &suffix)
}
