use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use service::bots::BotService;
use service::finance::FinanceService;
use service::ipqs::IpqsService;
use service::licenses::LicenseService;
use service::notes::NoteService;
use service::provisioning::ProvisioningService;
use service::proxies::ProxyService;
use service::subscriptions::SubscriptionService;
use service::theme_assets::ThemeAssetService;
use service::vm_ops::VmOpsService;

use crate::errors::ApiError;

#[derive(Clone)]
pub struct ServerAuthConfig {
    /// When non-empty, the presented bearer token must equal this value.
    /// When empty, any non-empty token passes (presence check only).
    pub api_token: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub auth: ServerAuthConfig,
    pub bots: Arc<BotService>,
    pub proxies: Arc<ProxyService>,
    pub licenses: Arc<LicenseService>,
    pub subscriptions: Arc<SubscriptionService>,
    pub finance: Arc<FinanceService>,
    pub ipqs: Arc<IpqsService>,
    pub provisioning: Arc<ProvisioningService>,
    pub vm_ops: Arc<VmOpsService>,
    pub theme_assets: Arc<ThemeAssetService>,
    pub notes: Arc<NoteService>,
}

/// Middleware: require a bearer token on API routes.
pub async fn require_bearer(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .unwrap_or_default();

    if token.is_empty() {
        return Err(ApiError::unauthorized("missing bearer token"));
    }
    if !state.auth.api_token.is_empty() && token != state.auth.api_token {
        return Err(ApiError::unauthorized("invalid bearer token"));
    }

    Ok(next.run(req).await)
}
