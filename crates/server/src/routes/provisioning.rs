use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use common::types::Envelope;
use models::unattend::UnattendProfile;
use service::provisioning::{
    IsoPayload, IsoPayloadInput, IssueTokenInput, ProfileInput, ProfilePatch, TokenRecord,
};

use crate::auth::ServerState;
use crate::errors::ApiError;

#[derive(Debug, Deserialize)]
pub struct ValidateInput {
    pub token: String,
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/tokens", get(list_tokens).post(issue_token))
        .route("/tokens/:token", axum::routing::delete(revoke_token))
        .route("/validate", post(validate))
        .route("/profiles", get(list_profiles).post(create_profile))
        .route(
            "/profiles/:id",
            get(get_profile).patch(patch_profile).delete(delete_profile),
        )
        .route("/generate-iso-payload", post(generate_iso_payload))
}

async fn issue_token(
    State(state): State<ServerState>,
    Json(input): Json<IssueTokenInput>,
) -> Result<Json<Envelope<TokenRecord>>, ApiError> {
    Ok(Json(Envelope::ok(state.provisioning.issue_token(input).await?)))
}

async fn list_tokens(State(state): State<ServerState>) -> Json<Envelope<Vec<TokenRecord>>> {
    Json(Envelope::ok(state.provisioning.list_tokens().await))
}

async fn revoke_token(
    State(state): State<ServerState>,
    Path(token): Path<String>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    state.provisioning.revoke_token(&token).await?;
    info!(%token, "revoked provisioning token");
    Ok(Json(Envelope::ok(json!({ "revoked": true }))))
}

async fn validate(
    State(state): State<ServerState>,
    Json(input): Json<ValidateInput>,
) -> Json<Envelope<Value>> {
    let valid = state.provisioning.validate_token(&input.token).await;
    Json(Envelope::ok(json!({ "valid": valid })))
}

async fn list_profiles(State(state): State<ServerState>) -> Json<Envelope<Vec<UnattendProfile>>> {
    Json(Envelope::ok(state.provisioning.list_profiles().await))
}

async fn create_profile(
    State(state): State<ServerState>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<Envelope<UnattendProfile>>, ApiError> {
    let profile = state.provisioning.create_profile(input).await?;
    info!(id = %profile.id, name = %profile.name, "created unattend profile");
    Ok(Json(Envelope::ok(profile)))
}

async fn get_profile(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<UnattendProfile>>, ApiError> {
    Ok(Json(Envelope::ok(state.provisioning.get_profile(&id).await?)))
}

async fn patch_profile(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(input): Json<ProfilePatch>,
) -> Result<Json<Envelope<UnattendProfile>>, ApiError> {
    Ok(Json(Envelope::ok(state.provisioning.patch_profile(&id, input).await?)))
}

async fn delete_profile(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    state.provisioning.delete_profile(&id).await?;
    info!(%id, "deleted unattend profile");
    Ok(Json(Envelope::ok(json!({ "deleted": true }))))
}

async fn generate_iso_payload(
    State(state): State<ServerState>,
    Json(input): Json<IsoPayloadInput>,
) -> Result<Json<Envelope<IsoPayload>>, ApiError> {
    Ok(Json(Envelope::ok(state.provisioning.generate_iso_payload(input).await?)))
}
