use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use common::types::{Envelope, ListMeta};
use models::bot::Bot;
use service::bots::{BotFilter, BotInput, BotPatch, GenerateInput};

use crate::auth::ServerState;
use crate::errors::ApiError;
use crate::routes::pagination;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub project_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AssignProxyInput {
    pub proxy_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignLicenseInput {
    pub license_id: String,
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/generate", post(generate))
        .route("/:id", get(get_one).patch(patch).delete(delete_one))
        .route("/:id/assign-proxy", post(assign_proxy))
        .route("/:id/assign-license", post(assign_license))
}

async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Json<Envelope<Vec<Bot>>> {
    let page = pagination(q.page, q.limit);
    let filter = BotFilter { status: q.status.as_deref(), project_id: q.project_id.as_deref() };
    let (items, total) = state.bots.list(filter, page).await;
    let (page, limit) = page.clamped();
    Json(Envelope::ok_with_meta(items, ListMeta { page, limit, total }))
}

async fn create(
    State(state): State<ServerState>,
    Json(input): Json<BotInput>,
) -> Result<Json<Envelope<Bot>>, ApiError> {
    let bot = state.bots.create(input).await?;
    info!(id = %bot.id, login = %bot.login, "created bot");
    Ok(Json(Envelope::ok(bot)))
}

async fn generate(
    State(state): State<ServerState>,
    Json(input): Json<GenerateInput>,
) -> Result<Json<Envelope<Vec<Bot>>>, ApiError> {
    let bots = state.bots.generate(input).await?;
    info!(count = bots.len(), "generated bot personas");
    Ok(Json(Envelope::ok(bots)))
}

async fn get_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Bot>>, ApiError> {
    Ok(Json(Envelope::ok(state.bots.get(&id).await?)))
}

async fn patch(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(input): Json<BotPatch>,
) -> Result<Json<Envelope<Bot>>, ApiError> {
    Ok(Json(Envelope::ok(state.bots.patch(&id, input).await?)))
}

async fn delete_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    state.bots.delete(&id).await?;
    info!(%id, "deleted bot");
    Ok(Json(Envelope::ok(json!({ "deleted": true }))))
}

async fn assign_proxy(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(input): Json<AssignProxyInput>,
) -> Result<Json<Envelope<Bot>>, ApiError> {
    let bot = state.bots.assign_proxy(&state.proxies, &id, &input.proxy_id).await?;
    info!(bot_id = %id, proxy_id = %input.proxy_id, "assigned proxy to bot");
    Ok(Json(Envelope::ok(bot)))
}

async fn assign_license(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(input): Json<AssignLicenseInput>,
) -> Result<Json<Envelope<Bot>>, ApiError> {
    let bot = state.bots.assign_license(&state.licenses, &id, &input.license_id).await?;
    info!(bot_id = %id, license_id = %input.license_id, "assigned license to bot");
    Ok(Json(Envelope::ok(bot)))
}
