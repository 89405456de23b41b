use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use common::types::{Envelope, ListMeta};
use models::proxy::Proxy;
use service::proxies::{ProxyFilter, ProxyInput, ProxyPatch};

use crate::auth::ServerState;
use crate::errors::ApiError;
use crate::routes::pagination;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub protocol: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).patch(patch).delete(delete_one))
        .route("/:id/check", post(check))
}

async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Json<Envelope<Vec<Proxy>>> {
    let page = pagination(q.page, q.limit);
    let filter = ProxyFilter { status: q.status.as_deref(), protocol: q.protocol.as_deref() };
    let (items, total) = state.proxies.list(filter, page).await;
    let (page, limit) = page.clamped();
    Json(Envelope::ok_with_meta(items, ListMeta { page, limit, total }))
}

async fn create(
    State(state): State<ServerState>,
    Json(input): Json<ProxyInput>,
) -> Result<Json<Envelope<Proxy>>, ApiError> {
    let proxy = state.proxies.create(input).await?;
    info!(id = %proxy.id, host = %proxy.host, protocol = %proxy.protocol, "created proxy");
    Ok(Json(Envelope::ok(proxy)))
}

async fn get_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Proxy>>, ApiError> {
    Ok(Json(Envelope::ok(state.proxies.get(&id).await?)))
}

async fn patch(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(input): Json<ProxyPatch>,
) -> Result<Json<Envelope<Proxy>>, ApiError> {
    Ok(Json(Envelope::ok(state.proxies.patch(&id, input).await?)))
}

async fn delete_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    state.proxies.delete(&id).await?;
    info!(%id, "deleted proxy");
    Ok(Json(Envelope::ok(json!({ "deleted": true }))))
}

/// Run the IPQS scorer against the proxy host and persist the result.
async fn check(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Proxy>>, ApiError> {
    let proxy = state.proxies.check(&state.ipqs, &id).await?;
    info!(%id, score = ?proxy.fraud_score, "checked proxy");
    Ok(Json(Envelope::ok(proxy)))
}
