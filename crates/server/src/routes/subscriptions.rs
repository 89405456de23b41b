use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use common::types::Envelope;
use models::subscription::Subscription;
use service::subscriptions::{SubscriptionInput, SubscriptionPatch, SubscriptionView};

use crate::auth::ServerState;
use crate::errors::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub active: Option<bool>,
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).patch(patch).delete(delete_one))
}

async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Json<Envelope<Vec<SubscriptionView>>> {
    Json(Envelope::ok(state.subscriptions.list(q.active).await))
}

async fn create(
    State(state): State<ServerState>,
    Json(input): Json<SubscriptionInput>,
) -> Result<Json<Envelope<Subscription>>, ApiError> {
    let sub = state.subscriptions.create(input).await?;
    info!(id = %sub.id, bot_id = %sub.bot_id, plan = %sub.plan, "created subscription");
    Ok(Json(Envelope::ok(sub)))
}

async fn get_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Subscription>>, ApiError> {
    Ok(Json(Envelope::ok(state.subscriptions.get(&id).await?)))
}

async fn patch(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(input): Json<SubscriptionPatch>,
) -> Result<Json<Envelope<Subscription>>, ApiError> {
    Ok(Json(Envelope::ok(state.subscriptions.patch(&id, input).await?)))
}

async fn delete_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    state.subscriptions.delete(&id).await?;
    info!(%id, "deleted subscription");
    Ok(Json(Envelope::ok(json!({ "deleted": true }))))
}
