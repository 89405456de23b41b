use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;

use common::types::Envelope;
use models::license::License;
use service::licenses::{LicenseInput, LicensePatch, LicenseView};

use crate::auth::ServerState;
use crate::errors::ApiError;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).patch(patch).delete(delete_one))
}

async fn list(State(state): State<ServerState>) -> Json<Envelope<Vec<LicenseView>>> {
    Json(Envelope::ok(state.licenses.list().await))
}

async fn create(
    State(state): State<ServerState>,
    Json(input): Json<LicenseInput>,
) -> Result<Json<Envelope<License>>, ApiError> {
    let license = state.licenses.create(input).await?;
    info!(id = %license.id, product = %license.product, "created license");
    Ok(Json(Envelope::ok(license)))
}

async fn get_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<License>>, ApiError> {
    Ok(Json(Envelope::ok(state.licenses.get(&id).await?)))
}

async fn patch(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(input): Json<LicensePatch>,
) -> Result<Json<Envelope<License>>, ApiError> {
    Ok(Json(Envelope::ok(state.licenses.patch(&id, input).await?)))
}

async fn delete_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    state.licenses.delete(&id).await?;
    info!(%id, "deleted license");
    Ok(Json(Envelope::ok(json!({ "deleted": true }))))
}
