use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;

use common::types::Envelope;
use models::theme_asset::ThemeAsset;
use service::theme_assets::PresignInput;

use crate::auth::ServerState;
use crate::errors::ApiError;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(list))
        .route("/presign-upload", post(presign_upload))
        .route("/:id", axum::routing::delete(delete_one))
}

async fn list(State(state): State<ServerState>) -> Json<Envelope<Vec<ThemeAsset>>> {
    Json(Envelope::ok(state.theme_assets.list().await))
}

async fn presign_upload(
    State(state): State<ServerState>,
    Json(input): Json<PresignInput>,
) -> Result<Json<Envelope<ThemeAsset>>, ApiError> {
    let asset = state.theme_assets.presign_upload(input).await?;
    info!(id = %asset.id, file = %asset.file_name, "presigned theme upload");
    Ok(Json(Envelope::ok(asset)))
}

async fn delete_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    state.theme_assets.delete(&id).await?;
    info!(%id, "deleted theme asset");
    Ok(Json(Envelope::ok(json!({ "deleted": true }))))
}
