use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use common::types::{Envelope, ListMeta};
use models::vm_command::VmCommand;
use service::vm_ops::{CommandFilter, CommandPatch, DispatchInput};

use crate::auth::ServerState;
use crate::errors::ApiError;
use crate::routes::pagination;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    pub vm_id: Option<String>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/commands", get(list).post(dispatch))
        .route("/commands/:id", get(get_one).patch(patch).delete(delete_one))
}

#[utoipa::path(
    get, path = "/api/v1/vm-ops/commands", tag = "vm-ops",
    params(ListQuery),
    responses((status = 200, description = "Page of commands, newest first"))
)]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Json<Envelope<Vec<VmCommand>>> {
    let page = pagination(q.page, q.limit);
    let filter = CommandFilter { vm_id: q.vm_id.as_deref(), status: q.status.as_deref() };
    let (items, total) = state.vm_ops.list(filter, page).await;
    let (page, limit) = page.clamped();
    Json(Envelope::ok_with_meta(items, ListMeta { page, limit, total }))
}

#[utoipa::path(
    post, path = "/api/v1/vm-ops/commands", tag = "vm-ops",
    request_body = crate::openapi::DispatchInputDoc,
    responses(
        (status = 200, description = "Command queued"),
        (status = 400, description = "Validation error")
    )
)]
pub async fn dispatch(
    State(state): State<ServerState>,
    Json(input): Json<DispatchInput>,
) -> Result<Json<Envelope<VmCommand>>, ApiError> {
    let cmd = state.vm_ops.dispatch(input).await?;
    Ok(Json(Envelope::ok(cmd)))
}

#[utoipa::path(
    get, path = "/api/v1/vm-ops/commands/{id}", tag = "vm-ops",
    params(("id" = String, Path, description = "Command ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<VmCommand>>, ApiError> {
    Ok(Json(Envelope::ok(state.vm_ops.get(&id).await?)))
}

#[utoipa::path(
    patch, path = "/api/v1/vm-ops/commands/{id}", tag = "vm-ops",
    params(("id" = String, Path, description = "Command ID")),
    request_body = crate::openapi::CommandPatchDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Illegal status transition"),
        (status = 404, description = "Not found")
    )
)]
pub async fn patch(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(input): Json<CommandPatch>,
) -> Result<Json<Envelope<VmCommand>>, ApiError> {
    let cmd = state.vm_ops.patch(&id, input).await?;
    info!(id = %cmd.id, status = %cmd.status, "updated vm command");
    Ok(Json(Envelope::ok(cmd)))
}

#[utoipa::path(
    delete, path = "/api/v1/vm-ops/commands/{id}", tag = "vm-ops",
    params(("id" = String, Path, description = "Command ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    state.vm_ops.delete(&id).await?;
    info!(%id, "deleted vm command");
    Ok(Json(Envelope::ok(json!({ "deleted": true }))))
}
