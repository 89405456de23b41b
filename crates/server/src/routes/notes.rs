use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use common::types::Envelope;
use models::note::Note;
use service::notes::{NoteFilter, NoteInput, NotePatch};

use crate::auth::ServerState;
use crate::errors::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub tag: Option<String>,
    pub q: Option<String>,
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).patch(patch).delete(delete_one))
        .route("/:id/pin", post(toggle_pin))
}

async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Json<Envelope<Vec<Note>>> {
    let filter = NoteFilter { tag: query.tag.as_deref(), q: query.q.as_deref() };
    Json(Envelope::ok(state.notes.list(filter).await))
}

async fn create(
    State(state): State<ServerState>,
    Json(input): Json<NoteInput>,
) -> Result<Json<Envelope<Note>>, ApiError> {
    let note = state.notes.create(input).await?;
    info!(id = %note.id, title = %note.title, "created note");
    Ok(Json(Envelope::ok(note)))
}

async fn get_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Note>>, ApiError> {
    Ok(Json(Envelope::ok(state.notes.get(&id).await?)))
}

async fn patch(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(input): Json<NotePatch>,
) -> Result<Json<Envelope<Note>>, ApiError> {
    Ok(Json(Envelope::ok(state.notes.patch(&id, input).await?)))
}

async fn toggle_pin(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Note>>, ApiError> {
    Ok(Json(Envelope::ok(state.notes.toggle_pin(&id).await?)))
}

async fn delete_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    state.notes.delete(&id).await?;
    info!(%id, "deleted note");
    Ok(Json(Envelope::ok(json!({ "deleted": true }))))
}
