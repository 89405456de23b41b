use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use common::types::Envelope;
use service::ipqs::IpqsReport;

use crate::auth::ServerState;
use crate::errors::ApiError;

pub fn router() -> Router<ServerState> {
    Router::new().route("/check/:ip", get(check))
}

/// Deterministic mock score for the given IPv4 address.
async fn check(
    State(state): State<ServerState>,
    Path(ip): Path<String>,
) -> Result<Json<Envelope<IpqsReport>>, ApiError> {
    Ok(Json(Envelope::ok(state.ipqs.check(&ip).await?)))
}
