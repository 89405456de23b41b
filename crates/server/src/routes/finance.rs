use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use common::types::{Envelope, ListMeta};
use models::finance::FinanceOperation;
use service::finance::{DailyStat, GoldPricePoint, OperationFilter, OperationInput, OperationPatch};

use crate::auth::ServerState;
use crate::errors::ApiError;
use crate::routes::pagination;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    pub kind: Option<String>,
    pub category: Option<String>,
    pub project_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct StatsQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct GoldHistoryQuery {
    /// Trailing window in days (default 30, max 365).
    pub days: Option<u32>,
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/operations", get(list).post(create))
        .route("/operations/:id", get(get_one).patch(patch).delete(delete_one))
        .route("/stats/daily", get(daily_stats))
        .route("/gold-price/history", get(gold_price_history))
}

#[utoipa::path(
    get, path = "/api/v1/finance/operations", tag = "finance",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of operations, newest first"),
        (status = 401, description = "Missing bearer token")
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Json<Envelope<Vec<FinanceOperation>>> {
    let page = pagination(q.page, q.limit);
    let filter = OperationFilter {
        kind: q.kind.as_deref(),
        category: q.category.as_deref(),
        project_id: q.project_id.as_deref(),
        from: q.from,
        to: q.to,
    };
    let (items, total) = state.finance.list(filter, page).await;
    let (page, limit) = page.clamped();
    Json(Envelope::ok_with_meta(items, ListMeta { page, limit, total }))
}

#[utoipa::path(
    post, path = "/api/v1/finance/operations", tag = "finance",
    request_body = crate::openapi::OperationInputDoc,
    responses(
        (status = 200, description = "Created"),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Json(input): Json<OperationInput>,
) -> Result<Json<Envelope<FinanceOperation>>, ApiError> {
    let op = state.finance.create(input).await?;
    info!(id = %op.id, kind = %op.kind, amount = op.amount, "created finance operation");
    Ok(Json(Envelope::ok(op)))
}

#[utoipa::path(
    get, path = "/api/v1/finance/operations/{id}", tag = "finance",
    params(("id" = String, Path, description = "Operation ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<FinanceOperation>>, ApiError> {
    Ok(Json(Envelope::ok(state.finance.get(&id).await?)))
}

#[utoipa::path(
    patch, path = "/api/v1/finance/operations/{id}", tag = "finance",
    params(("id" = String, Path, description = "Operation ID")),
    request_body = crate::openapi::OperationPatchDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Not found")
    )
)]
pub async fn patch(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(input): Json<OperationPatch>,
) -> Result<Json<Envelope<FinanceOperation>>, ApiError> {
    Ok(Json(Envelope::ok(state.finance.patch(&id, input).await?)))
}

#[utoipa::path(
    delete, path = "/api/v1/finance/operations/{id}", tag = "finance",
    params(("id" = String, Path, description = "Operation ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    state.finance.delete(&id).await?;
    info!(%id, "deleted finance operation");
    Ok(Json(Envelope::ok(json!({ "deleted": true }))))
}

#[utoipa::path(
    get, path = "/api/v1/finance/stats/daily", tag = "finance",
    params(StatsQuery),
    responses((status = 200, description = "Per-day totals, ascending"))
)]
pub async fn daily_stats(
    State(state): State<ServerState>,
    Query(q): Query<StatsQuery>,
) -> Json<Envelope<Vec<DailyStat>>> {
    Json(Envelope::ok(state.finance.daily_stats(q.from, q.to).await))
}

#[utoipa::path(
    get, path = "/api/v1/finance/gold-price/history", tag = "finance",
    params(GoldHistoryQuery),
    responses((status = 200, description = "Daily gold price averages, ascending"))
)]
pub async fn gold_price_history(
    State(state): State<ServerState>,
    Query(q): Query<GoldHistoryQuery>,
) -> Json<Envelope<Vec<GoldPricePoint>>> {
    Json(Envelope::ok(state.finance.gold_price_history(q.days.unwrap_or(30)).await))
}
