use axum::{middleware, routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::pagination::Pagination;

use crate::auth::{self, ServerState};
use crate::observability;
use crate::openapi::ApiDoc;

pub mod bots;
pub mod finance;
pub mod ipqs;
pub mod licenses;
pub mod notes;
pub mod provisioning;
pub mod proxies;
pub mod subscriptions;
pub mod theme_assets;
pub mod vm_ops;

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service healthy"))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (axum::http::StatusCode, String) {
    observability::encode_metrics()
}

/// Assemble `page`/`limit` query params into service pagination.
pub(crate) fn pagination(page: Option<u32>, limit: Option<u32>) -> Pagination {
    Pagination { page: page.unwrap_or(1), limit: limit.unwrap_or(20) }
}

/// Build the full application router: static frontend, public health and
/// metrics, Swagger UI, and the bearer-guarded `/api/v1` surface.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let static_dir = ServeDir::new("frontend").fallback(ServeFile::new("frontend/index.html"));

    // Public routes (static + health + metrics)
    let public = Router::new()
        .nest_service("/", static_dir)
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    // Protected API routes
    let api = Router::new()
        .nest("/bots", bots::router())
        .nest("/proxies", proxies::router())
        .nest("/licenses", licenses::router())
        .nest("/subscriptions", subscriptions::router())
        .nest("/finance", finance::router())
        .nest("/ipqs", ipqs::router())
        .nest("/provisioning", provisioning::router())
        .nest("/vm-ops", vm_ops::router())
        .nest("/theme-assets", theme_assets::router())
        .nest("/notes", notes::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer));

    // Compose
    public
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(middleware::from_fn(observability::track_requests))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
