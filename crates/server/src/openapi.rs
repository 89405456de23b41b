use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct OperationInputDoc {
    pub kind: String,
    pub category: String,
    pub amount: f64,
    pub currency: Option<String>,
    pub gold_amount: Option<f64>,
    pub gold_price: Option<f64>,
    pub comment: Option<String>,
    pub project_id: Option<String>,
    pub occurred_at: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct OperationPatchDoc {
    pub kind: Option<String>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub gold_amount: Option<f64>,
    pub gold_price: Option<f64>,
    pub comment: Option<String>,
    pub project_id: Option<String>,
    pub occurred_at: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct DispatchInputDoc {
    pub vm_id: String,
    pub action: String,
    pub payload: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct CommandPatchDoc {
    pub status: Option<String>,
    pub result: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::finance::list,
        crate::routes::finance::create,
        crate::routes::finance::get_one,
        crate::routes::finance::patch,
        crate::routes::finance::delete_one,
        crate::routes::finance::daily_stats,
        crate::routes::finance::gold_price_history,
        crate::routes::vm_ops::list,
        crate::routes::vm_ops::dispatch,
        crate::routes::vm_ops::get_one,
        crate::routes::vm_ops::patch,
        crate::routes::vm_ops::delete_one,
    ),
    components(
        schemas(
            HealthResponse,
            OperationInputDoc,
            OperationPatchDoc,
            DispatchInputDoc,
            CommandPatchDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "finance"),
        (name = "vm-ops")
    )
)]
pub struct ApiDoc;
