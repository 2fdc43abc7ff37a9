use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;

use utoipa::OpenApi as OpenApiT;
use utoipa_swagger_ui::SwaggerUi;

use crate::dto::ApiResponse;
use crate::{AppState, handlers};

pub fn api_router<T: OpenApiT>() -> Router<AppState> {
    let open_api = T::openapi();

    Router::new()
        .route("/health", get(health))
        .route("/v1/admin/payouts", get(handlers::get_admin_payouts))
        .route("/v1/commissions", get(handlers::list_commissions))
        .route("/v1/commissions/count", get(handlers::get_commissions_count))
        .merge(SwaggerUi::new("/v1/docs").url("/v1/docs/openapi.json", open_api))
        .fallback(handler_404)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::ok("healthy")))
}

async fn handler_404() -> impl IntoResponse {
    let response: ApiResponse<()> =
        ApiResponse::error("The requested resource was not found".to_string());
    (StatusCode::NOT_FOUND, Json(response))
}
