use axum::Json;
use shared::models::{ApiResponse, HealthStatus};

pub async fn health() -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::success(HealthStatus {
        status: "ok".to_string(),
    }))
}
