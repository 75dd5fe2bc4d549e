use crate::AppState;
use crate::error::ErrorResponse;
use crate::validation::ValidatedJson;
use axum::{Json, extract::State};
use shared::models::{ApiResponse, ContentRecord, ExtractContentRequest};

pub async fn extract_content(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ExtractContentRequest>,
) -> Result<Json<ApiResponse<Vec<ContentRecord>>>, ErrorResponse> {
    let records = state
        .orchestrator
        .extract_contents(&payload.urls)
        .await
        .map_err(|e| {
            tracing::error!("Failed to extract content: {:?}", e);
            state.error_response(e, "Failed to extract content")
        })?;
    Ok(Json(ApiResponse::success(records)))
}
