use crate::AppState;
use crate::error::ErrorResponse;
use crate::validation::ValidatedJson;
use axum::{Json, extract::State};
use shared::models::{ApiResponse, GenerateImageRequest, ImageResult};

pub async fn generate_image(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<GenerateImageRequest>,
) -> Result<Json<ApiResponse<ImageResult>>, ErrorResponse> {
    let image = state.orchestrator.generate_image(&payload).await.map_err(|e| {
        tracing::error!("Failed to generate image: {:?}", e);
        state.error_response(e, "Failed to generate image")
    })?;
    Ok(Json(ApiResponse::success(image)))
}
