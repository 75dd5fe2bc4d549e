use crate::AppState;
use crate::error::ErrorResponse;
use crate::validation::ValidatedJson;
use axum::{Json, extract::State};
use shared::models::{ApiResponse, Character, ExtractCharacterRequest, GenerateCharacterRequest};

pub async fn generate_character(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<GenerateCharacterRequest>,
) -> Result<Json<ApiResponse<Character>>, ErrorResponse> {
    let character = state
        .orchestrator
        .generate_character(&payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to generate character: {:?}", e);
            state.error_response(e, "Failed to generate character")
        })?;
    Ok(Json(ApiResponse::success(character)))
}

pub async fn extract_character(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ExtractCharacterRequest>,
) -> Result<Json<ApiResponse<Character>>, ErrorResponse> {
    let character = state
        .orchestrator
        .character_from_url(&payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to extract character from {}: {:?}", payload.url, e);
            state.error_response(e, "Failed to extract character from URL")
        })?;
    Ok(Json(ApiResponse::success(character)))
}
