pub mod config;
pub mod error;
pub mod extractor;
pub mod generator;
mod handlers;
pub mod image;
pub mod openai;
pub mod orchestrator;
pub mod rate_limit;
#[cfg(test)]
mod test_support;
pub mod validation;

use crate::config::AppConfig;
use crate::error::{AppError, ErrorResponse};
use crate::extractor::{ContentExtractor, ExaClient};
use crate::generator::CharacterGenerator;
use crate::handlers::{extract_character, extract_content, generate_character, generate_image, health};
use crate::image::{ImageGenerator, RunwareClient};
use crate::openai::OpenAiModel;
use crate::orchestrator::Orchestrator;
use crate::rate_limit::RateLimiter;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub config: Arc<AppConfig>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, config: AppConfig) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::new(config.rate_limit)),
            orchestrator,
            config: Arc::new(config),
        }
    }

    /// Wires the real upstream clients from configuration.
    pub fn from_config(config: AppConfig) -> Self {
        let model = OpenAiModel::new(
            config.groq_api_key.as_ref(),
            &config.groq_api_base,
            &config.groq_model,
        );
        tracing::info!(model = model.model(), "Language model configured");
        let orchestrator = Orchestrator::new(
            ContentExtractor::new(Arc::new(ExaClient::new(config.exa_api_key.clone()))),
            CharacterGenerator::new(Arc::new(model)),
            ImageGenerator::new(Arc::new(RunwareClient::new(config.runware_api_key.clone()))),
        );
        Self::new(orchestrator, config)
    }

    pub fn error_response(&self, error: impl Into<AppError>, message: &'static str) -> ErrorResponse {
        ErrorResponse::new(error, message, self.config.is_development())
    }
}

pub fn init(router: Router<AppState>, config: AppConfig) -> Router<()> {
    with_state(router, AppState::from_config(config))
}

/// Mounts the API under `/api` on top of `router`, rate limited per client.
pub fn with_state(router: Router<AppState>, state: AppState) -> Router<()> {
    let api = Router::new()
        .route("/health", get(health))
        .route("/character/generate", post(generate_character))
        .route("/character/extract", post(extract_character))
        .route("/image/generate", post(generate_image))
        .route("/content/extract", post(extract_content))
        .layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limit::enforce,
        ));

    router
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
