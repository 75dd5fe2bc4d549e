use async_openai::error::OpenAIError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shared::models::{ApiResponse, FieldError};
use std::time::Duration;
use thiserror::Error;

/// Bad or missing input. Always the client's fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid input: {} field error(s)", .errors.len())]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("content extraction is not configured")]
    NotConfigured,
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("no content found")]
    NoContent,
    #[error("content request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("content API returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("character generation is not configured")]
    NotConfigured,
    #[error("language model request failed: {0}")]
    Model(#[from] OpenAIError),
    #[error("language model returned an empty response")]
    EmptyResponse,
    #[error("no JSON found in model response")]
    NoJson,
    #[error("model response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("exampleConversation must be an array")]
    NotAnArray,
    #[error("exampleConversation contains empty messages")]
    EmptyMessages,
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("image generation is not configured")]
    NotConfigured,
    #[error("image request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("image request failed: {0}")]
    Transport(reqwest::Error),
    #[error("image API returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("image URL not found in response")]
    UrlNotFound,
}

/// Every failure a request can end in, as seen by the HTTP boundary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Image(#[from] ImageError),
}

impl AppError {
    /// A credential is missing. Reported to clients without naming which one.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AppError::Extraction(ExtractionError::NotConfigured)
                | AppError::Generation(GenerationError::NotConfigured)
                | AppError::Image(ImageError::NotConfigured)
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// An [`AppError`] ready to be rendered into the error envelope.
#[derive(Debug)]
pub struct ErrorResponse {
    error: AppError,
    message: &'static str,
    expose_detail: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<AppError>, message: &'static str, expose_detail: bool) -> Self {
        Self {
            error: error.into(),
            message,
            expose_detail,
        }
    }

    pub fn validation(error: ValidationError) -> Self {
        Self::new(error, "Invalid input", false)
    }

    pub fn error(&self) -> &AppError {
        &self.error
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.error.status();
        let mut body = match &self.error {
            AppError::Validation(v) => ApiResponse::error(self.message).with_errors(v.errors.clone()),
            e if e.is_configuration() => ApiResponse::error("Server configuration error"),
            _ => ApiResponse::error(self.message),
        };
        if self.expose_detail && !matches!(self.error, AppError::Validation(_)) {
            body = body.with_detail(self.error.to_string());
        }
        (status, Json(body)).into_response()
    }
}
