use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
}

/// A single rejected input field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path to the field, e.g. `characterData.name`.
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Envelope every API response is wrapped in, success or failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: ApiStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    /// Internal error text, only populated in development mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: ApiStatus::Success,
            data: Some(data),
            message: None,
            errors: None,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Error,
            data: None,
            message: Some(message.into()),
            errors: None,
            error: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.error = Some(detail.into());
        self
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_error_fields() {
        let json = serde_json::to_value(ApiResponse::success(HealthStatus {
            status: "ok".into(),
        }))
        .unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "data": {"status": "ok"}}));
    }

    #[test]
    fn error_envelope_lists_field_errors() {
        let envelope = ApiResponse::error("Invalid input")
            .with_errors(vec![FieldError::new("description", "is required")]);
        let json = serde_json::to_value(envelope).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["errors"][0]["field"], "description");
        assert!(json.get("data").is_none());
        assert!(json.get("error").is_none());
    }
}
