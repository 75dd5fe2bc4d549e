//! Schema checks for inbound payloads.
//!
//! Bodies are read as loose JSON first so that every problem (missing field,
//! wrong type, length out of bounds, malformed URL) can be reported at once
//! instead of stopping at the first serde error.

use crate::error::{ErrorResponse, ValidationError};
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde_json::{Map, Value};
use shared::models::{
    CharacterSummary, ExtractCharacterRequest, ExtractContentRequest, FieldError,
    GenerateCharacterRequest, GenerateImageRequest,
};
use std::ops::RangeInclusive;
use url::Url;

pub const DESCRIPTION_CHARS: RangeInclusive<usize> = 10..=1000;
pub const RELATIONSHIP_CHARS: RangeInclusive<usize> = 5..=200;
/// Character fields echoed back to the image endpoint have only a lower bound.
pub const ECHOED_REQUIRED: RangeInclusive<usize> = 1..=usize::MAX;
pub const ECHOED_OPTIONAL: RangeInclusive<usize> = 0..=usize::MAX;
pub const STYLE_CHARS: RangeInclusive<usize> = 0..=200;
pub const MAX_BATCH_URLS: usize = 10;

/// Payloads that can be checked against their schema from raw JSON.
pub trait Validate: Sized {
    fn validate(value: &Value) -> Result<Self, ValidationError>;
}

/// JSON body extractor that rejects with the 400 envelope on any schema violation.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: Validate,
{
    type Rejection = ErrorResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                ErrorResponse::validation(ValidationError::single("body", rejection.body_text()))
            })?;
        T::validate(&value)
            .map(ValidatedJson)
            .map_err(ErrorResponse::validation)
    }
}

/// Collects field errors while walking one JSON object.
struct Fields<'a> {
    object: &'a Map<String, Value>,
    prefix: String,
    errors: Vec<FieldError>,
}

impl<'a> Fields<'a> {
    fn root(value: &'a Value) -> Result<Self, ValidationError> {
        let object = value
            .as_object()
            .ok_or_else(|| ValidationError::single("body", "must be a JSON object"))?;
        Ok(Self {
            object,
            prefix: String::new(),
            errors: Vec::new(),
        })
    }

    fn path(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn reject(&mut self, key: &str, message: impl Into<String>) {
        let field = self.path(key);
        self.errors.push(FieldError::new(field, message));
    }

    fn string(&mut self, key: &str, required: bool, bounds: RangeInclusive<usize>) -> Option<String> {
        let object = self.object;
        let value = match object.get(key) {
            None | Some(Value::Null) => {
                if required {
                    self.reject(key, "is required");
                }
                return None;
            }
            Some(value) => value,
        };
        let Some(text) = value.as_str() else {
            self.reject(key, "must be a string");
            return None;
        };

        let len = text.chars().count();
        if len < *bounds.start() {
            self.reject(
                key,
                format!("must be at least {} characters", bounds.start()),
            );
            return None;
        }
        if len > *bounds.end() {
            self.reject(key, format!("must be at most {} characters", bounds.end()));
            return None;
        }
        Some(text.to_string())
    }

    fn url(&mut self, key: &str, required: bool) -> Option<String> {
        let text = self.string(key, required, 1..=2048)?;
        if !is_web_url(&text) {
            self.reject(key, "must be a valid URL");
            return None;
        }
        Some(text)
    }

    /// Runs `check` against a nested object, prefixing its field paths.
    fn nested<T>(&mut self, key: &str, check: impl FnOnce(&mut Fields<'_>) -> T) -> Option<T> {
        let object = self.object;
        match object.get(key) {
            None | Some(Value::Null) => {
                self.reject(key, "is required");
                None
            }
            Some(Value::Object(object)) => {
                let mut inner = Fields {
                    object,
                    prefix: format!("{}.", self.path(key)),
                    errors: Vec::new(),
                };
                let result = check(&mut inner);
                self.errors.append(&mut inner.errors);
                Some(result)
            }
            Some(_) => {
                self.reject(key, "must be an object");
                None
            }
        }
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, ValidationError> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(ValidationError {
                errors: self.errors,
            }),
        }
    }
}

/// An absolute `http`/`https` URL with a host.
pub fn is_web_url(text: &str) -> bool {
    Url::parse(text)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

impl Validate for GenerateCharacterRequest {
    fn validate(value: &Value) -> Result<Self, ValidationError> {
        let mut fields = Fields::root(value)?;
        let description = fields.string("description", true, DESCRIPTION_CHARS);
        let relationship = fields.string("relationship", true, RELATIONSHIP_CHARS);
        let url = fields.url("url", false);

        let request = description.zip(relationship).map(|(description, relationship)| {
            GenerateCharacterRequest {
                description,
                relationship,
                url,
            }
        });
        fields.finish(request)
    }
}

impl Validate for ExtractCharacterRequest {
    fn validate(value: &Value) -> Result<Self, ValidationError> {
        let mut fields = Fields::root(value)?;
        let url = fields.url("url", true);
        let relationship = fields.string("relationship", false, RELATIONSHIP_CHARS);

        let request = url.map(|url| ExtractCharacterRequest { url, relationship });
        fields.finish(request)
    }
}

impl Validate for GenerateImageRequest {
    fn validate(value: &Value) -> Result<Self, ValidationError> {
        let mut fields = Fields::root(value)?;
        let summary = fields
            .nested("characterData", |character| {
                let name = character.string("name", true, ECHOED_REQUIRED);
                let title = character.string("title", true, ECHOED_REQUIRED);
                let persona = character.string("persona", true, ECHOED_OPTIONAL);
                let original_description = character
                    .string("originalDescription", false, ECHOED_OPTIONAL)
                    .unwrap_or_default();
                Some(CharacterSummary {
                    name: name?,
                    title: title?,
                    persona: persona?,
                    original_description,
                })
            })
            .flatten();
        let style = fields.string("style", false, STYLE_CHARS);

        let request = summary.map(|character_data| GenerateImageRequest {
            character_data,
            style,
        });
        fields.finish(request)
    }
}

impl Validate for ExtractContentRequest {
    fn validate(value: &Value) -> Result<Self, ValidationError> {
        let mut fields = Fields::root(value)?;
        let object = fields.object;
        let urls = match object.get("urls") {
            None | Some(Value::Null) => {
                fields.reject("urls", "is required");
                None
            }
            Some(Value::Array(items)) if items.is_empty() => {
                fields.reject("urls", "must contain at least one URL");
                None
            }
            Some(Value::Array(items)) if items.len() > MAX_BATCH_URLS => {
                fields.reject(
                    "urls",
                    format!("must contain at most {MAX_BATCH_URLS} URLs"),
                );
                None
            }
            Some(Value::Array(items)) => {
                let mut urls = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    match item.as_str() {
                        Some(text) if is_web_url(text) => urls.push(text.to_string()),
                        _ => fields.reject(&format!("urls[{index}]"), "must be a valid URL"),
                    }
                }
                Some(urls)
            }
            Some(_) => {
                fields.reject("urls", "must be an array");
                None
            }
        };

        fields.finish(urls.map(|urls| ExtractContentRequest { urls }))
    }
}
