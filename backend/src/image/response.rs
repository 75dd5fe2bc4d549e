use crate::error::ImageError;
use serde_json::Value;

/// The reply layouts the image API has been seen to use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageResponse {
    /// `{"tasks": [{"imageURL": ...}]}`
    Tasks(String),
    /// `{"data": [{"imageURL": ...}]}`
    Data(String),
    /// `{"imageURL": ...}`
    Flat(String),
    Unrecognized,
}

impl ImageResponse {
    /// Probes the known layouts in order and keeps the first that yields a
    /// non-empty URL.
    pub fn classify(raw: &Value) -> Self {
        let probe = |pointer: &str| {
            raw.pointer(pointer)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string)
        };

        if let Some(url) = probe("/tasks/0/imageURL") {
            ImageResponse::Tasks(url)
        } else if let Some(url) = probe("/data/0/imageURL") {
            ImageResponse::Data(url)
        } else if let Some(url) = probe("/imageURL") {
            ImageResponse::Flat(url)
        } else {
            ImageResponse::Unrecognized
        }
    }

    pub fn into_url(self) -> Result<String, ImageError> {
        match self {
            ImageResponse::Tasks(url) | ImageResponse::Data(url) | ImageResponse::Flat(url) => {
                Ok(url)
            }
            ImageResponse::Unrecognized => Err(ImageError::UrlNotFound),
        }
    }
}
