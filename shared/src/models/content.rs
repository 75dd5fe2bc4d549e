use serde::{Deserialize, Serialize};

/// Page content flattened into one bounded text blob, ready to be appended to
/// a character description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub text: String,
    /// Whether the blob was cut short and carries the ellipsis marker.
    pub truncated: bool,
}

/// One page as returned by the content API, before flattening.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtractContentRequest {
    pub urls: Vec<String>,
}
