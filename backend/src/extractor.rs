//! URL enrichment: fetch page content from the content API and flatten it into
//! a bounded text blob.

use crate::error::ExtractionError;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use shared::models::{ContentRecord, ExtractedContent};
use std::sync::Arc;
use url::Url;

pub const MAX_CONTENT_CHARS: usize = 5000;
pub const TRUNCATION_MARKER: &str = "...";

const EXA_CONTENTS_URL: &str = "https://api.exa.ai/contents";
const SUMMARY_QUERY: &str = "In under 80 words, who or what is this page about? \
    Mention personality, background and notable traits.";
const HIGHLIGHT_SENTENCES: u32 = 2;
const HIGHLIGHTS_PER_URL: u32 = 5;
const TEXT_MAX_CHARACTERS: u32 = 8000;

/// Anything that can turn URLs into raw page records.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, urls: &[Url]) -> Result<Vec<ContentRecord>, ExtractionError>;
}

#[derive(Clone)]
pub struct ContentExtractor {
    source: Arc<dyn ContentSource>,
}

impl ContentExtractor {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    pub async fn extract(&self, url: &Url) -> Result<ExtractedContent, ExtractionError> {
        let records = self.source.fetch(std::slice::from_ref(url)).await?;
        let record = records.into_iter().next().ok_or(ExtractionError::NoContent)?;
        flatten(&record).ok_or(ExtractionError::NoContent)
    }

    /// Raw per-URL records, without flattening.
    pub async fn extract_many(&self, urls: &[Url]) -> Result<Vec<ContentRecord>, ExtractionError> {
        let records = self.source.fetch(urls).await?;
        if records.is_empty() {
            return Err(ExtractionError::NoContent);
        }
        Ok(records)
    }
}

/// Joins text, summary and highlights, then caps the result at
/// [`MAX_CONTENT_CHARS`]. `None` when the record carries nothing usable.
pub fn flatten(record: &ContentRecord) -> Option<ExtractedContent> {
    let mut sections = Vec::new();

    let text = record.text.trim();
    if !text.is_empty() {
        sections.push(text.to_string());
    }
    if let Some(summary) = record.summary.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        sections.push(format!("Summary: {summary}"));
    }
    let highlights: Vec<String> = record
        .highlights
        .iter()
        .map(|h| h.trim())
        .filter(|h| !h.is_empty())
        .map(|h| format!("- {h}"))
        .collect();
    if !highlights.is_empty() {
        sections.push(format!("Key points:\n{}", highlights.join("\n")));
    }

    if sections.is_empty() {
        return None;
    }
    Some(truncate(sections.join("\n\n")))
}

fn truncate(combined: String) -> ExtractedContent {
    match combined.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((cut, _)) => {
            let mut text = combined[..cut].to_string();
            text.push_str(TRUNCATION_MARKER);
            ExtractedContent {
                text,
                truncated: true,
            }
        }
        None => ExtractedContent {
            text: combined,
            truncated: false,
        },
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentsRequest<'a> {
    urls: Vec<&'a str>,
    text: TextOptions,
    summary: SummaryOptions,
    highlights: HighlightOptions,
    livecrawl: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TextOptions {
    max_characters: u32,
}

#[derive(Serialize)]
struct SummaryOptions {
    query: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HighlightOptions {
    num_sentences: u32,
    highlights_per_url: u32,
}

#[derive(Deserialize)]
struct ContentsResponse {
    #[serde(default)]
    results: Vec<ContentRecord>,
}

/// Exa contents API client.
pub struct ExaClient {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    endpoint: String,
}

impl ExaClient {
    pub fn new(api_key: Option<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint: EXA_CONTENTS_URL.to_string(),
        }
    }

    /// Override the endpoint (proxies, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl ContentSource for ExaClient {
    async fn fetch(&self, urls: &[Url]) -> Result<Vec<ContentRecord>, ExtractionError> {
        let api_key = self.api_key.as_ref().ok_or(ExtractionError::NotConfigured)?;

        let body = ContentsRequest {
            urls: urls.iter().map(Url::as_str).collect(),
            text: TextOptions {
                max_characters: TEXT_MAX_CHARACTERS,
            },
            summary: SummaryOptions {
                query: SUMMARY_QUERY,
            },
            highlights: HighlightOptions {
                num_sentences: HIGHLIGHT_SENTENCES,
                highlights_per_url: HIGHLIGHTS_PER_URL,
            },
            livecrawl: "fallback",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let contents: ContentsResponse = response.json().await?;
        tracing::debug!(results = contents.results.len(), "Content API responded");
        Ok(contents.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    struct StaticSource(Vec<ContentRecord>);

    #[async_trait]
    impl ContentSource for StaticSource {
        async fn fetch(&self, _urls: &[Url]) -> Result<Vec<ContentRecord>, ExtractionError> {
            Ok(self.0.clone())
        }
    }

    fn record(text: &str) -> ContentRecord {
        ContentRecord {
            url: "https://example.com/".into(),
            text: text.into(),
            ..Default::default()
        }
    }

    fn url() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn flattens_summary_and_highlights_after_text() {
        let record = ContentRecord {
            summary: Some("A famous detective.".into()),
            highlights: vec!["Lives on Baker Street".into(), "  ".into(), "Plays violin".into()],
            ..record("Sherlock Holmes is a fictional detective.")
        };

        let content = flatten(&record).unwrap();
        assert_eq!(
            content.text,
            "Sherlock Holmes is a fictional detective.\n\n\
             Summary: A famous detective.\n\n\
             Key points:\n- Lives on Baker Street\n- Plays violin"
        );
        assert!(!content.truncated);
    }

    #[test]
    fn short_content_is_never_marked() {
        let content = flatten(&record(&"a".repeat(MAX_CONTENT_CHARS))).unwrap();
        assert_eq!(content.text.chars().count(), MAX_CONTENT_CHARS);
        assert!(!content.text.ends_with(TRUNCATION_MARKER));
        assert!(!content.truncated);
    }

    #[test]
    fn long_content_is_cut_on_a_character_boundary() {
        let content = flatten(&record(&"é".repeat(MAX_CONTENT_CHARS + 10))).unwrap();
        assert!(content.truncated);
        assert!(content.text.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            content.text.chars().count(),
            MAX_CONTENT_CHARS + TRUNCATION_MARKER.len()
        );
    }

    #[test]
    fn summary_alone_is_usable() {
        let record = ContentRecord {
            summary: Some("Only a summary".into()),
            ..record("")
        };
        assert_eq!(flatten(&record).unwrap().text, "Summary: Only a summary");
    }

    #[tokio::test]
    async fn empty_result_set_is_no_content() {
        let extractor = ContentExtractor::new(Arc::new(StaticSource(Vec::new())));
        let err = extractor.extract(&url()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::NoContent));
        assert_eq!(err.to_string(), "no content found");
    }

    #[tokio::test]
    async fn blank_record_is_no_content() {
        let extractor = ContentExtractor::new(Arc::new(StaticSource(vec![record("   ")])));
        assert!(matches!(
            extractor.extract(&url()).await,
            Err(ExtractionError::NoContent)
        ));
    }

    #[tokio::test]
    async fn batch_returns_raw_records() {
        let records = vec![
            ContentRecord {
                title: Some("First".into()),
                ..record("one")
            },
            record("two"),
        ];
        let extractor = ContentExtractor::new(Arc::new(StaticSource(records.clone())));
        let fetched = extractor.extract_many(&[url(), url()]).await.unwrap();
        assert_eq!(fetched, records);
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = ExaClient::new(None).with_endpoint("http://127.0.0.1:9/unreachable");
        let err = client.fetch(&[url()]).await.unwrap_err();
        assert!(matches!(err, ExtractionError::NotConfigured));
    }

    fn exa(base: &str) -> ExaClient {
        ExaClient::new(Some(SecretString::from("exa-key".to_string()))).with_endpoint(format!("{base}/contents"))
    }

    #[tokio::test]
    async fn upstream_failure_reports_status_and_body() {
        let base = serve(Router::new().route(
            "/contents",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        ))
        .await;

        let err = exa(&base).fetch(&[url()]).await.unwrap_err();
        match err {
            ExtractionError::Upstream { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn results_are_parsed_from_the_contents_reply() {
        let base = serve(Router::new().route(
            "/contents",
            post(|headers: axum::http::HeaderMap, Json(body): Json<Value>| async move {
                let key = headers.get("x-api-key").and_then(|v| v.to_str().ok());
                Json(json!({
                    "results": [{
                        "url": body["urls"][0],
                        "title": key,
                        "text": "Page text",
                        "highlights": ["One"]
                    }]
                }))
            }),
        ))
        .await;

        let records = exa(&base).fetch(&[url()]).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://example.com/");
        assert_eq!(records[0].title.as_deref(), Some("exa-key"));
        assert_eq!(records[0].highlights, vec!["One".to_string()]);
    }

    #[test]
    fn request_body_asks_for_text_summary_and_highlights() {
        let body = ContentsRequest {
            urls: vec!["https://example.com/"],
            text: TextOptions {
                max_characters: TEXT_MAX_CHARACTERS,
            },
            summary: SummaryOptions {
                query: SUMMARY_QUERY,
            },
            highlights: HighlightOptions {
                num_sentences: HIGHLIGHT_SENTENCES,
                highlights_per_url: HIGHLIGHTS_PER_URL,
            },
            livecrawl: "fallback",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["livecrawl"], "fallback");
        assert_eq!(json["highlights"]["highlightsPerUrl"], HIGHLIGHTS_PER_URL);
        assert_eq!(json["text"]["maxCharacters"], TEXT_MAX_CHARACTERS);
    }
}
