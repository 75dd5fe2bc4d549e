//! Sequences the three services for each endpoint. Holds no per-request state.

use crate::error::{AppError, ExtractionError};
use crate::extractor::ContentExtractor;
use crate::generator::CharacterGenerator;
use crate::image::{ImageGenerator, ImageStyle};
use shared::models::{
    Character, ContentRecord, ExtractCharacterRequest, GenerateCharacterRequest,
    GenerateImageRequest, ImageResult,
};
use url::Url;

pub const DEFAULT_RELATIONSHIP: &str = "a new acquaintance";

#[derive(Clone)]
pub struct Orchestrator {
    extractor: ContentExtractor,
    generator: CharacterGenerator,
    images: ImageGenerator,
}

impl Orchestrator {
    pub fn new(
        extractor: ContentExtractor,
        generator: CharacterGenerator,
        images: ImageGenerator,
    ) -> Self {
        Self {
            extractor,
            generator,
            images,
        }
    }

    /// Enrichment from `url` is best effort: any extraction failure falls back
    /// to the bare description.
    pub async fn generate_character(
        &self,
        request: &GenerateCharacterRequest,
    ) -> Result<Character, AppError> {
        let context = match request.url.as_deref() {
            Some(url) => match self.enrich(url).await {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::warn!(%url, "Enrichment failed, using the bare description: {e}");
                    None
                }
            },
            None => None,
        };

        let character = self
            .generator
            .generate_with_context(
                &request.description,
                &request.relationship,
                context.as_deref(),
            )
            .await?;
        Ok(character)
    }

    /// Builds a character from a page alone, so extraction failures are fatal.
    pub async fn character_from_url(
        &self,
        request: &ExtractCharacterRequest,
    ) -> Result<Character, AppError> {
        let context = self.enrich(&request.url).await?;
        let description = format!("A character inspired by the page at {}", request.url);
        let relationship = request
            .relationship
            .as_deref()
            .unwrap_or(DEFAULT_RELATIONSHIP);

        let character = self
            .generator
            .generate_with_context(&description, relationship, Some(&context))
            .await?;
        Ok(character)
    }

    pub async fn generate_image(&self, request: &GenerateImageRequest) -> Result<ImageResult, AppError> {
        let style = ImageStyle::resolve(request.style.as_deref());
        let image_url = self.images.generate(&request.character_data, &style).await?;
        Ok(ImageResult { image_url })
    }

    pub async fn extract_contents(&self, urls: &[String]) -> Result<Vec<ContentRecord>, AppError> {
        let urls = urls
            .iter()
            .map(|url| Url::parse(url))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ExtractionError::from)?;
        Ok(self.extractor.extract_many(&urls).await?)
    }

    async fn enrich(&self, url: &str) -> Result<String, ExtractionError> {
        let url = Url::parse(url)?;
        let content = self.extractor.extract(&url).await?;
        tracing::info!(%url, chars = content.text.chars().count(), truncated = content.truncated, "Enriched description");
        Ok(content.text)
    }
}
