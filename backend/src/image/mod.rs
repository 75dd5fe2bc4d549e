mod response;
mod runware;

pub use response::*;
pub use runware::*;

use crate::error::ImageError;
use shared::models::{CharacterSummary, STYLE_OTHER, StylePreset};
use std::sync::Arc;

pub const PERSONA_EXCERPT_CHARS: usize = 200;
pub const DESCRIPTION_EXCERPT_CHARS: usize = 300;

/// What the client asked the avatar to look like.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageStyle {
    Preset(StylePreset),
    Custom(String),
    /// Blank input or the bare "other" sentinel. The prompt gets no style segment.
    Unstyled,
}

impl ImageStyle {
    /// An absent style means the default preset; an explicitly empty one
    /// means no style at all.
    pub fn resolve(style: Option<&str>) -> Self {
        let Some(style) = style.map(str::trim) else {
            return ImageStyle::Preset(StylePreset::default());
        };
        if style.is_empty() || style.eq_ignore_ascii_case(STYLE_OTHER) {
            return ImageStyle::Unstyled;
        }
        match style.parse::<StylePreset>() {
            Ok(preset) => ImageStyle::Preset(preset),
            Err(_) => ImageStyle::Custom(style.to_string()),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ImageStyle::Preset(preset) => Some(preset.as_str()),
            ImageStyle::Custom(text) => Some(text),
            ImageStyle::Unstyled => None,
        }
    }
}

/// `{style} of "{name}", {title}. {persona excerpt} {description excerpt}`
///
/// The style is left out when the character text already mentions it.
pub fn build_prompt(character: &CharacterSummary, style: &ImageStyle) -> String {
    let mut body = format!("\"{}\", {}", character.name.trim(), character.title.trim());
    for (text, limit) in [
        (&character.persona, PERSONA_EXCERPT_CHARS),
        (&character.original_description, DESCRIPTION_EXCERPT_CHARS),
    ] {
        append_sentence(&mut body, &excerpt(text, limit));
    }

    match style.text() {
        Some(style) if !contains_ignore_case(&body, style) => format!("{style} of {body}"),
        _ => body,
    }
}

fn excerpt(text: &str, limit: usize) -> String {
    text.trim().chars().take(limit).collect::<String>().trim_end().to_string()
}

fn append_sentence(prompt: &mut String, sentence: &str) {
    if sentence.is_empty() {
        return;
    }
    if !prompt.ends_with(['.', '!', '?']) {
        prompt.push('.');
    }
    prompt.push(' ');
    prompt.push_str(sentence);
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Clone)]
pub struct ImageGenerator {
    backend: Arc<dyn ImageBackend>,
}

impl ImageGenerator {
    pub fn new(backend: Arc<dyn ImageBackend>) -> Self {
        Self { backend }
    }

    pub async fn generate(
        &self,
        character: &CharacterSummary,
        style: &ImageStyle,
    ) -> Result<String, ImageError> {
        let prompt = build_prompt(character, style);
        tracing::info!(name = %character.name, ?style, "Generating avatar");
        tracing::debug!(%prompt, "Image prompt");

        let task = InferenceTask::new(prompt);
        let raw = self.backend.infer(&task).await?;
        let url = ImageResponse::classify(&raw).into_url()?;
        tracing::info!(task = %task.task_uuid, "Avatar ready");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    fn character() -> CharacterSummary {
        CharacterSummary {
            name: "Tobias Wren".into(),
            title: "The Cold-Case Curmudgeon".into(),
            persona: "Gruff but kind".into(),
            original_description: "A grizzled retired detective".into(),
        }
    }

    #[test]
    fn absent_style_uses_the_default_preset() {
        assert_eq!(
            ImageStyle::resolve(None),
            ImageStyle::Preset(StylePreset::RealisticPortrait)
        );
    }

    #[test]
    fn blank_and_other_styles_are_unstyled() {
        assert_eq!(ImageStyle::resolve(Some("")), ImageStyle::Unstyled);
        assert_eq!(ImageStyle::resolve(Some("  ")), ImageStyle::Unstyled);
        assert_eq!(ImageStyle::resolve(Some("Other")), ImageStyle::Unstyled);
    }

    #[test]
    fn known_labels_become_presets_and_the_rest_custom() {
        assert_eq!(
            ImageStyle::resolve(Some("anime style")),
            ImageStyle::Preset(StylePreset::Anime)
        );
        assert_eq!(
            ImageStyle::resolve(Some(" neon cyberpunk ")),
            ImageStyle::Custom("neon cyberpunk".into())
        );
    }

    #[test]
    fn prompt_combines_style_and_character() {
        let prompt = build_prompt(&character(), &ImageStyle::Preset(StylePreset::OilPainting));
        assert_eq!(
            prompt,
            "oil painting of \"Tobias Wren\", The Cold-Case Curmudgeon. Gruff but kind. \
             A grizzled retired detective"
        );
    }

    #[test]
    fn unstyled_prompt_has_no_style_segment() {
        let prompt = build_prompt(&character(), &ImageStyle::Unstyled);
        assert!(prompt.starts_with("\"Tobias Wren\""));
    }

    #[test]
    fn style_already_in_the_text_is_not_repeated() {
        let summary = CharacterSummary {
            persona: "Always drawn as a Watercolor wash".into(),
            ..character()
        };
        let prompt = build_prompt(&summary, &ImageStyle::Preset(StylePreset::Watercolor));
        assert!(!prompt.starts_with("watercolor of"));
        assert_eq!(prompt.to_lowercase().matches("watercolor").count(), 1);
    }

    #[test]
    fn long_fields_are_excerpted() {
        let summary = CharacterSummary {
            persona: "x".repeat(500),
            original_description: "q".repeat(500),
            ..character()
        };
        let prompt = build_prompt(&summary, &ImageStyle::Unstyled);
        assert_eq!(prompt.matches('x').count(), PERSONA_EXCERPT_CHARS);
        assert_eq!(prompt.matches('q').count(), DESCRIPTION_EXCERPT_CHARS);
    }

    #[test]
    fn empty_description_adds_nothing() {
        let summary = CharacterSummary {
            original_description: String::new(),
            ..character()
        };
        let prompt = build_prompt(&summary, &ImageStyle::Unstyled);
        assert!(prompt.ends_with("Gruff but kind"));
    }

    struct RecordingBackend {
        reply: Value,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageBackend for RecordingBackend {
        async fn infer(&self, task: &InferenceTask) -> Result<Value, ImageError> {
            self.prompts.lock().unwrap().push(task.positive_prompt.clone());
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn generator_sends_the_prompt_and_returns_the_url() {
        let backend = Arc::new(RecordingBackend {
            reply: json!({"data": [{"imageURL": "https://im.example/t.png"}]}),
            prompts: Mutex::new(Vec::new()),
        });
        let generator = ImageGenerator::new(backend.clone());

        let url = generator
            .generate(&character(), &ImageStyle::resolve(Some("sketch")))
            .await
            .unwrap();
        assert_eq!(url, "https://im.example/t.png");
        assert!(backend.prompts.lock().unwrap()[0].starts_with("sketch of"));
    }

    #[tokio::test]
    async fn unrecognized_reply_is_an_error() {
        let backend = Arc::new(RecordingBackend {
            reply: json!({"images": []}),
            prompts: Mutex::new(Vec::new()),
        });
        let err = ImageGenerator::new(backend)
            .generate(&character(), &ImageStyle::Unstyled)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "image URL not found in response");
    }
}
