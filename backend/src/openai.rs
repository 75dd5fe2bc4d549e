use crate::error::GenerationError;
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

// Sampling is pushed towards variety so similar descriptions do not keep
// producing the same character.
const TEMPERATURE: f32 = 0.9;
const TOP_P: f32 = 0.95;
const FREQUENCY_PENALTY: f32 = 0.6;
const PRESENCE_PENALTY: f32 = 0.6;
const MAX_COMPLETION_TOKENS: u32 = 2048;

/// A text-in, text-out language model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Chat-completions model behind any OpenAI-compatible endpoint.
pub struct OpenAiModel {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiModel {
    pub fn new(api_key: Option<&SecretString>, api_base: &str, model: &str) -> Self {
        let client = api_key.map(|key| {
            let config = OpenAIConfig::new()
                .with_api_key(key.expose_secret())
                .with_api_base(api_base);
            Client::with_config(config)
        });
        Self {
            client,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let client = self.client.as_ref().ok_or(GenerationError::NotConfigured)?;

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.to_string())
            .build()?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .messages(vec![ChatCompletionRequestMessage::User(message)])
            .temperature(TEMPERATURE)
            .top_p(TOP_P)
            .frequency_penalty(FREQUENCY_PENALTY)
            .presence_penalty(PRESENCE_PENALTY)
            .max_completion_tokens(MAX_COMPLETION_TOKENS)
            .build()?;

        let response = client.chat().create(request).await?;
        if let Some(usage) = &response.usage {
            tracing::debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Language model responded"
            );
        }

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let model = OpenAiModel::new(None, "http://127.0.0.1:9", "test-model");
        let err = model.complete("hello").await.unwrap_err();
        assert!(matches!(err, GenerationError::NotConfigured));
        assert_eq!(model.model(), "test-model");
    }
}
