use crate::error::ImageError;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

const RUNWARE_API_URL: &str = "https://api.runware.ai/v1";
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(60);

pub const NEGATIVE_PROMPT: &str = "blurry, low quality, deformed, disfigured, extra limbs, \
    bad anatomy, poorly drawn face, mutated hands, watermark, text";
const IMAGE_SIZE: u32 = 512;
const IMAGE_MODEL: &str = "runware:100@1";
const STEPS: u32 = 28;
const CFG_SCALE: f32 = 7.5;

/// Something that runs one inference task and hands back the raw reply.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn infer(&self, task: &InferenceTask) -> Result<Value, ImageError>;
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InferenceTask {
    #[serde(rename = "taskUUID")]
    pub task_uuid: Uuid,
    pub positive_prompt: String,
    pub negative_prompt: &'static str,
    pub width: u32,
    pub height: u32,
    pub model: &'static str,
    pub steps: u32,
    #[serde(rename = "CFGScale")]
    pub cfg_scale: f32,
    pub number_results: u32,
    pub output_type: &'static str,
}

impl InferenceTask {
    pub fn new(positive_prompt: impl Into<String>) -> Self {
        Self {
            task_uuid: Uuid::new_v4(),
            positive_prompt: positive_prompt.into(),
            negative_prompt: NEGATIVE_PROMPT,
            width: IMAGE_SIZE,
            height: IMAGE_SIZE,
            model: IMAGE_MODEL,
            steps: STEPS,
            cfg_scale: CFG_SCALE,
            number_results: 1,
            output_type: "URL",
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "taskType", rename_all = "camelCase")]
enum RunwareTask<'a> {
    #[serde(rename_all = "camelCase")]
    Authentication { api_key: &'a str },
    ImageInference(&'a InferenceTask),
}

pub struct RunwareClient {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    endpoint: String,
    timeout: Duration,
}

impl RunwareClient {
    pub fn new(api_key: Option<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint: RUNWARE_API_URL.to_string(),
            timeout: DEFAULT_IMAGE_TIMEOUT,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn transport_error(&self, e: reqwest::Error) -> ImageError {
        if e.is_timeout() {
            ImageError::Timeout(self.timeout)
        } else {
            ImageError::Transport(e)
        }
    }
}

#[async_trait]
impl ImageBackend for RunwareClient {
    async fn infer(&self, task: &InferenceTask) -> Result<Value, ImageError> {
        let api_key = self.api_key.as_ref().ok_or(ImageError::NotConfigured)?;

        let batch = [
            RunwareTask::Authentication {
                api_key: api_key.expose_secret(),
            },
            RunwareTask::ImageInference(task),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&batch)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "Image API rejected the task");
            return Err(ImageError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        response.json().await.map_err(|e| self.transport_error(e))
    }
}
