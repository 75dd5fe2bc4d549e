use secrecy::SecretString;
use std::time::Duration;

pub const DEFAULT_GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Production,
    /// Error envelopes carry the internal error text.
    Development,
}

impl RunMode {
    /// Anything other than `development`/`dev` is treated as production.
    pub fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => RunMode::Development,
            _ => RunMode::Production,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(900_000),
            max_requests: 25,
        }
    }
}

/// Everything the backend needs to know at startup.
///
/// Missing API keys are allowed here; they surface as "not configured"
/// failures on the calls that need them.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub groq_api_key: Option<SecretString>,
    pub groq_api_base: String,
    pub groq_model: String,
    pub exa_api_key: Option<SecretString>,
    pub runware_api_key: Option<SecretString>,
    pub rate_limit: RateLimitConfig,
    pub mode: RunMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            groq_api_base: DEFAULT_GROQ_API_BASE.to_string(),
            groq_model: DEFAULT_GROQ_MODEL.to_string(),
            exa_api_key: None,
            runware_api_key: None,
            rate_limit: RateLimitConfig::default(),
            mode: RunMode::default(),
        }
    }
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        self.mode == RunMode::Development
    }
}

/// Blank values count as unset, so `KEY=` in a `.env` file does not look configured.
pub fn non_empty_secret(value: Option<String>) -> Option<SecretString> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn run_mode_only_recognises_development() {
        assert_eq!(RunMode::from_env_value("development"), RunMode::Development);
        assert_eq!(RunMode::from_env_value(" DEV "), RunMode::Development);
        assert_eq!(RunMode::from_env_value("production"), RunMode::Production);
        assert_eq!(RunMode::from_env_value("staging"), RunMode::Production);
    }

    #[test]
    fn blank_secrets_are_unset() {
        assert!(non_empty_secret(None).is_none());
        assert!(non_empty_secret(Some("   ".into())).is_none());
        let key = non_empty_secret(Some(" gsk_123 ".into())).unwrap();
        assert_eq!(key.expose_secret(), "gsk_123");
    }

    #[test]
    fn defaults_match_documented_limits() {
        let config = AppConfig::default();
        assert_eq!(config.rate_limit.window, Duration::from_secs(15 * 60));
        assert_eq!(config.rate_limit.max_requests, 25);
        assert!(!config.is_development());
    }
}
