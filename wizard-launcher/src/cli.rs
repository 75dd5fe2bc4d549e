use backend::config::{
    AppConfig, DEFAULT_GROQ_API_BASE, DEFAULT_GROQ_MODEL, RateLimitConfig, RunMode,
    non_empty_secret,
};
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(about = "Character wizard API server")]
pub struct Cli {
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,
    /// Built client to serve for every non-API path.
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub groq_api_key: Option<String>,
    #[arg(long, env = "GROQ_MODEL", default_value = DEFAULT_GROQ_MODEL)]
    pub groq_model: String,
    #[arg(long, env = "GROQ_API_BASE", default_value = DEFAULT_GROQ_API_BASE)]
    pub groq_api_base: String,
    #[arg(long, env = "EXA_API_KEY", hide_env_values = true)]
    pub exa_api_key: Option<String>,
    #[arg(long, env = "RUNWARE_API_KEY", hide_env_values = true)]
    pub runware_api_key: Option<String>,
    #[arg(long, env = "RATE_LIMIT_WINDOW_MS", default_value_t = 900_000)]
    pub rate_limit_window_ms: u64,
    #[arg(long, env = "RATE_LIMIT_MAX", default_value_t = 25)]
    pub rate_limit_max: u32,
    /// `development` adds internal error detail to error responses.
    #[arg(long, env = "APP_ENV", default_value = "production")]
    pub mode: String,
}

impl Cli {
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            groq_api_key: non_empty_secret(self.groq_api_key.clone()),
            groq_api_base: self.groq_api_base.clone(),
            groq_model: self.groq_model.clone(),
            exa_api_key: non_empty_secret(self.exa_api_key.clone()),
            runware_api_key: non_empty_secret(self.runware_api_key.clone()),
            rate_limit: RateLimitConfig {
                window: Duration::from_millis(self.rate_limit_window_ms),
                max_requests: self.rate_limit_max,
            },
            mode: RunMode::from_env_value(&self.mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_backend_config() {
        let cli = Cli::parse_from([
            "wizard-launcher",
            "--groq-api-key",
            "gsk-1",
            "--exa-api-key",
            "  ",
            "--rate-limit-window-ms",
            "60000",
            "--rate-limit-max",
            "5",
            "--mode",
            "development",
        ]);
        let config = cli.app_config();

        assert!(config.groq_api_key.is_some());
        assert!(config.exa_api_key.is_none());
        assert_eq!(config.rate_limit.window, Duration::from_secs(60));
        assert_eq!(config.rate_limit.max_requests, 5);
        assert!(config.is_development());
    }
}
