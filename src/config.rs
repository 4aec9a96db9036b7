use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Base URL of the GitHub REST API
    pub github_api_url: String,
    /// Optional GitHub token for authenticated (higher rate limit) requests
    pub github_token: Option<String>,
    /// Timeout in seconds for GitHub metadata and listing calls
    pub github_timeout_secs: u64,
    /// Timeout in seconds for raw file content downloads
    pub content_timeout_secs: u64,
    /// Chat-completion endpoint URL
    pub model_api_url: String,
    /// API key for the chat-completion endpoint
    pub model_api_key: Option<String>,
    /// Model identifier sent with each inference request
    pub model_id: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let github_api_url =
            env::var("GITHUB_API_URL").unwrap_or_else(|_| "https://api.github.com".to_string());

        let github_token = env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());

        let github_timeout_secs = env::var("GITHUB_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("GITHUB_TIMEOUT_SECS"))?;

        let content_timeout_secs = env::var("CONTENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("CONTENT_TIMEOUT_SECS"))?;

        let model_api_url = env::var("MODEL_API_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com/v1/messages".to_string());

        let model_api_key = env::var("MODEL_API_KEY").ok().filter(|k| !k.is_empty());

        let model_id =
            env::var("MODEL_ID").unwrap_or_else(|_| "claude-3-5-haiku-20241022".to_string());

        Ok(Self {
            host,
            port,
            github_api_url,
            github_token,
            github_timeout_secs,
            content_timeout_secs,
            model_api_url,
            model_api_key,
            model_id,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
