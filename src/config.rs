//! Environment-driven configuration

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub openai_api_key: Option<String>,
    /// Override for the chat-completions endpoint (gateway or
    /// compatible local server)
    pub openai_base_url: Option<String>,
    pub model: String,
    pub murf_api_key: Option<String>,
    /// Directory holding the persisted JSON documents
    pub data_dir: PathBuf,
    pub listen_timeout: Duration,
    /// Ambient-noise sampling window handed to the speech-input service
    pub silence_threshold: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let listen_timeout_secs = std::env::var("PARLANCE_LISTEN_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8);
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openai_base_url: std::env::var("OPENAI_BASE_URL").ok(),
            model: std::env::var("PARLANCE_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            murf_api_key: std::env::var("MURF_API_KEY").ok(),
            data_dir: std::env::var("PARLANCE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            listen_timeout: Duration::from_secs(listen_timeout_secs),
            silence_threshold: Duration::from_millis(500),
        }
    }
}
