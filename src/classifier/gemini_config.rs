//! Configuration for the Gemini classifier

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// Gemini client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// API key (read from env GEMINI_API_KEY if not set)
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Service base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API version path segment
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Model used for classification
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

// Default value functions
fn default_base_url() -> String { "https://generativelanguage.googleapis.com".to_string() }
fn default_api_version() -> String { "v1beta".to_string() }
fn default_model() -> String { "gemini-2.5-flash-preview-05-20".to_string() }
fn default_timeout_ms() -> u64 { 30_000 }

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            api_version: default_api_version(),
            model: default_model(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl GeminiConfig {
    /// Override with environment variables if present
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("GEMINI_API_KEY") {
            if !val.trim().is_empty() {
                self.api_key = Some(SecretString::new(val));
            }
        }

        if let Ok(val) = std::env::var("GEMINI_MODEL") {
            self.model = val;
        }

        if let Ok(val) = std::env::var("GEMINI_BASE_URL") {
            self.base_url = val;
        }

        if let Ok(val) = std::env::var("GEMINI_TIMEOUT_MS") {
            if let Ok(timeout) = val.parse() {
                self.timeout_ms = timeout;
            }
        }

        self
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// `generateContent` URL for the configured model, without the key
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.api_version.trim_matches('/'),
            self.model
        )
    }
}
