//! Classifier adapter
//!
//! The external AI service is treated as an opaque function:
//! answer text + existing category names -> `{category_name, is_new}`.
//! [`GeminiClassifier`] is the production implementation.

pub mod gemini_client;
pub mod gemini_config;
pub mod prompt;

pub use gemini_client::GeminiClassifier;
pub use gemini_config::GeminiConfig;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Classifier error types
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Classifier is not configured: {0}")]
    NotConfigured(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Classifier returned no category")]
    EmptyCategory,
}

/// Structured verdict for one answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category_name: String,
    pub is_new: bool,
}

/// Assigns an answer to an existing category or proposes a new one
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        answer: &str,
        existing_categories: &[String],
    ) -> Result<Classification, ClassifierError>;
}
