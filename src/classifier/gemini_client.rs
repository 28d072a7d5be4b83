//! Gemini `generateContent` classifier

use super::gemini_config::GeminiConfig;
use super::prompt;
use super::{Classification, Classifier, ClassifierError};
use crate::metrics::METRICS;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, error};

/// Classifier backed by the Gemini API
pub struct GeminiClassifier {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClassifier {
    /// Create a new Gemini classifier
    pub fn new(config: GeminiConfig) -> Result<Self, ClassifierError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClassifierError::NotConfigured(e.to_string()))?;

        Ok(Self { http, config })
    }

    async fn call_generate_api(
        &self,
        answer: &str,
        existing_categories: &[String],
    ) -> Result<Classification, ClassifierError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| ClassifierError::NotConfigured("GEMINI_API_KEY is not set".to_string()))?;

        let request_body = prompt::generate_request(answer, existing_categories);

        debug!(
            "Calling Gemini generateContent: model={}, {} existing categories",
            self.config.model,
            existing_categories.len()
        );

        let response = self
            .http
            .post(self.config.endpoint())
            .query(&[("key", api_key.expose_secret().as_str())])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ClassifierError::UpstreamUnavailable(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClassifierError::UpstreamUnavailable(format!(
                "Status {}: {}",
                status, error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClassifierError::UpstreamUnavailable(e.without_url().to_string()))?;

        parse_generate_response(&body)
    }
}

#[async_trait]
impl Classifier for GeminiClassifier {
    async fn classify(
        &self,
        answer: &str,
        existing_categories: &[String],
    ) -> Result<Classification, ClassifierError> {
        let start = Instant::now();
        let result = self.call_generate_api(answer, existing_categories).await;

        METRICS
            .classifier_request_duration
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(_) => METRICS.record_classifier_call("success"),
            Err(e) => {
                error!("Gemini classification failed: {}", e);
                METRICS.record_classifier_call(outcome_label(e));
            }
        }

        result
    }
}

fn outcome_label(err: &ClassifierError) -> &'static str {
    match err {
        ClassifierError::NotConfigured(_) => "not_configured",
        ClassifierError::UpstreamUnavailable(_) => "upstream_unavailable",
        ClassifierError::MalformedResponse(_) => "malformed_response",
        ClassifierError::EmptyCategory => "empty_category",
    }
}

// Response types for the Gemini API
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Extract the structured classification from a `generateContent` reply
fn parse_generate_response(body: &str) -> Result<Classification, ClassifierError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ClassifierError::MalformedResponse(format!("invalid envelope: {}", e)))?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            ClassifierError::MalformedResponse("no structured text in first candidate".to_string())
        })?;

    serde_json::from_str(&text)
        .map_err(|e| ClassifierError::MalformedResponse(format!("invalid classification: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(text: &str) -> String {
        serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    #[test]
    fn test_parse_valid_response() {
        let body = envelope(r#"{"category_name": "AI Diagnostics", "is_new": true}"#);
        let parsed = parse_generate_response(&body).unwrap();
        assert_eq!(parsed.category_name, "AI Diagnostics");
        assert!(parsed.is_new);
    }

    #[test]
    fn test_parse_missing_candidates() {
        let result = parse_generate_response(r#"{"candidates": []}"#);
        assert!(matches!(result, Err(ClassifierError::MalformedResponse(_))));

        let result = parse_generate_response(r#"{"promptFeedback": {}}"#);
        assert!(matches!(result, Err(ClassifierError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_wrong_shape() {
        let body = envelope(r#"{"label": "Ethics"}"#);
        let result = parse_generate_response(&body);
        assert!(matches!(result, Err(ClassifierError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_non_json() {
        let result = parse_generate_response("<html>502</html>");
        assert!(matches!(result, Err(ClassifierError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let classifier = GeminiClassifier::new(GeminiConfig::default()).unwrap();
        let result = classifier.classify("anything", &[]).await;
        assert!(matches!(result, Err(ClassifierError::NotConfigured(_))));
    }
}
