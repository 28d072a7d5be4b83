//! Request and response types for the HTTP API

use crate::store::CategoryMap;
use serde::{Deserialize, Serialize};

/// Error codes carried alongside `detail`
pub mod error_codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CLASSIFIER_ERROR: &str = "CLASSIFIER_ERROR";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// API error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub detail: String,
    pub code: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            code: code.into(),
        }
    }
}

/// `?p=` selector shared by most endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PresentationQuery {
    #[serde(default)]
    pub p: Option<String>,
}

/// `GET /categories` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoriesQuery {
    #[serde(default)]
    pub p: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
}

/// `POST /categorize` body
#[derive(Debug, Clone, Deserialize)]
pub struct CategorizeRequest {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub question: Option<String>,
}

/// `POST /categorize` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizeResponse {
    pub message: String,
    pub category: String,
    pub is_new: bool,
    pub all_categories: CategoryMap,
}

/// `POST /admin/add_question` body
#[derive(Debug, Clone, Deserialize)]
pub struct AddQuestionRequest {
    #[serde(default)]
    pub question: String,
}

/// `POST /admin/add_question` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddQuestionResponse {
    pub ok: bool,
}

/// `GET /` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
    pub status: String,
}
