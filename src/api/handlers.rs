//! HTTP handlers

use super::csv;
use super::extract::{ApiQuery, JsonOrForm};
use super::models::*;
use crate::categorize::CategorizationService;
use crate::classifier::ClassifierError;
use crate::error::Error;
use crate::metrics::METRICS;
use crate::store::{ascii_slug, presentation_id};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CategorizationService>,
}

pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

/// Map a service error onto a status and a client-safe message
pub fn error_response(err: Error) -> (StatusCode, Json<ApiError>) {
    match err {
        Error::InvalidInput(detail) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(error_codes::VALIDATION_ERROR, detail)),
        ),
        Error::Classifier(e) => {
            error!("Classification failed: {}", e);
            let (code, detail) = match e {
                ClassifierError::NotConfigured(_) => (
                    error_codes::CLASSIFIER_ERROR,
                    "Classification service is not configured.",
                ),
                ClassifierError::UpstreamUnavailable(_) => (
                    error_codes::UPSTREAM_ERROR,
                    "Error communicating with the classification service.",
                ),
                ClassifierError::MalformedResponse(_) => (
                    error_codes::UPSTREAM_ERROR,
                    "Could not parse structured response from AI.",
                ),
                ClassifierError::EmptyCategory => (
                    error_codes::CLASSIFIER_ERROR,
                    "AI returned no category for this answer.",
                ),
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(code, detail)),
            )
        }
        other => {
            error!("Request failed: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(error_codes::INTERNAL_ERROR, "Internal server error")),
            )
        }
    }
}

/// Health check
///
/// GET /
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Audience categorizer API is running!".to_string(),
        status: "ok".to_string(),
    })
}

/// List registered questions
///
/// GET /questions?p=<id>
pub async fn list_questions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PresentationQuery>,
) -> ApiResult<Json<Vec<String>>> {
    state
        .service
        .questions(query.p.as_deref())
        .await
        .map(Json)
        .map_err(error_response)
}

/// Category map for one question
///
/// GET /categories?p=<id>&question=<text>
pub async fn get_categories(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CategoriesQuery>,
) -> ApiResult<Json<crate::store::CategoryMap>> {
    state
        .service
        .categories(query.p.as_deref(), query.question.as_deref())
        .await
        .map(Json)
        .map_err(error_response)
}

/// Categorize an answer
///
/// POST /categorize?p=<id>
pub async fn categorize(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PresentationQuery>,
    JsonOrForm(request): JsonOrForm<CategorizeRequest>,
) -> ApiResult<Json<CategorizeResponse>> {
    let result = state
        .service
        .categorize(
            query.p.as_deref(),
            request.question.as_deref(),
            &request.answer,
        )
        .await;

    match result {
        Ok(outcome) => {
            METRICS.record_categorize(true, outcome.created);

            Ok(Json(CategorizeResponse {
                message: format!(
                    "Answer successfully categorized under: '{}'",
                    outcome.category
                ),
                category: outcome.category,
                is_new: outcome.is_new,
                all_categories: outcome.categories,
            }))
        }
        Err(e) => {
            METRICS.record_categorize(false, false);
            if let Error::InvalidInput(ref detail) = e {
                warn!("Rejected categorize request: {}", detail);
            }
            Err(error_response(e))
        }
    }
}

/// Register a question
///
/// POST /admin/add_question?p=<id>
pub async fn add_question(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PresentationQuery>,
    JsonOrForm(request): JsonOrForm<AddQuestionRequest>,
) -> ApiResult<Json<AddQuestionResponse>> {
    state
        .service
        .add_question(query.p.as_deref(), &request.question)
        .await
        .map(|_| Json(AddQuestionResponse { ok: true }))
        .map_err(error_response)
}

/// Export all answers as CSV
///
/// GET /admin/download_csv?p=<id>
pub async fn download_csv(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PresentationQuery>,
) -> ApiResult<Response> {
    let document = state
        .service
        .export(query.p.as_deref())
        .await
        .map_err(error_response)?;

    let body = csv::render(&document);
    METRICS.csv_exports.inc();
    info!(
        "CSV export: presentation={}, {} bytes",
        document.presentation,
        body.len()
    );

    let filename = format!(
        "attachment; filename=\"{}-answers.csv\"",
        ascii_slug(&presentation_id(query.p.as_deref()))
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        body,
    )
        .into_response())
}

/// Prometheus exposition
///
/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.export_prometheus(),
    )
}

/// JSON 404 for anything unrouted
pub async fn not_found() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(error_codes::NOT_FOUND, "Not found")),
    )
}
