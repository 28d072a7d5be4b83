//! End-to-end tests for the HTTP API
//!
//! Drives the real router against an in-memory store and an in-process
//! keyword classifier, so no network access is needed.

use async_trait::async_trait;
use audience_categorizer::{
    api::{build_router, AppState},
    config::ServerConfig,
    CategorizationService, Classification, Classifier, ClassifierError, FileStore, MemoryStore,
    PresentationStore,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// Files answers by keyword; counts calls
#[derive(Default)]
struct KeywordClassifier {
    calls: AtomicUsize,
}

#[async_trait]
impl Classifier for KeywordClassifier {
    async fn classify(
        &self,
        answer: &str,
        existing_categories: &[String],
    ) -> Result<Classification, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let lower = answer.to_lowercase();
        let name = if lower.contains("diagnos") {
            "AI Diagnostics"
        } else if lower.contains("bias") || lower.contains("privacy") {
            "Ethics"
        } else {
            "Other Interests"
        };
        Ok(Classification {
            category_name: name.to_string(),
            is_new: !existing_categories.iter().any(|c| c == name),
        })
    }
}

struct FailingClassifier;

#[async_trait]
impl Classifier for FailingClassifier {
    async fn classify(
        &self,
        _answer: &str,
        _existing_categories: &[String],
    ) -> Result<Classification, ClassifierError> {
        Err(ClassifierError::UpstreamUnavailable("Status 503".to_string()))
    }
}

fn app_with(classifier: Arc<dyn Classifier>) -> Router {
    app_on(Arc::new(MemoryStore::new()), classifier)
}

fn app_on(store: Arc<dyn PresentationStore>, classifier: Arc<dyn Classifier>) -> Router {
    let state = AppState {
        service: Arc::new(CategorizationService::new(store, classifier)),
    };
    build_router(state, &ServerConfig::default())
}

fn app() -> (Router, Arc<KeywordClassifier>) {
    let classifier = Arc::new(KeywordClassifier::default());
    (app_with(classifier.clone()), classifier)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_str(&body).unwrap())
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn test_categorize_example_flow() {
    let (app, _) = app();

    let (status, body) = post_json(
        &app,
        "/categorize?p=demo",
        json!({ "answer": "neural network diagnostics", "question": "What interests you?" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "AI Diagnostics");
    assert_eq!(body["is_new"], true);
    assert_eq!(
        body["message"],
        "Answer successfully categorized under: 'AI Diagnostics'"
    );
    assert_eq!(
        body["all_categories"],
        json!({ "AI Diagnostics": ["neural network diagnostics"] })
    );

    let (_, questions) = get_json(&app, "/questions?p=demo").await;
    assert_eq!(questions, json!(["What interests you?"]));

    let (_, categories) =
        get_json(&app, "/categories?p=demo&question=What%20interests%20you%3F").await;
    assert_eq!(
        categories,
        json!({ "AI Diagnostics": ["neural network diagnostics"] })
    );
}

#[tokio::test]
async fn test_submitted_answer_is_last_in_its_category() {
    let (app, _) = app();

    for answer in ["bias in triage", "  privacy of records  ", "diagnosis support"] {
        let (status, body) = post_json(&app, "/categorize", json!({ "answer": answer })).await;
        assert_eq!(status, StatusCode::OK);

        let category = body["category"].as_str().unwrap();
        let answers = body["all_categories"][category].as_array().unwrap();
        assert_eq!(answers.last().unwrap(), answer.trim());
    }

    let (_, body) = post_json(&app, "/categorize", json!({ "answer": "bias again" })).await;
    assert_eq!(body["is_new"], false);
    assert_eq!(
        body["all_categories"]["Ethics"],
        json!(["bias in triage", "privacy of records", "bias again"])
    );
}

#[tokio::test]
async fn test_empty_answer_is_rejected() {
    let (app, classifier) = app();

    let (status, body) = post_json(&app, "/categorize?p=demo", json!({ "answer": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Answer cannot be empty.");

    let (status, _) = post_json(&app, "/categorize?p=demo", json!({ "question": "Q" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    let (_, questions) = get_json(&app, "/questions?p=demo").await;
    assert_eq!(questions, json!([]));
}

#[tokio::test]
async fn test_invalid_json_body_is_rejected() {
    let (app, _) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/categorize")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_classifier_failure_returns_500() {
    let app = app_with(Arc::new(FailingClassifier));

    let (status, body) = post_json(&app, "/categorize?p=demo", json!({ "answer": "hello" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["detail"],
        "Error communicating with the classification service."
    );

    let (_, categories) = get_json(&app, "/categories?p=demo").await;
    assert_eq!(categories, json!({}));
}

#[tokio::test]
async fn test_unknown_presentation_reads_empty() {
    let (app, _) = app();

    let (status, questions) = get_json(&app, "/questions?p=nobody").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(questions, json!([]));

    let (status, categories) = get_json(&app, "/categories?p=nobody&question=Anything").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(categories, json!({}));
}

#[tokio::test]
async fn test_add_question_is_idempotent() {
    let (app, _) = app();

    for _ in 0..2 {
        let (status, body) = post_json(
            &app,
            "/admin/add_question?p=demo",
            json!({ "question": "What worries you?" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }

    let (_, questions) = get_json(&app, "/questions?p=demo").await;
    assert_eq!(questions, json!(["What worries you?"]));
}

#[tokio::test]
async fn test_add_question_accepts_form_and_rejects_blank() {
    let (app, _) = app();

    let request = Request::builder()
        .method("POST")
        .uri("/admin/add_question?p=demo")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("question=Favourite+tool%3F"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        post_json(&app, "/admin/add_question?p=demo", json!({ "question": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Question cannot be empty.");

    let (_, questions) = get_json(&app, "/questions?p=demo").await;
    assert_eq!(questions, json!(["Favourite tool?"]));
}

#[tokio::test]
async fn test_csv_export_has_one_row_per_answer() {
    let (app, _) = app();

    let submissions = [
        ("What interests you?", "neural network diagnostics"),
        ("What interests you?", "bias in \"smart\" triage"),
        ("What worries you?", "privacy, mostly"),
        ("What worries you?", "diagnostic errors"),
    ];
    for (question, answer) in submissions {
        let (status, _) = post_json(
            &app,
            "/categorize?p=demo",
            json!({ "answer": answer, "question": question }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let request = Request::builder()
        .uri("/admin/download_csv?p=demo")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert!(response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("demo-answers.csv"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "Question,Category,Answer");
    assert_eq!(lines.len(), 1 + submissions.len());
    assert!(lines.contains(
        &"\"What interests you?\",\"Ethics\",\"bias in \"\"smart\"\" triage\""
    ));
    assert!(lines.contains(&"\"What worries you?\",\"Ethics\",\"privacy, mostly\""));

    // Every answer visible through /categories appears exactly once
    for question in ["What%20interests%20you%3F", "What%20worries%20you%3F"] {
        let (_, categories) =
            get_json(&app, &format!("/categories?p=demo&question={}", question)).await;
        for (category, answers) in categories.as_object().unwrap() {
            for answer in answers.as_array().unwrap() {
                let escaped = answer.as_str().unwrap().replace('"', "\"\"");
                let needle = format!("\"{}\",\"{}\"", category, escaped);
                let hits = lines.iter().filter(|l| l.ends_with(&needle)).count();
                assert_eq!(hits, 1, "expected one row for {}", needle);
            }
        }
    }
}

#[tokio::test]
async fn test_presentations_are_isolated() {
    let (app, _) = app();

    post_json(&app, "/categorize?p=alpha", json!({ "answer": "bias" })).await;

    let (_, alpha) = get_json(&app, "/categories?p=alpha").await;
    let (_, beta) = get_json(&app, "/categories?p=beta").await;
    assert_eq!(alpha, json!({ "Ethics": ["bias"] }));
    assert_eq!(beta, json!({}));

    let (_, default_questions) = get_json(&app, "/questions").await;
    assert_eq!(default_questions, json!([]));
}

#[tokio::test]
async fn test_non_latin_questions_keep_separate_categories() {
    let (app, _) = app();

    let (status, _) = post_json(
        &app,
        "/categorize?p=jp",
        json!({ "question": "何に興味がありますか？", "answer": "bias" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // 何に興味がありますか？
    let (_, asked) = get_json(
        &app,
        "/categories?p=jp&question=%E4%BD%95%E3%81%AB%E8%88%88%E5%91%B3%E3%81%8C%E3%81%82%E3%82%8A%E3%81%BE%E3%81%99%E3%81%8B%EF%BC%9F",
    )
    .await;
    assert_eq!(asked, json!({ "Ethics": ["bias"] }));

    // 心配は？
    let (_, other) = get_json(&app, "/categories?p=jp&question=%E5%BF%83%E9%85%8D%E3%81%AF%EF%BC%9F").await;
    assert_eq!(other, json!({}));

    let (_, general) = get_json(&app, "/categories?p=jp").await;
    assert_eq!(general, json!({}));
}

#[tokio::test]
async fn test_malformed_query_returns_json_400() {
    let (app, _) = app();

    let (status, body) = get_json(&app, "/questions?p=a&p=b").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["detail"].as_str().unwrap().contains("duplicate field"));

    let (status, body) = post_json(&app, "/categorize?p=a&p=b", json!({ "answer": "bias" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_file_backend_survives_reopen() {
    let dir = std::env::temp_dir().join(format!("categorizer-api-{}", uuid::Uuid::new_v4()));

    {
        let store = Arc::new(FileStore::open(&dir).await.unwrap());
        let app = app_on(store, Arc::new(KeywordClassifier::default()));
        let (status, _) = post_json(
            &app,
            "/categorize?p=demo",
            json!({ "question": "What interests you?", "answer": "bias in models" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let store = Arc::new(FileStore::open(&dir).await.unwrap());
    let app = app_on(store, Arc::new(KeywordClassifier::default()));

    let (_, questions) = get_json(&app, "/questions?p=demo").await;
    assert_eq!(questions, json!(["What interests you?"]));

    let (_, body) = post_json(
        &app,
        "/categorize?p=demo",
        json!({ "question": "What interests you?", "answer": "privacy" }),
    )
    .await;
    assert_eq!(body["all_categories"], json!({ "Ethics": ["bias in models", "privacy"] }));
    assert_eq!(body["is_new"], false);

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn test_unknown_path_returns_json_404() {
    let (app, _) = app();

    let (status, body) = get_json(&app, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Not found");
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = app();

    for uri in ["/categorize", "/admin/download_csv", "/does-not-exist"] {
        let request = Request::builder()
            .method("OPTIONS")
            .uri(uri)
            .header("origin", "http://example.com")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-headers"], "content-type");
        assert!(headers["access-control-allow-methods"]
            .to_str()
            .unwrap()
            .contains("POST"));
    }
}

#[tokio::test]
async fn test_responses_carry_cors_origin() {
    let (app, _) = app();
    let request = Request::builder().uri("/questions").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_health_and_metrics() {
    let (app, _) = app();

    let (status, body) = get_json(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    post_json(&app, "/categorize", json!({ "answer": "bias" })).await;
    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let (status, text) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("categorize_requests_total"));
}
