use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use lingua::sample::sample_catalog;
use lingua::{EngineConfig, LinguaApp};
use lingua_api::{ApiConfig, AppState, build_app};
use serde_json::{Value, json};
use tower::util::ServiceExt;

/// Create a test application with in-memory profiles and the starter curriculum
fn create_test_app() -> axum::Router {
    let config = EngineConfig::default();
    let lingua = LinguaApp::builder("lingua-api-test")
        .catalog(sample_catalog(&config).unwrap())
        .engine_config(config)
        .build()
        .unwrap();
    build_app(AppState::from(&lingua), &ApiConfig::default())
}

/// Helper function to make JSON requests
async fn json_request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request_builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    let request = if let Some(body) = body {
        request_builder
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    } else {
        request_builder.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let body: Value = if body_bytes.is_empty() {
        json!(null)
    } else {
        serde_json::from_slice(&body_bytes)
            .unwrap_or_else(|_| json!(String::from_utf8_lossy(&body_bytes).to_string()))
    };

    (status, body)
}

async fn register(app: &axum::Router, user_id: &str) -> (StatusCode, Value) {
    json_request(
        app,
        "POST",
        "/api/v1/users",
        Some(json!({ "user_id": user_id, "name": "Mia", "grade": 6 })),
    )
    .await
}

/// Answer every placement question wrong; ends at the first module
async fn finish_placement(app: &axum::Router, user_id: &str) -> Value {
    let uri = format!("/api/v1/users/{}/events", user_id);
    let mut last = json!(null);
    for _ in 0..15 {
        let (status, body) = json_request(
            app,
            "POST",
            &uri,
            Some(json!({ "event_type": "placement_answer", "payload": "zzz" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        last = body;
    }
    last
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app();
    let (status, body) = json_request(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "lingua-api");
    assert_eq!(body["modules"], 36);
}

#[tokio::test]
async fn test_register_returns_first_placement_question() {
    let app = create_test_app();
    let (status, body) = register(&app, "mia").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user_id"], "mia");
    assert_eq!(body["action"]["action"], "ask_placement_question");
    assert_eq!(body["action"]["number"], 1);
    assert_eq!(body["action"]["total"], 15);
}

#[tokio::test]
async fn test_register_conflict_and_validation() {
    let app = create_test_app();
    register(&app, "mia").await;

    let (status, body) = register(&app, "mia").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, _) = json_request(
        &app,
        "POST",
        "/api/v1/users",
        Some(json!({ "user_id": "leo", "name": "Leo", "grade": 11 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = json_request(
        &app,
        "POST",
        "/api/v1/users",
        Some(json!({ "user_id": "leo", "name": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_user_is_404() {
    let app = create_test_app();

    let (status, _) = json_request(
        &app,
        "POST",
        "/api/v1/users/ghost/events",
        Some(json!({ "event_type": "start" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = json_request(&app, "GET", "/api/v1/users/ghost/progress", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = json_request(
        &app,
        "POST",
        "/api/v1/users/ghost/dialogue",
        Some(json!({ "message": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_placement_then_exercise_flow() {
    let app = create_test_app();
    register(&app, "mia").await;

    let last = finish_placement(&app, "mia").await;
    assert_eq!(last["placement"]["correct"], 0);
    assert_eq!(last["placement"]["level"], "A1");
    assert_eq!(last["placement"]["module"], 1);
    assert_eq!(last["action"]["action"], "present_exercise");
    assert_eq!(last["action"]["exercise"]["exercise_id"], "A1-01-1");

    // Placement is over, so placement answers no longer fit
    let (status, _) = json_request(
        &app,
        "POST",
        "/api/v1/users/mia/events",
        Some(json!({ "event_type": "placement_answer", "payload": "am" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = json_request(
        &app,
        "POST",
        "/api/v1/users/mia/events",
        Some(json!({ "event_type": "exercise_answer", "payload": "cats" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["feedback"]["correct"], true);
    assert_eq!(body["action"]["exercise"]["index"], 2);

    let (status, body) = json_request(&app, "GET", "/api/v1/users/mia/progress", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress"]["level"], "A1");
    assert_eq!(body["progress"]["vocabulary_size"], 1);
    assert_eq!(body["progress"]["placement_answered"], 0);
    assert_eq!(body["progress"]["stage"], "learning");
}

#[tokio::test]
async fn test_review_requires_finished_placement() {
    let app = create_test_app();
    register(&app, "mia").await;

    let (status, _) = json_request(&app, "POST", "/api/v1/users/mia/review", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    finish_placement(&app, "mia").await;
    json_request(
        &app,
        "POST",
        "/api/v1/users/mia/events",
        Some(json!({ "event_type": "exercise_answer", "payload": "dogs" })),
    )
    .await;

    let (status, body) = json_request(&app, "POST", "/api/v1/users/mia/review", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"]["action"], "present_exercise");
    assert_eq!(body["action"]["is_retry"], true);
    assert_eq!(body["action"]["exercise"]["exercise_id"], "A1-01-1");
}

#[tokio::test]
async fn test_dialogue() {
    let app = create_test_app();
    register(&app, "mia").await;

    let (status, body) = json_request(
        &app,
        "POST",
        "/api/v1/users/mia/dialogue",
        Some(json!({ "message": "I goed to school", "mode": "correction" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["text"].as_str().unwrap().is_empty());

    let (status, _) = json_request(
        &app,
        "POST",
        "/api/v1/users/mia/dialogue",
        Some(json!({ "message": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_swagger_can_be_disabled() {
    let config = EngineConfig::default();
    let lingua = LinguaApp::builder("lingua-api-test")
        .catalog(sample_catalog(&config).unwrap())
        .build()
        .unwrap();
    let api_config = ApiConfig {
        enable_swagger: false,
        ..Default::default()
    };
    let app = build_app(AppState::from(&lingua), &api_config);

    let (status, _) = json_request(&app, "GET", "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = create_test_app();
    let (status, body) = json_request(&app, "GET", "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/users/{id}/events"].is_object());
}
