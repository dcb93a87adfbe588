use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use linguaquiz_backend::classifier::HeuristicScorer;
use linguaquiz_backend::config::Prompts;
use linguaquiz_backend::db;
use linguaquiz_backend::qstore::QuestionStore;
use linguaquiz_backend::routes::build_router;
use linguaquiz_backend::state::AppState;

async fn test_state(dir: &TempDir) -> AppState {
    let pool = db::connect("sqlite::memory:").await.expect("in-memory pool");
    AppState {
        pool,
        questions: Arc::new(QuestionStore::new(dir.path().join("questions.json"))),
        prompts: Prompts::default(),
        llm: None,
        scorer: Arc::new(HeuristicScorer::new()),
    }
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn created_user_has_no_password_in_response() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    let response = build_router(state)
        .oneshot(post("/users/", json!({"username": "ada", "password": "hunter2"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["username"], "ada");
    assert!(body.get("password").is_none(), "password must not be echoed");
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    let first = build_router(state.clone())
        .oneshot(post("/users/", json!({"username": "ada", "password": "x"})))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = build_router(state)
        .oneshot(post("/users/", json!({"username": "ada", "password": "y"})))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let body = body_json(second).await;
    assert!(body["error"].as_str().unwrap().contains("ada"));
}

#[tokio::test]
async fn articles_create_and_paginate() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    for i in 0..5 {
        let response = build_router(state.clone())
            .oneshot(post(
                "/articles/",
                json!({"title": format!("title {i}"), "content": "Some body."}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = build_router(state)
        .oneshot(get("/articles/?skip=1&limit=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["title"], "title 1");
    assert_eq!(list[1]["title"], "title 2");
}

#[tokio::test]
async fn generate_questions_for_unknown_article_is_404_with_no_writes() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;
    let pool = state.pool.clone();

    let response = build_router(state)
        .oneshot(post("/generate/questions", json!({"article_id": 42})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Article not found");

    let total = db::count_questions(&pool, 42).await.unwrap();
    assert_eq!(total, 0, "404 must not leave question rows behind");
}

#[tokio::test]
async fn generate_questions_blanks_keywords_from_the_article() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    let created = build_router(state.clone())
        .oneshot(post(
            "/articles/",
            json!({
                "title": "Paris",
                "content": "Paris is the capital of France. Many people visit Paris every year."
            }),
        ))
        .await
        .unwrap();
    let article = body_json(created).await;
    let article_id = article["id"].as_i64().unwrap();

    let response = build_router(state)
        .oneshot(post("/generate/questions", json!({"article_id": article_id})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let questions = body["questions"].as_array().unwrap();
    assert!(!questions.is_empty());

    let mut answers = std::collections::HashSet::new();
    for q in questions {
        assert!(q["question"].as_str().unwrap().contains("_____"));
        assert!(q["cefr_level"].is_string());
        assert!(
            answers.insert(q["answer"].as_str().unwrap().to_lowercase()),
            "answers must be unique"
        );
    }
}

#[tokio::test]
async fn cefr_check_unknown_user_is_404() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    let response = build_router(state)
        .oneshot(post("/users/cefr-check", json!({"user_id": 7, "text": "Hello."})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cefr_check_persists_and_returns_the_result() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    let user = build_router(state.clone())
        .oneshot(post("/users/", json!({"username": "bo", "password": "p"})))
        .await
        .unwrap();
    let user_id = body_json(user).await["id"].as_i64().unwrap();

    let response = build_router(state)
        .oneshot(post(
            "/users/cefr-check",
            json!({"user_id": user_id, "text": "The weather is nice today."}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["user_id"].as_i64().unwrap(), user_id);
    assert_eq!(body["text"], "The weather is nice today.");
    assert!(body["predicted_level"].is_string());
}

#[tokio::test]
async fn predict_endpoint_classifies_each_text() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    let response = build_router(state)
        .oneshot(post(
            "/predict/cefr-level",
            json!({"texts": ["I like cats.", "Quantum entanglement defies classical intuition."]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["predictions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn get_questions_is_404_before_any_generation() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    let response = build_router(state)
        .oneshot(get("/get_questions"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn llm_generation_without_api_key_fails_and_leaves_log_untouched() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    let response = build_router(state.clone())
        .oneshot(get("/generate_questions?number=3&cefr_level=B1&interest=space&subject=grammar"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert!(body["error"].is_string());

    // Nothing was appended: the log still does not exist.
    let follow_up = build_router(state)
        .oneshot(get("/get_questions"))
        .await
        .unwrap();
    assert_eq!(follow_up.status(), StatusCode::NOT_FOUND);
}
