//! Router assembly: HTTP endpoints, CORS, and HTTP tracing.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - quiz generation endpoints (LLM + blank-fill pipelines)
/// - user/article CRUD and CEFR classification
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(http::http_root))
        .route("/health", get(http::http_health))
        // LLM quiz pipeline + flat-file log
        .route("/generate_questions", get(http::http_generate_quiz))
        .route("/get_questions", get(http::http_get_questions))
        // Relational store
        .route("/users/", post(http::http_create_user))
        .route(
            "/articles/",
            post(http::http_create_article).get(http::http_list_articles),
        )
        // Blank-fill pipeline over a stored article
        .route("/generate/questions", post(http::http_generate_article_questions))
        // CEFR classification
        .route("/users/cefr-check", post(http::http_cefr_check))
        .route("/predict/cefr-level", post(http::http_predict_cefr))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
