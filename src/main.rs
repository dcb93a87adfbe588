//! LinguaQuiz · English MCQ / CEFR Quiz Backend
//!
//! - Axum HTTP API
//! - Optional LLM quiz generation (via environment variables)
//! - SQLite persistence + flat-file question log
//!
//! Important env variables:
//!   PORT           : u16 (default 3000)
//!   DATABASE_URL   : default "sqlite:linguaquiz.db"
//!   QUESTIONS_FILE : default "Generated/questions.json"
//!   OPENAI_API_KEY : enables LLM quiz generation if present
//!   OPENAI_BASE_URL: default "https://api.openai.com/v1"
//!   OPENAI_MODEL   : default "gpt-4o-mini"
//!   QUIZ_CONFIG_PATH : path to TOML config (prompt overrides)
//!   LOG_LEVEL      : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT     : "pretty" (default) or "json"

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{info, instrument};

use linguaquiz_backend::routes::build_router;
use linguaquiz_backend::state::AppState;
use linguaquiz_backend::telemetry;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (database, question log, LLM client, scorer).
  let state = AppState::new().await?;

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state);

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "linguaquiz_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
