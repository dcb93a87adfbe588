//! Application state: database pool, question log, prompts, LLM client,
//! and the CEFR scorer.
//!
//! Everything here is built once at startup and shared immutably across
//! request handlers; per-request mutation goes through the pool's own
//! transactions or the question store's lock.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::classifier::{CefrScorer, HeuristicScorer};
use crate::config::{load_quiz_config_from_env, Prompts, Settings};
use crate::db;
use crate::error::AppError;
use crate::llm::LlmClient;
use crate::qstore::QuestionStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub questions: Arc<QuestionStore>,
    pub prompts: Prompts,
    pub llm: Option<LlmClient>,
    pub scorer: Arc<dyn CefrScorer>,
}

impl AppState {
    /// Build state from env: load config, connect the database, open the
    /// question log, init the LLM client and the scorer.
    #[instrument(level = "info", skip_all)]
    pub async fn new() -> Result<Self, AppError> {
        Self::with_settings(Settings::from_env()).await
    }

    pub async fn with_settings(settings: Settings) -> Result<Self, AppError> {
        let prompts = load_quiz_config_from_env()
            .map(|c| c.prompts)
            .unwrap_or_default();

        let pool = db::connect(&settings.database_url).await?;
        let questions = Arc::new(QuestionStore::new(settings.questions_file.as_str()));

        let llm = LlmClient::from_env();
        if let Some(client) = &llm {
            info!(target: "linguaquiz_backend", base_url = %client.base_url, model = %client.model, "LLM quiz generation enabled.");
        } else {
            info!(target: "linguaquiz_backend", "LLM quiz generation disabled (no OPENAI_API_KEY).");
        }

        // Loaded once; every request shares this instance by reference.
        let scorer: Arc<dyn CefrScorer> = Arc::new(HeuristicScorer::new());

        Ok(Self { pool, questions, prompts, llm, scorer })
    }
}
