//! Core behaviors shared by the HTTP handlers.
//!
//! This includes:
//!   - Running the blank-fill pipeline over an article and persisting rows
//!   - Running the LLM quiz generator and appending to the question log
//!   - Cleaning + classifying text on behalf of a user

use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db;
use crate::domain::{choice, BlankQuestion, CefrLevel, CefrResult, GeneratedQuestion, Question};
use crate::error::AppError;
use crate::llm::{QuizItem, QuizParams};
use crate::nlp;
use crate::state::AppState;

/// Extract keywords from a stored article, build blank-fill questions,
/// classify each question text, and persist the batch. 404s when the
/// article does not exist, before anything is written.
#[instrument(level = "info", skip(state), fields(%article_id))]
pub async fn generate_article_questions(
  state: &AppState,
  article_id: i64,
) -> Result<Vec<Question>, AppError> {
  let article = db::get_article(&state.pool, article_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Article not found".into()))?;

  let keywords = nlp::extract_keywords(&article.content);
  let blanks = nlp::generate_blank_questions(&article.content, &keywords);

  let cleaned: Vec<String> = blanks.iter().map(|q| nlp::clean_text(&q.question)).collect();
  let levels = state.scorer.predict(&cleaned);

  let items: Vec<(BlankQuestion, CefrLevel)> = blanks.into_iter().zip(levels).collect();
  let saved = db::insert_questions(&state.pool, article_id, &items).await?;
  info!(target: "quiz", %article_id, count = saved.len(), "Blank-fill questions persisted");
  Ok(saved)
}

/// Run the LLM generator, flatten the quiz into flat-file records, and
/// append them to the question log. A decode failure aborts before the log
/// is touched.
#[instrument(level = "info", skip(state, params), fields(number = %params.number, cefr_level = %params.cefr_level, subject = %params.subject))]
pub async fn generate_llm_questions(
  state: &AppState,
  params: &QuizParams,
) -> Result<Vec<GeneratedQuestion>, AppError> {
  let client = state.llm.as_ref().ok_or(AppError::LlmUnavailable)?;
  let items = client.generate_quiz(&state.prompts, params).await?;

  let now = Utc::now();
  let batch: Vec<GeneratedQuestion> =
    items.into_iter().map(|item| flatten_item(item, params, now)).collect();

  state.questions.append(&batch).await?;
  info!(target: "quiz", count = batch.len(), "LLM questions appended to log");
  Ok(batch)
}

fn flatten_item(item: QuizItem, params: &QuizParams, now: DateTime<Utc>) -> GeneratedQuestion {
  GeneratedQuestion {
    id: Uuid::new_v4().to_string(),
    cefr_level: params.cefr_level.clone(),
    interest: params.interest.clone(),
    subject: params.subject.clone(),
    question: item.mcq,
    choices: vec![
      choice("a", item.options.a),
      choice("b", item.options.b),
      choice("c", item.options.c),
      choice("d", item.options.d),
    ],
    answer: item.correct,
    discussion: item.discussion,
    created_at: now,
  }
}

/// Clean a text, classify it, and persist the outcome against a user. The
/// stored text is the raw input; cleaning only feeds the classifier.
#[instrument(level = "info", skip(state, text), fields(%user_id, text_len = text.len()))]
pub async fn cefr_check(state: &AppState, user_id: i64, text: &str) -> Result<CefrResult, AppError> {
  db::get_user(&state.pool, user_id)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".into()))?;

  let cleaned = nlp::clean_text(text);
  let level = state.scorer.predict_one(&cleaned);
  db::create_cefr_result(&state.pool, user_id, text, level).await
}
