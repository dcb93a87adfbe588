//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use axum::extract::{Query, State};
use axum::Json;
use tracing::{info, instrument};

use crate::db;
use crate::domain::{Article, CefrResult};
use crate::error::AppError;
use crate::llm::QuizParams;
use crate::logic;
use crate::nlp;
use crate::protocol::*;
use crate::qstore::QuestionLog;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_root() -> Json<WelcomeOut> {
    Json(WelcomeOut { message: "Welcome to the CEFR prediction API" })
}

#[instrument(level = "info")]
pub async fn http_health() -> Json<HealthOut> {
    Json(HealthOut { ok: true })
}

/// GET /generate_questions — LLM pipeline; appends the batch to the
/// flat-file log and returns it.
#[instrument(level = "info", skip(state, q))]
pub async fn http_generate_quiz(
    State(state): State<AppState>,
    Query(q): Query<GenerateQuizQuery>,
) -> Result<Json<GenerateQuizOut>, AppError> {
    let params = QuizParams {
        number: q.number.unwrap_or_else(|| "anything".into()),
        cefr_level: q.cefr_level.unwrap_or_else(|| "anything".into()),
        interest: q.interest.unwrap_or_else(|| "anything".into()),
        subject: q.subject.unwrap_or_else(|| "anything".into()),
        tone: "conversational".into(),
    };
    let data = logic::generate_llm_questions(&state, &params).await?;
    info!(target: "quiz", count = data.len(), "HTTP quiz batch generated");
    Ok(Json(GenerateQuizOut {
        message: "Questions generated and appended successfully",
        output_file: state.questions.path().display().to_string(),
        data,
    }))
}

/// GET /get_questions — full contents of the flat-file log; 404 when no
/// batch has ever been generated.
#[instrument(level = "info", skip(state))]
pub async fn http_get_questions(
    State(state): State<AppState>,
) -> Result<Json<QuestionLog>, AppError> {
    Ok(Json(state.questions.read_all().await?))
}

#[instrument(level = "info", skip(state, body), fields(username = %body.username))]
pub async fn http_create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserIn>,
) -> Result<Json<UserOut>, AppError> {
    let user = db::create_user(&state.pool, &body.username, &body.password).await?;
    info!(target: "linguaquiz_backend", id = user.id, "User created");
    Ok(Json(user.into()))
}

#[instrument(level = "info", skip(state, body), fields(title = %body.title, content_len = body.content.len()))]
pub async fn http_create_article(
    State(state): State<AppState>,
    Json(body): Json<CreateArticleIn>,
) -> Result<Json<Article>, AppError> {
    let article = db::create_article(&state.pool, &body.title, &body.content).await?;
    info!(target: "linguaquiz_backend", id = article.id, "Article created");
    Ok(Json(article))
}

#[instrument(level = "info", skip(state, q))]
pub async fn http_list_articles(
    State(state): State<AppState>,
    Query(q): Query<ArticlesQuery>,
) -> Result<Json<Vec<Article>>, AppError> {
    let skip = q.skip.unwrap_or(0).max(0);
    let limit = q.limit.unwrap_or(10).max(0);
    Ok(Json(db::list_articles(&state.pool, skip, limit).await?))
}

/// POST /generate/questions — blank-fill pipeline over a stored article.
#[instrument(level = "info", skip(state, body), fields(article_id = body.article_id))]
pub async fn http_generate_article_questions(
    State(state): State<AppState>,
    Json(body): Json<GenerateQuestionsIn>,
) -> Result<Json<QuestionsOut>, AppError> {
    let questions = logic::generate_article_questions(&state, body.article_id).await?;
    info!(target: "quiz", article_id = body.article_id, count = questions.len(), "HTTP blank-fill questions served");
    Ok(Json(QuestionsOut { questions }))
}

#[instrument(level = "info", skip(state, body), fields(user_id = body.user_id, text_len = body.text.len()))]
pub async fn http_cefr_check(
    State(state): State<AppState>,
    Json(body): Json<CefrCheckIn>,
) -> Result<Json<CefrResult>, AppError> {
    let result = logic::cefr_check(&state, body.user_id, &body.text).await?;
    info!(target: "linguaquiz_backend", id = result.id, level = %result.predicted_level, "CEFR result recorded");
    Ok(Json(result))
}

/// POST /predict/cefr-level — batch classification, no persistence.
#[instrument(level = "info", skip(state, body), fields(batch = body.texts.len()))]
pub async fn http_predict_cefr(
    State(state): State<AppState>,
    Json(body): Json<PredictIn>,
) -> Json<PredictOut> {
    let cleaned: Vec<String> = body.texts.iter().map(|t| nlp::clean_text(t)).collect();
    Json(PredictOut { predictions: state.scorer.predict(&cleaned) })
}
