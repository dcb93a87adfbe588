//! SQLite persistence: pool construction, schema init, and the
//! create-and-read repository functions used by the handlers.
//!
//! All entities are create-and-read only; no update or delete paths exist.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::info;

use crate::domain::{Article, BlankQuestion, CefrLevel, CefrResult, Question, User};
use crate::error::AppError;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        content TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS questions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        article_id INTEGER NOT NULL REFERENCES articles(id),
        question TEXT NOT NULL,
        answer TEXT NOT NULL,
        cefr_level TEXT NOT NULL,
        choices TEXT,
        discussion TEXT
    )",
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS cefr_results (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id),
        text TEXT NOT NULL,
        predicted_level TEXT NOT NULL
    )",
];

/// Connect to SQLite and make sure the schema exists. Foreign keys are
/// enforced on every pooled connection.
pub async fn connect(url: &str) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // A shared in-memory database only exists per connection; keep the pool
    // at one connection so tests see a single schema.
    let max_connections = if url.contains(":memory:") { 1 } else { 10 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await?;
    }
    info!(target: "linguaquiz_backend", %url, "Database ready");
    Ok(pool)
}

pub async fn create_user(pool: &SqlitePool, username: &str, password: &str) -> Result<User, AppError> {
    let result = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
        .bind(username)
        .bind(password)
        .execute(pool)
        .await;

    match result {
        Ok(done) => Ok(User {
            id: done.last_insert_rowid(),
            username: username.to_string(),
            password: password.to_string(),
        }),
        Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
            "username '{username}' is already taken"
        ))),
        Err(e) => Err(e.into()),
    }
}

pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<Option<User>, AppError> {
    let row = sqlx::query("SELECT id, username, password FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| User {
        id: row.get("id"),
        username: row.get("username"),
        password: row.get("password"),
    }))
}

pub async fn create_article(pool: &SqlitePool, title: &str, content: &str) -> Result<Article, AppError> {
    let done = sqlx::query("INSERT INTO articles (title, content) VALUES (?, ?)")
        .bind(title)
        .bind(content)
        .execute(pool)
        .await?;

    Ok(Article {
        id: done.last_insert_rowid(),
        title: title.to_string(),
        content: content.to_string(),
    })
}

pub async fn get_article(pool: &SqlitePool, id: i64) -> Result<Option<Article>, AppError> {
    let row = sqlx::query("SELECT id, title, content FROM articles WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| Article {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
    }))
}

pub async fn list_articles(pool: &SqlitePool, skip: i64, limit: i64) -> Result<Vec<Article>, AppError> {
    let rows = sqlx::query("SELECT id, title, content FROM articles ORDER BY id LIMIT ? OFFSET ?")
        .bind(limit)
        .bind(skip)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| Article {
            id: row.get("id"),
            title: row.get("title"),
            content: row.get("content"),
        })
        .collect())
}

/// Persist one batch of generated questions in a single transaction, so a
/// failure mid-batch leaves no partial writes behind.
pub async fn insert_questions(
    pool: &SqlitePool,
    article_id: i64,
    items: &[(BlankQuestion, CefrLevel)],
) -> Result<Vec<Question>, AppError> {
    let mut tx = pool.begin().await?;
    let mut saved = Vec::with_capacity(items.len());

    for (item, level) in items {
        let done = sqlx::query(
            "INSERT INTO questions (article_id, question, answer, cefr_level) VALUES (?, ?, ?, ?)",
        )
        .bind(article_id)
        .bind(&item.question)
        .bind(&item.answer)
        .bind(level.as_str())
        .execute(&mut *tx)
        .await?;

        saved.push(Question {
            id: done.last_insert_rowid(),
            article_id,
            question: item.question.clone(),
            answer: item.answer.clone(),
            cefr_level: *level,
            choices: None,
            discussion: None,
        });
    }

    tx.commit().await?;
    Ok(saved)
}

pub async fn count_questions(pool: &SqlitePool, article_id: i64) -> Result<i64, AppError> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM questions WHERE article_id = ?")
        .bind(article_id)
        .fetch_one(pool)
        .await?;
    Ok(row.get("n"))
}

pub async fn create_cefr_result(
    pool: &SqlitePool,
    user_id: i64,
    text: &str,
    predicted_level: CefrLevel,
) -> Result<CefrResult, AppError> {
    let done = sqlx::query(
        "INSERT INTO cefr_results (user_id, text, predicted_level) VALUES (?, ?, ?)",
    )
    .bind(user_id)
    .bind(text)
    .bind(predicted_level.as_str())
    .execute(pool)
    .await?;

    Ok(CefrResult {
        id: done.last_insert_rowid(),
        user_id,
        text: text.to_string(),
        predicted_level,
    })
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
