//! Public request/response structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and clients independently.

use serde::{Deserialize, Serialize};

use crate::domain::{CefrLevel, GeneratedQuestion, Question, User};

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct WelcomeOut {
    pub message: &'static str,
}

//
// Users
//

#[derive(Debug, Deserialize)]
pub struct CreateUserIn {
    pub username: String,
    pub password: String,
}

/// Public view of a user. The password never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserOut {
    pub id: i64,
    pub username: String,
}

impl From<User> for UserOut {
    fn from(u: User) -> Self {
        Self { id: u.id, username: u.username }
    }
}

//
// Articles
//

#[derive(Debug, Deserialize)]
pub struct CreateArticleIn {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ArticlesQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

//
// LLM quiz generation
//

#[derive(Debug, Deserialize)]
pub struct GenerateQuizQuery {
    pub number: Option<String>,
    pub cefr_level: Option<String>,
    pub interest: Option<String>,
    pub subject: Option<String>,
}

#[derive(Serialize)]
pub struct GenerateQuizOut {
    pub message: &'static str,
    pub output_file: String,
    pub data: Vec<GeneratedQuestion>,
}

//
// Blank-fill question generation
//

#[derive(Debug, Deserialize)]
pub struct GenerateQuestionsIn {
    pub article_id: i64,
}

#[derive(Serialize)]
pub struct QuestionsOut {
    pub questions: Vec<Question>,
}

//
// CEFR classification
//

#[derive(Debug, Deserialize)]
pub struct CefrCheckIn {
    pub user_id: i64,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct PredictIn {
    pub texts: Vec<String>,
}

#[derive(Serialize)]
pub struct PredictOut {
    pub predictions: Vec<CefrLevel>,
}
