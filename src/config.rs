//! Loading quiz configuration (prompts + runtime settings) from TOML and env.
//!
//! See `QuizConfig` and `Prompts` for the expected TOML schema.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct QuizConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Prompts used by the LLM quiz generator. Defaults reproduce the stock
/// MCQ-creator instructions; override them in TOML to tune tone/structure.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub quiz_system: String,
  pub quiz_user_template: String,
  /// Example JSON object embedded in the prompt so the model mirrors the
  /// expected output shape.
  pub response_shape: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      quiz_system: "You are an expert MCQ creator for English learners. Respond ONLY with strict JSON.".into(),
      quiz_user_template: "You are an expert {subject} MCQ creator. Your task is to create a {subject} quiz with {number} multiple-choice questions, suitable for TOEFL practice. Ensure that the questions align with the {cefr_level} proficiency level and are tailored to the learner's interest in {interest}.\n\nThe tone of the quiz should be {tone}. Make sure the questions test various aspects of {subject} in a diverse and accurate manner, adhering to {subject} rules.\n\nIn addition to the quiz, for each question, provide a detailed explanation of why the correct answer is right and why the incorrect options are wrong. These explanations should serve as a discussion for learners who select the wrong answers.\n\nFormat your response in the structure of {response_json}, and ensure to create exactly {number} well-crafted, {subject}-focused MCQs along with discussions.".into(),
      response_shape: r#"{"quiz": {"1": {"mcq": "question text", "options": {"a": "choice", "b": "choice", "c": "choice", "d": "choice"}, "correct": "a", "discussion": "why the correct answer is right and the others are wrong"}}}"#.into(),
    }
  }
}

/// Attempt to load `QuizConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_quiz_config_from_env() -> Option<QuizConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<QuizConfig>(&s) {
      Ok(cfg) => {
        info!(target: "linguaquiz_backend", %path, "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "linguaquiz_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "linguaquiz_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

/// Runtime settings resolved from the environment at startup.
#[derive(Clone, Debug)]
pub struct Settings {
  pub database_url: String,
  pub questions_file: String,
}

impl Settings {
  pub fn from_env() -> Self {
    let database_url =
      std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:linguaquiz.db".into());
    let questions_file =
      std::env::var("QUESTIONS_FILE").unwrap_or_else(|_| "Generated/questions.json".into());
    Self { database_url, questions_file }
  }
}
