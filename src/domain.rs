//! Domain models: articles, questions, users, CEFR results, and the
//! flat-file question record produced by the LLM pipeline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// CEFR proficiency labels, A1 (beginner) through C2 (mastery).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CefrLevel {
  A1,
  A2,
  B1,
  B2,
  C1,
  C2,
}

impl CefrLevel {
  pub fn as_str(&self) -> &'static str {
    match self {
      CefrLevel::A1 => "A1",
      CefrLevel::A2 => "A2",
      CefrLevel::B1 => "B1",
      CefrLevel::B2 => "B2",
      CefrLevel::C1 => "C1",
      CefrLevel::C2 => "C2",
    }
  }
}

impl std::fmt::Display for CefrLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for CefrLevel {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "A1" => Ok(CefrLevel::A1),
      "A2" => Ok(CefrLevel::A2),
      "B1" => Ok(CefrLevel::B1),
      "B2" => Ok(CefrLevel::B2),
      "C1" => Ok(CefrLevel::C1),
      "C2" => Ok(CefrLevel::C2),
      other => Err(format!("unknown CEFR level: {other}")),
    }
  }
}

/// An article submitted by a client; owns zero or more questions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Article {
  pub id: i64,
  pub title: String,
  pub content: String,
}

/// A question persisted against an article.
///
/// `choices` and `discussion` are only filled by the LLM pipeline; the
/// blank-fill pipeline leaves them empty.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
  pub id: i64,
  pub article_id: i64,
  pub question: String,
  pub answer: String,
  pub cefr_level: CefrLevel,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub choices: Option<Vec<Choice>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub discussion: Option<String>,
}

/// A registered user; owns zero or more CEFR results.
#[derive(Clone, Debug)]
pub struct User {
  pub id: i64,
  pub username: String,
  pub password: String,
}

/// One classification request outcome. Immutable history: rows are never
/// updated or deleted.
#[derive(Clone, Debug, Serialize)]
pub struct CefrResult {
  pub id: i64,
  pub user_id: i64,
  pub text: String,
  pub predicted_level: CefrLevel,
}

/// A single answer choice rendered as `{"a": "text"}` on the wire.
pub type Choice = BTreeMap<String, String>;

pub fn choice(letter: &str, text: impl Into<String>) -> Choice {
  let mut m = BTreeMap::new();
  m.insert(letter.to_string(), text.into());
  m
}

/// Flat-file question record appended to the generated-questions log.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeneratedQuestion {
  pub id: String,
  pub cefr_level: String,
  pub interest: String,
  pub subject: String,
  pub question: String,
  pub choices: Vec<Choice>,
  pub answer: String,
  pub discussion: String,
  pub created_at: DateTime<Utc>,
}

/// Question/answer pair produced by the blank-fill generator before it is
/// classified and persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlankQuestion {
  pub question: String,
  pub answer: String,
}
