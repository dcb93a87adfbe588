//! Append-only flat-file log of LLM-generated question batches.
//!
//! File layout is `{"questions": [...]}`. The read-modify-write cycle is
//! serialized behind an exclusive async lock so concurrent appends cannot
//! lose each other's batches.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::domain::GeneratedQuestion;
use crate::error::AppError;

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct QuestionLog {
  pub questions: Vec<GeneratedQuestion>,
}

pub struct QuestionStore {
  path: PathBuf,
  lock: Mutex<()>,
}

impl QuestionStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), lock: Mutex::new(()) }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Full log contents. NotFound if no batch has ever been written.
  pub async fn read_all(&self) -> Result<QuestionLog, AppError> {
    let _guard = self.lock.lock().await;
    self.read_unlocked()
  }

  fn read_unlocked(&self) -> Result<QuestionLog, AppError> {
    if !self.path.exists() {
      return Err(AppError::NotFound(
        "No questions file found. Generate questions first.".into(),
      ));
    }
    let raw = std::fs::read_to_string(&self.path)?;
    Ok(serde_json::from_str(&raw)?)
  }

  /// Append a batch: read the existing log (or start empty), extend, write
  /// back. Holding the lock across the whole cycle is what makes the log
  /// append-only in effect.
  #[instrument(level = "debug", skip(self, batch), fields(batch_len = batch.len()))]
  pub async fn append(&self, batch: &[GeneratedQuestion]) -> Result<(), AppError> {
    let _guard = self.lock.lock().await;

    let mut log = match self.read_unlocked() {
      Ok(log) => log,
      Err(AppError::NotFound(_)) => QuestionLog::default(),
      Err(e) => return Err(e),
    };
    log.questions.extend_from_slice(batch);

    if let Some(parent) = self.path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)?;
      }
    }
    std::fs::write(&self.path, serde_json::to_string_pretty(&log)?)?;
    info!(target: "quiz", path = %self.path.display(), total = log.questions.len(), "Question log updated");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::choice;
  use chrono::Utc;

  fn sample(n: usize) -> Vec<GeneratedQuestion> {
    (0..n)
      .map(|i| GeneratedQuestion {
        id: format!("id-{i}"),
        cefr_level: "B1".into(),
        interest: "space".into(),
        subject: "grammar".into(),
        question: format!("Question {i}?"),
        choices: vec![
          choice("a", "alpha"),
          choice("b", "beta"),
          choice("c", "gamma"),
          choice("d", "delta"),
        ],
        answer: "a".into(),
        discussion: "because".into(),
        created_at: Utc::now(),
      })
      .collect()
  }

  #[tokio::test]
  async fn missing_file_reads_as_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = QuestionStore::new(dir.path().join("questions.json"));
    let err = store.read_all().await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
  }

  #[tokio::test]
  async fn round_trips_a_batch_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = QuestionStore::new(dir.path().join("Generated").join("questions.json"));

    let batch = sample(5);
    store.append(&batch).await.unwrap();

    let log = store.read_all().await.unwrap();
    assert_eq!(log.questions, batch);
  }

  #[tokio::test]
  async fn appends_accumulate_across_batches() {
    let dir = tempfile::tempdir().unwrap();
    let store = QuestionStore::new(dir.path().join("questions.json"));

    let first = sample(2);
    let second = sample(3);
    store.append(&first).await.unwrap();
    store.append(&second).await.unwrap();

    let log = store.read_all().await.unwrap();
    assert_eq!(log.questions.len(), 5);
    assert_eq!(&log.questions[..2], &first[..]);
    assert_eq!(&log.questions[2..], &second[..]);
  }
}
