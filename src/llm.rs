//! Minimal OpenAI-compatible client for quiz generation.
//!
//! We only call chat.completions and request a strict JSON object.
//! Calls are instrumented and log model names, latencies, and response sizes
//! (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::error::AppError;
use crate::util::{fill_template, trunc_for_log};

#[derive(Clone)]
pub struct LlmClient {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

/// Generation parameters accepted by the quiz endpoint. All free-form
/// strings; they are interpolated into the prompt, not validated.
#[derive(Clone, Debug)]
pub struct QuizParams {
  pub number: String,
  pub cefr_level: String,
  pub interest: String,
  pub subject: String,
  pub tone: String,
}

/// One decoded quiz entry: the question, lettered options, the correct
/// letter, and a discussion of why the answer is right.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct QuizItem {
  pub mcq: String,
  pub options: QuizOptions,
  pub correct: String,
  pub discussion: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct QuizOptions {
  pub a: String,
  pub b: String,
  pub c: String,
  pub d: String,
}

#[derive(Deserialize)]
struct QuizEnvelope {
  quiz: serde_json::Value,
}

impl LlmClient {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// JSON-object chat completion; returns the raw assistant content.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_json(&self, system: &str, user: &str, temperature: f32) -> Result<String, AppError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "linguaquiz-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| AppError::Llm(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_provider_error(&body).unwrap_or(body);
      return Err(AppError::Llm(format!("HTTP {}: {}", status, trunc_for_log(&msg, 300))));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| AppError::Llm(e.to_string()))?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "LLM usage");
    }
    let text = body.choices.get(0)
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default();

    Ok(text)
  }

  /// Render the MCQ prompt, call the model, and strictly decode the quiz.
  #[instrument(
    level = "info",
    skip(self, prompts, params),
    fields(number = %params.number, cefr_level = %params.cefr_level, subject = %params.subject, model = %self.model)
  )]
  pub async fn generate_quiz(
    &self,
    prompts: &Prompts,
    params: &QuizParams,
  ) -> Result<Vec<QuizItem>, AppError> {
    let user = fill_template(
      &prompts.quiz_user_template,
      &[
        ("number", params.number.as_str()),
        ("cefr_level", params.cefr_level.as_str()),
        ("interest", params.interest.as_str()),
        ("subject", params.subject.as_str()),
        ("tone", params.tone.as_str()),
        ("response_json", prompts.response_shape.as_str()),
      ],
    );

    let start = std::time::Instant::now();
    let result = self.chat_json(&prompts.quiz_system, &user, 0.7).await;
    let elapsed = start.elapsed();

    let content = match result {
      Ok(c) => {
        info!(?elapsed, content_len = c.len(), "Model response received");
        c
      }
      Err(e) => {
        error!(?elapsed, error = %e, "Model call failed during quiz generation");
        return Err(e);
      }
    };

    decode_quiz(&content)
  }
}

/// Decode the model payload: an object with a `quiz` field whose value is
/// either a JSON object or a string containing one, mapping question index
/// to quiz items. Items come back ordered by numeric index. Any mismatch
/// rejects the whole quiz; there is no partial acceptance.
pub fn decode_quiz(content: &str) -> Result<Vec<QuizItem>, AppError> {
  let envelope: QuizEnvelope =
    serde_json::from_str(content).map_err(|e| AppError::QuizParse(e.to_string()))?;

  let quiz_value = match envelope.quiz {
    serde_json::Value::String(s) => {
      serde_json::from_str(&s).map_err(|e| AppError::QuizParse(e.to_string()))?
    }
    v @ serde_json::Value::Object(_) => v,
    other => {
      return Err(AppError::QuizParse(format!(
        "quiz field is neither an object nor a string (got {})",
        value_kind(&other)
      )))
    }
  };

  let map: BTreeMap<String, QuizItem> =
    serde_json::from_value(quiz_value).map_err(|e| AppError::QuizParse(e.to_string()))?;

  let mut indexed: Vec<(usize, QuizItem)> = Vec::with_capacity(map.len());
  for (key, item) in map {
    let idx: usize = key
      .trim()
      .parse()
      .map_err(|_| AppError::QuizParse(format!("question index '{key}' is not a number")))?;
    indexed.push((idx, item));
  }
  indexed.sort_by_key(|(idx, _)| *idx);
  Ok(indexed.into_iter().map(|(_, item)| item).collect())
}

fn value_kind(v: &serde_json::Value) -> &'static str {
  match v {
    serde_json::Value::Null => "null",
    serde_json::Value::Bool(_) => "bool",
    serde_json::Value::Number(_) => "number",
    serde_json::Value::String(_) => "string",
    serde_json::Value::Array(_) => "array",
    serde_json::Value::Object(_) => "object",
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from a provider error body.
fn extract_provider_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item_json(mcq: &str) -> String {
    format!(
      r#"{{"mcq": "{mcq}", "options": {{"a": "one", "b": "two", "c": "three", "d": "four"}}, "correct": "b", "discussion": "because"}}"#
    )
  }

  #[test]
  fn decodes_quiz_as_direct_object() {
    let content = format!(r#"{{"quiz": {{"1": {}}}}}"#, item_json("Pick one"));
    let items = decode_quiz(&content).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].mcq, "Pick one");
    assert_eq!(items[0].correct, "b");
    assert_eq!(items[0].options.c, "three");
  }

  #[test]
  fn decodes_quiz_embedded_as_string() {
    let inner = format!(r#"{{"1": {}}}"#, item_json("Stringy"));
    let content =
      serde_json::to_string(&serde_json::json!({ "quiz": inner })).unwrap();
    let items = decode_quiz(&content).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].mcq, "Stringy");
  }

  #[test]
  fn orders_items_by_numeric_index() {
    let content = format!(
      r#"{{"quiz": {{"10": {}, "2": {}}}}}"#,
      item_json("tenth"),
      item_json("second")
    );
    let items = decode_quiz(&content).unwrap();
    assert_eq!(items[0].mcq, "second");
    assert_eq!(items[1].mcq, "tenth");
  }

  #[test]
  fn malformed_quiz_string_is_a_parse_error() {
    let content = r#"{"quiz": "this is not json"}"#;
    let err = decode_quiz(content).unwrap_err();
    assert!(matches!(err, AppError::QuizParse(_)));
  }

  #[test]
  fn missing_item_field_rejects_the_whole_quiz() {
    // "options" absent: no partial acceptance.
    let content = r#"{"quiz": {"1": {"mcq": "q", "correct": "a", "discussion": "d"}}}"#;
    let err = decode_quiz(content).unwrap_err();
    assert!(matches!(err, AppError::QuizParse(_)));
  }

  #[test]
  fn non_numeric_index_rejects_the_whole_quiz() {
    let content = format!(r#"{{"quiz": {{"first": {}}}}}"#, item_json("q"));
    let err = decode_quiz(&content).unwrap_err();
    assert!(matches!(err, AppError::QuizParse(_)));
  }

  #[test]
  fn quiz_array_is_rejected() {
    let content = r#"{"quiz": []}"#;
    let err = decode_quiz(content).unwrap_err();
    assert!(matches!(err, AppError::QuizParse(_)));
  }
}
