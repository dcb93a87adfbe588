//! Classical question-generation pipeline: text cleaning, sentence and word
//! tokenization, keyword extraction (entities + frequency), and blank-fill
//! substitution.
//!
//! Entity recognition is a capitalization heuristic rather than a model:
//! runs of capitalized words count, except a lone sentence-initial word
//! (capitalized by position, not by name).

use std::collections::{HashMap, HashSet};

use regex::{Regex, RegexBuilder};

use crate::domain::BlankQuestion;

/// Placeholder substring that masks the answer inside a question.
pub const BLANK_MARKER: &str = "_____";

/// How many frequency-ranked tokens join the keyword candidates.
const TOP_FREQUENT_TOKENS: usize = 20;

/// Normalize raw text before classification: lowercase, drop digits, drop
/// anything that is neither a word character nor whitespace. Idempotent.
pub fn clean_text(text: &str) -> String {
  text
    .to_lowercase()
    .chars()
    .filter(|c| !c.is_numeric())
    .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
    .collect()
}

/// Split text into sentences on `.`, `!`, `?` followed by whitespace or end
/// of input. Terminators stay attached to their sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
  let mut out = Vec::new();
  let mut start = 0;
  let chars: Vec<(usize, char)> = text.char_indices().collect();
  for (i, (pos, ch)) in chars.iter().copied().enumerate() {
    if matches!(ch, '.' | '!' | '?') {
      // "3.5" must not split: require whitespace (or end) after the mark.
      let next = chars.get(i + 1).map(|(_, c)| *c);
      if next.map_or(true, |c| c.is_whitespace()) {
        let end = pos + ch.len_utf8();
        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
          out.push(sentence.to_string());
        }
        start = end;
      }
    }
  }
  let tail = text[start..].trim();
  if !tail.is_empty() {
    out.push(tail.to_string());
  }
  out
}

/// Word tokens in document order, original casing preserved.
pub fn word_tokens(text: &str) -> Vec<String> {
  let mut tokens = Vec::new();
  let mut cur = String::new();
  for ch in text.chars() {
    if ch.is_alphanumeric() || (ch == '\'' && !cur.is_empty()) {
      cur.push(ch);
    } else if !cur.is_empty() {
      tokens.push(flush_token(&mut cur));
    }
  }
  if !cur.is_empty() {
    tokens.push(flush_token(&mut cur));
  }
  tokens
}

fn flush_token(cur: &mut String) -> String {
  let tok = std::mem::take(cur);
  tok.trim_end_matches('\'').to_string()
}

fn is_capitalized(word: &str) -> bool {
  word.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Capitalization-based entity spans, in document order. Multi-word runs
/// are joined with single spaces ("New York").
pub fn named_entities(text: &str) -> Vec<String> {
  let mut out = Vec::new();
  for sentence in split_sentences(text) {
    let words = word_tokens(&sentence);
    let mut i = 0;
    while i < words.len() {
      if is_capitalized(&words[i]) {
        let mut j = i + 1;
        while j < words.len() && is_capitalized(&words[j]) {
          j += 1;
        }
        // A single capitalized word opening the sentence is not a name.
        if i > 0 || j - i > 1 {
          out.push(words[i..j].join(" "));
        }
        i = j;
      } else {
        i += 1;
      }
    }
  }
  out
}

/// The `limit` most frequent tokens, counted case-insensitively, reported
/// with their first-seen casing. Ties keep document order.
fn top_frequent_tokens(text: &str, limit: usize) -> Vec<String> {
  let mut counts: Vec<(String, usize)> = Vec::new();
  let mut index: HashMap<String, usize> = HashMap::new();
  for tok in word_tokens(text) {
    let lower = tok.to_lowercase();
    match index.get(&lower) {
      Some(&i) => counts[i].1 += 1,
      None => {
        index.insert(lower, counts.len());
        counts.push((tok, 1));
      }
    }
  }
  // Stable sort keeps first-occurrence order among equal counts.
  counts.sort_by(|a, b| b.1.cmp(&a.1));
  counts.into_iter().take(limit).map(|(tok, _)| tok).collect()
}

/// Ranked, deduplicated keyword candidates: entities first, then the most
/// frequent tokens. Dedup is by lowercase form, keeping the first
/// occurrence's casing.
pub fn extract_keywords(text: &str) -> Vec<String> {
  let entities = named_entities(text);
  let frequent = top_frequent_tokens(text, TOP_FREQUENT_TOKENS);

  let mut keywords = Vec::new();
  let mut seen = HashSet::new();
  for candidate in entities.into_iter().chain(frequent) {
    if seen.insert(candidate.to_lowercase()) {
      keywords.push(candidate);
    }
  }
  keywords
}

fn whole_word_regex(keyword: &str) -> Result<Regex, regex::Error> {
  RegexBuilder::new(&format!(r"\b{}\b", regex::escape(keyword)))
    .case_insensitive(true)
    .build()
}

/// Mask one keyword occurrence per sentence: for each keyword in extractor
/// order, the first unused sentence containing it as a whole word gets its
/// first occurrence replaced with the blank marker. Both the keyword and
/// the sentence are then consumed, so no sentence backs two questions and
/// no answer repeats.
pub fn generate_blank_questions(article: &str, keywords: &[String]) -> Vec<BlankQuestion> {
  let sentences = split_sentences(article);
  let mut sentence_used = vec![false; sentences.len()];
  let mut answers_used: HashSet<String> = HashSet::new();
  let mut questions = Vec::new();

  for keyword in keywords {
    let key = keyword.to_lowercase();
    if answers_used.contains(&key) {
      continue;
    }
    let Ok(re) = whole_word_regex(keyword) else {
      continue;
    };
    for (idx, sentence) in sentences.iter().enumerate() {
      if sentence_used[idx] || !re.is_match(sentence) {
        continue;
      }
      let question = re.replace(sentence, BLANK_MARKER).into_owned();
      sentence_used[idx] = true;
      answers_used.insert(key);
      questions.push(BlankQuestion { question, answer: keyword.clone() });
      break;
    }
  }
  questions
}
