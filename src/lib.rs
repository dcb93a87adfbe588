//! LinguaQuiz · English MCQ / CEFR quiz backend library.
//!
//! Exposed as a library so integration tests can assemble the router
//! against an in-memory database.

pub mod classifier;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod llm;
pub mod logic;
pub mod nlp;
pub mod protocol;
pub mod qstore;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod util;
