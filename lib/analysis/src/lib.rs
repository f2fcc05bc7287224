//! Analysis layer for textlens.
//!
//! Turns submitted text into prompts, runs them against an
//! [`InferenceBackend`](textlens_inference::InferenceBackend), and folds the
//! free-text replies into bounded results:
//!
//! - [`prompt`]: deterministic prompt rendering per [`Task`]
//! - [`detect_language`]: picking the summary response language
//! - [`normalize`]: coercing replies onto the sentiment label set
//! - [`Analyzer`]: single-item fan-out and sequential batch processing
//! - [`health`]: inference liveness reporting
//! - [`HistoryRing`]: a bounded buffer of past results, owned by callers

pub mod error;
pub mod health;
pub mod history;
pub mod language;
pub mod normalize;
pub mod orchestrator;
pub mod prompt;
pub mod request;
pub mod result;
pub mod task;

#[cfg(test)]
pub(crate) mod testing;

pub use error::AnalysisError;
pub use health::{HealthReport, check_health};
pub use history::HistoryRing;
pub use language::detect_language;
pub use normalize::{SentimentLabel, normalize};
pub use orchestrator::Analyzer;
pub use prompt::{PromptSpec, build_prompt};
pub use request::{AnalysisRequest, AnalysisRequestBuilder, Context, ModelParams, RequestLimits};
pub use result::{AnalysisResult, BatchResult};
pub use task::{Task, TaskSet};
