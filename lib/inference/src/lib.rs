//! Inference client for textlens.
//!
//! Talks to an Ollama-compatible text-completion server:
//!
//! - [`InferenceBackend`]: the seam the analysis layer programs against
//! - [`OllamaClient`]: the HTTP implementation (`/api/generate`, `/api/tags`)
//! - [`RawCompletion`]: a completion or a classified failure, never an error
//!
//! A failed call is reported as a value so callers decide what a failure
//! means for the work around it.

pub mod backend;
pub mod completion;
pub mod error;
pub mod ollama;
pub mod retry;

pub use backend::{InferenceBackend, ModelInfo};
pub use completion::{CompletionRequest, FailureKind, RawCompletion};
pub use error::InferenceError;
pub use ollama::OllamaClient;
pub use retry::RetryPolicy;
