//! Inference backend abstraction.
//!
//! The analysis layer only sees this trait, so orchestration can be tested
//! against a scripted backend instead of a live server.

use crate::completion::{CompletionRequest, RawCompletion};
use crate::error::InferenceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A model installed on the inference server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name as accepted by the `model` field of a completion request.
    pub name: String,
    /// Size on disk in bytes, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Last modification timestamp as reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

/// Trait for text-completion backends.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Runs one completion.
    ///
    /// Never fails: transport and protocol problems come back as a
    /// [`RawCompletion`] with `ok == false`.
    async fn complete(&self, request: &CompletionRequest) -> RawCompletion;

    /// Probes the server's liveness endpoint. Any error reads as `false`.
    async fn is_alive(&self) -> bool;

    /// Lists the models the server can run.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable, times out, or answers
    /// with something other than a model list.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, InferenceError>;
}
