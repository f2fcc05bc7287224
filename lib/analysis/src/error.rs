//! Error types for the analysis crate.
//!
//! Validation failures are returned before any network call. Inference
//! failures are recorded on results rather than returned; the variants here
//! let callers turn a failed single-item result back into an error.

use std::fmt;
use textlens_inference::FailureKind;

/// Errors from analysis operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Input rejected before any inference call.
    Validation { field: String, reason: String },
    /// The inference server could not be reached.
    InferenceUnavailable { message: String },
    /// The inference server did not answer in time.
    InferenceTimeout { message: String },
    /// The inference server answered with something unusable.
    InferenceProtocol { message: String },
    /// Some, but not all, items of a batch failed.
    PartialBatchFailure { failed: usize, total: usize },
}

impl AnalysisError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Maps a completion failure onto the matching inference variant.
    #[must_use]
    pub fn from_failure(kind: FailureKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            FailureKind::ConnectionFailure => Self::InferenceUnavailable { message },
            FailureKind::Timeout => Self::InferenceTimeout { message },
            FailureKind::RemoteError => Self::InferenceProtocol { message },
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { field, reason } => {
                write!(f, "invalid {field}: {reason}")
            }
            Self::InferenceUnavailable { message } => {
                write!(f, "inference server unavailable: {message}")
            }
            Self::InferenceTimeout { message } => {
                write!(f, "inference server timed out: {message}")
            }
            Self::InferenceProtocol { message } => {
                write!(f, "inference server error: {message}")
            }
            Self::PartialBatchFailure { failed, total } => {
                write!(f, "{failed} of {total} batch items failed")
            }
        }
    }
}

impl std::error::Error for AnalysisError {}
