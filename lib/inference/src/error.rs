//! Error types for the inference crate.
//!
//! Completion calls do not use these; they fold failures into
//! [`RawCompletion`](crate::RawCompletion). `InferenceError` covers the
//! operations that are allowed to fail outright: building the client and
//! listing models.

use std::fmt;

/// Errors from inference server operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// The client could not be configured.
    InvalidConfig { reason: String },
    /// The inference server could not be reached.
    ConnectionFailed { endpoint: String, reason: String },
    /// The inference server did not answer in time.
    Timeout { endpoint: String },
    /// The inference server answered with a non-success status.
    RemoteError { status: u16, body: String },
    /// The response body was not the expected shape.
    ResponseParseFailed { reason: String },
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { reason } => {
                write!(f, "invalid inference client configuration: {reason}")
            }
            Self::ConnectionFailed { endpoint, reason } => {
                write!(f, "failed to connect to '{endpoint}': {reason}")
            }
            Self::Timeout { endpoint } => write!(f, "request to '{endpoint}' timed out"),
            Self::RemoteError { status, body } => {
                write!(f, "inference server returned HTTP {status}: {body}")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse inference response: {reason}")
            }
        }
    }
}

impl std::error::Error for InferenceError {}
