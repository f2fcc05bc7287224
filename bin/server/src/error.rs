//! Error types for the HTTP surface.
//!
//! [`ApiError`] renders as a JSON `{ "error", "detail" }` body. Inference
//! failures are logged with their full message, but the response only
//! carries a fixed user-facing description.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;
use textlens_analysis::AnalysisError;
use textlens_inference::InferenceError;

/// Errors returned from route handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Request rejected before any inference call.
    Validation { field: String, reason: String },
    /// The inference server could not be reached.
    InferenceUnavailable { details: String },
    /// The inference server did not answer in time.
    InferenceTimeout { details: String },
    /// The inference server answered with something unusable.
    InferenceProtocol { details: String },
    /// The model replied, but with nothing usable.
    EmptyResponse { details: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { field, reason } => write!(f, "invalid {field}: {reason}"),
            Self::InferenceUnavailable { details } => {
                write!(f, "inference server unavailable: {details}")
            }
            Self::InferenceTimeout { details } => {
                write!(f, "inference server timed out: {details}")
            }
            Self::InferenceProtocol { details } => write!(f, "inference server error: {details}"),
            Self::EmptyResponse { details } => write!(f, "empty model response: {details}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::InferenceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::InferenceTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::InferenceProtocol { .. } | Self::EmptyResponse { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::InferenceUnavailable { .. } => "inference_unavailable",
            Self::InferenceTimeout { .. } => "inference_timeout",
            Self::InferenceProtocol { .. } => "inference_error",
            Self::EmptyResponse { .. } => "empty_response",
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Validation { field, reason } => Self::Validation { field, reason },
            AnalysisError::InferenceUnavailable { message } => {
                Self::InferenceUnavailable { details: message }
            }
            AnalysisError::InferenceTimeout { message } => {
                Self::InferenceTimeout { details: message }
            }
            AnalysisError::InferenceProtocol { message } => {
                Self::InferenceProtocol { details: message }
            }
            other @ AnalysisError::PartialBatchFailure { .. } => Self::InferenceProtocol {
                details: other.to_string(),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation {
            field: "body".to_string(),
            reason: rejection.body_text(),
        }
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        let details = err.to_string();
        match err {
            InferenceError::ConnectionFailed { .. } => Self::InferenceUnavailable { details },
            InferenceError::Timeout { .. } => Self::InferenceTimeout { details },
            InferenceError::InvalidConfig { .. }
            | InferenceError::RemoteError { .. }
            | InferenceError::ResponseParseFailed { .. } => Self::InferenceProtocol { details },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = match &self {
            Self::Validation { .. } => {
                tracing::debug!(error = %self, "rejected request");
                self.to_string()
            }
            Self::InferenceUnavailable { .. } => {
                tracing::warn!(error = %self, "inference server unreachable");
                "Could not connect to the inference server. Make sure it is running.".to_string()
            }
            Self::InferenceTimeout { .. } => {
                tracing::warn!(error = %self, "inference request timed out");
                "The inference server took too long to respond. Try a shorter text.".to_string()
            }
            Self::InferenceProtocol { .. } => {
                tracing::error!(error = %self, "inference request failed");
                "The inference server returned an unexpected response.".to_string()
            }
            Self::EmptyResponse { .. } => {
                tracing::error!(error = %self, "model returned nothing usable");
                "The model returned an empty response.".to_string()
            }
        };

        let body = json!({ "error": self.kind(), "detail": detail });
        (self.status(), Json(body)).into_response()
    }
}

/// Errors that stop the server from starting.
#[derive(Debug)]
pub enum StartupError {
    /// Configuration could not be loaded.
    Config { details: String },
    /// The inference client could not be built.
    Inference { details: String },
    /// The listener could not bind.
    Bind { addr: String, details: String },
    /// The server stopped with an I/O error.
    Serve { details: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "failed to load configuration: {details}"),
            Self::Inference { details } => {
                write!(f, "failed to build inference client: {details}")
            }
            Self::Bind { addr, details } => write!(f, "failed to bind to {addr}: {details}"),
            Self::Serve { details } => write!(f, "server error: {details}"),
        }
    }
}

impl std::error::Error for StartupError {}
