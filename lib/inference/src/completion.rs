//! Completion requests and their outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Per-call timeout used when a caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// A single text-completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Fully rendered prompt text.
    pub prompt: String,
    /// Model identifier on the inference server.
    pub model: String,
    /// Sampling temperature (0.0 - 1.0). `None` leaves the server default.
    pub temperature: Option<f32>,
    /// Upper bound for the whole call.
    pub timeout: Duration,
}

impl CompletionRequest {
    /// Creates a request with the default timeout and no temperature override.
    #[must_use]
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            temperature: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Why a completion call failed.
///
/// Classified in this order: a connection problem wins over a timeout, which
/// wins over anything the server said.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The inference server could not be reached.
    ConnectionFailure,
    /// No response within the timeout.
    Timeout,
    /// Non-success status or a body without a `response` field.
    RemoteError,
}

impl FailureKind {
    /// Whether another attempt could plausibly succeed.
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(self, Self::ConnectionFailure | Self::Timeout)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailure => write!(f, "connection_failure"),
            Self::Timeout => write!(f, "timeout"),
            Self::RemoteError => write!(f, "remote_error"),
        }
    }
}

/// The outcome of one completion call.
///
/// On failure `text` holds a human-readable message instead of model output.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCompletion {
    pub text: String,
    pub latency: Duration,
    pub ok: bool,
    pub failure_kind: Option<FailureKind>,
}

impl RawCompletion {
    /// A successful completion.
    #[must_use]
    pub fn success(text: impl Into<String>, latency: Duration) -> Self {
        Self {
            text: text.into(),
            latency,
            ok: true,
            failure_kind: None,
        }
    }

    /// A failed completion carrying a readable message.
    #[must_use]
    pub fn failure(kind: FailureKind, message: impl Into<String>, latency: Duration) -> Self {
        Self {
            text: message.into(),
            latency,
            ok: false,
            failure_kind: Some(kind),
        }
    }

    /// Latency in whole milliseconds.
    #[must_use]
    pub fn latency_ms(&self) -> u64 {
        u64::try_from(self.latency.as_millis()).unwrap_or(u64::MAX)
    }
}
