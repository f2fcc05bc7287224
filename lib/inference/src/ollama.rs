//! HTTP client for an Ollama-compatible inference server.
//!
//! Wire contract:
//! - `POST {base}/api/generate` with `{model, prompt, stream: false, options?}`,
//!   answered by a JSON body carrying `response`
//! - `GET {base}/api/tags` for liveness and the model list

use crate::backend::{InferenceBackend, ModelInfo};
use crate::completion::{CompletionRequest, FailureKind, RawCompletion};
use crate::error::InferenceError;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Timeout for the liveness probe.
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for listing models.
pub const MODEL_LIST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

impl<'a> From<&'a CompletionRequest> for GenerateRequest<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: request
                .temperature
                .map(|temperature| GenerateOptions { temperature }),
        }
    }
}

/// Client for a single inference server.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    health_timeout: Duration,
}

impl OllamaClient {
    /// Creates a client for the server at `base_url` (e.g. `http://localhost:11434`).
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL or the HTTP
    /// client cannot be built.
    pub fn new(base_url: impl Into<String>) -> textlens_core::Result<Self, InferenceError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| InferenceError::InvalidConfig {
            reason: format!("base url '{base_url}': {e}"),
        })?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| InferenceError::InvalidConfig {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url,
            retry: RetryPolicy::default(),
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        })
    }

    /// Sets the retry policy for completion calls.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the liveness probe timeout.
    #[must_use]
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// Returns the server base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn attempt(&self, request: &CompletionRequest) -> RawCompletion {
        let started = Instant::now();
        let url = self.endpoint("/api/generate");

        let response = match self
            .http
            .post(&url)
            .timeout(request.timeout)
            .json(&GenerateRequest::from(request))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let kind = classify_transport_error(&e);
                return RawCompletion::failure(
                    kind,
                    failure_message(kind, request.timeout, &e.without_url().to_string()),
                    started.elapsed(),
                );
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return RawCompletion::failure(
                FailureKind::RemoteError,
                format!("Inference server returned HTTP {}: {}", status.as_u16(), body.trim()),
                started.elapsed(),
            );
        }

        match response.json::<GenerateResponse>().await {
            Ok(body) => RawCompletion::success(body.response, started.elapsed()),
            Err(e) => {
                let kind = if e.is_timeout() {
                    FailureKind::Timeout
                } else {
                    FailureKind::RemoteError
                };
                RawCompletion::failure(
                    kind,
                    failure_message(kind, request.timeout, &e.without_url().to_string()),
                    started.elapsed(),
                )
            }
        }
    }
}

/// Builds the user-facing failure text. Never includes the server address;
/// callers log that separately.
fn failure_message(kind: FailureKind, timeout: Duration, detail: &str) -> String {
    match kind {
        FailureKind::ConnectionFailure => {
            "Cannot connect to the inference server. Make sure it is running.".to_string()
        }
        FailureKind::Timeout => format!(
            "Inference request timed out after {timeout:?}. The model is taking too long to respond."
        ),
        FailureKind::RemoteError => {
            format!("Malformed response from the inference server: {detail}")
        }
    }
}

/// Maps a transport error onto the failure taxonomy.
///
/// Anything that went wrong before a response arrived, other than the
/// timeout, counts as the server being unreachable.
fn classify_transport_error(error: &reqwest::Error) -> FailureKind {
    if error.is_connect() {
        FailureKind::ConnectionFailure
    } else if error.is_timeout() {
        FailureKind::Timeout
    } else if error.is_request() {
        FailureKind::ConnectionFailure
    } else {
        FailureKind::RemoteError
    }
}

#[async_trait]
impl InferenceBackend for OllamaClient {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> RawCompletion {
        let started = Instant::now();
        let mut attempt = 1;

        loop {
            let mut completion = self.attempt(request).await;

            match completion.failure_kind {
                None => {
                    debug!(
                        model = %request.model,
                        attempt,
                        latency_ms = completion.latency_ms(),
                        "completion finished"
                    );
                    completion.latency = started.elapsed();
                    return completion;
                }
                Some(kind) if self.retry.should_retry(attempt, kind) => {
                    warn!(
                        model = %request.model,
                        attempt,
                        failure = %kind,
                        "completion failed, retrying"
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                    attempt += 1;
                }
                Some(kind) => {
                    warn!(
                        model = %request.model,
                        endpoint = %self.base_url,
                        attempt,
                        failure = %kind,
                        error = %completion.text,
                        "completion failed"
                    );
                    completion.latency = started.elapsed();
                    return completion;
                }
            }
        }
    }

    async fn is_alive(&self) -> bool {
        let url = self.endpoint("/api/tags");
        match self
            .http
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                debug!(error = %e, endpoint = %url, "inference liveness probe failed");
                false
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, InferenceError> {
        let url = self.endpoint("/api/tags");

        let response = self
            .http
            .get(&url)
            .timeout(MODEL_LIST_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() && !e.is_connect() {
                    InferenceError::Timeout {
                        endpoint: url.clone(),
                    }
                } else {
                    InferenceError::ConnectionFailed {
                        endpoint: url.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::RemoteError {
                status: status.as_u16(),
                body,
            });
        }

        let tags: TagsResponse =
            response
                .json()
                .await
                .map_err(|e| InferenceError::ResponseParseFailed {
                    reason: e.to_string(),
                })?;

        Ok(tags.models)
    }
}
