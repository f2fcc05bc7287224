//! Shared application state.

use crate::config::ServerConfig;
use textlens_analysis::{Analyzer, HistoryRing, ModelParams, RequestLimits};
use textlens_inference::{InferenceError, OllamaClient};
use tokio::sync::Mutex;

/// State shared by every route handler.
pub struct AppState {
    /// Runs analyses against the configured inference server.
    pub analyzer: Analyzer<OllamaClient>,

    /// Input bounds applied to every request.
    pub limits: RequestLimits,

    /// Model used when a request does not name one.
    pub default_model: String,

    /// Temperature used when a request does not set one.
    pub default_temperature: Option<f32>,

    /// Recently returned results. Only handlers write here.
    pub history: Mutex<HistoryRing>,
}

impl AppState {
    /// Builds the state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the inference base URL is invalid.
    pub fn new(config: &ServerConfig) -> textlens_core::Result<Self, InferenceError> {
        let client = OllamaClient::new(config.inference.base_url.as_str())?
            .with_retry_policy(config.inference.retry_policy())
            .with_health_timeout(config.inference.health_timeout());

        Ok(Self {
            analyzer: Analyzer::new(client).with_call_timeout(config.inference.request_timeout()),
            limits: config.limits,
            default_model: config.inference.model.clone(),
            default_temperature: config.inference.temperature,
            history: Mutex::new(HistoryRing::new(config.history.capacity)),
        })
    }

    /// Resolves per-request model settings against the configured defaults.
    ///
    /// A blank model is passed through so request validation rejects it.
    #[must_use]
    pub fn model_params(&self, model: Option<String>, temperature: Option<f32>) -> ModelParams {
        ModelParams::new(model.unwrap_or_else(|| self.default_model.clone()))
            .with_temperature(temperature.or(self.default_temperature))
    }
}
