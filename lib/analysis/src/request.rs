//! Validated analysis requests.
//!
//! A request is checked once, when built, so that nothing malformed ever
//! reaches the inference server.

use crate::error::AnalysisError;
use crate::task::TaskSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Context key holding the reviewed product's name.
pub const CONTEXT_PRODUCT_NAME: &str = "product_name";

/// Context key holding a short response-language code.
pub const CONTEXT_LANGUAGE: &str = "language";

/// Auxiliary fields substituted into prompts.
pub type Context = BTreeMap<String, String>;

/// Bounds applied while building requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestLimits {
    /// Minimum trimmed text length, in characters.
    pub min_text_length: usize,
    /// Maximum trimmed text length, in characters.
    pub max_text_length: usize,
    /// Minimum trimmed text length for summarization, in characters.
    pub min_summary_length: usize,
    /// Maximum product name length, in characters.
    pub max_product_name_length: usize,
    /// Maximum number of items in one batch.
    pub max_batch_size: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            min_text_length: 3,
            max_text_length: 10_000,
            min_summary_length: 10,
            max_product_name_length: 100,
            max_batch_size: 100,
        }
    }
}

/// Which model to run and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Model identifier on the inference server.
    pub model_id: String,
    /// Sampling temperature in `[0, 1]`; `None` keeps the server default.
    pub temperature: Option<f32>,
}

impl ModelParams {
    /// Creates parameters for `model_id` without a temperature override.
    #[must_use]
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            temperature: None,
        }
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    fn validate(&self) -> Result<(), AnalysisError> {
        if self.model_id.trim().is_empty() {
            return Err(AnalysisError::validation("model", "must not be blank"));
        }
        if let Some(t) = self.temperature
            && !(0.0..=1.0).contains(&t)
        {
            return Err(AnalysisError::validation(
                "temperature",
                format!("{t} is outside the range 0.0 to 1.0"),
            ));
        }
        Ok(())
    }
}

/// One item submitted for analysis. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    input_text: String,
    tasks: TaskSet,
    context: Context,
    model_params: ModelParams,
}

impl AnalysisRequest {
    /// Starts building a request.
    #[must_use]
    pub fn builder(
        input_text: impl Into<String>,
        model_params: ModelParams,
    ) -> AnalysisRequestBuilder {
        AnalysisRequestBuilder {
            input_text: input_text.into(),
            tasks: TaskSet::review(),
            context: Context::new(),
            model_params,
        }
    }

    /// The trimmed input text.
    #[must_use]
    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    /// The tasks to run.
    #[must_use]
    pub fn tasks(&self) -> &TaskSet {
        &self.tasks
    }

    /// Auxiliary prompt fields.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Model selection.
    #[must_use]
    pub fn model_params(&self) -> &ModelParams {
        &self.model_params
    }
}

/// Builder for [`AnalysisRequest`].
#[derive(Debug, Clone)]
pub struct AnalysisRequestBuilder {
    input_text: String,
    tasks: TaskSet,
    context: Context,
    model_params: ModelParams,
}

impl AnalysisRequestBuilder {
    /// Replaces the task set. Defaults to the review tasks.
    #[must_use]
    pub fn tasks(mut self, tasks: TaskSet) -> Self {
        self.tasks = tasks;
        self
    }

    /// Adds a context field. Blank values are ignored.
    #[must_use]
    pub fn context(mut self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        if let Some(value) = value {
            let value = value.into();
            if !value.trim().is_empty() {
                self.context.insert(key.into(), value.trim().to_string());
            }
        }
        self
    }

    /// Validates against `limits` and builds the request.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the text length is out of bounds, the
    /// task set is unusable, the product name is too long, or the model
    /// parameters are invalid.
    pub fn build(self, limits: &RequestLimits) -> Result<AnalysisRequest, AnalysisError> {
        let input_text = self.input_text.trim().to_string();
        let length = input_text.chars().count();

        if input_text.is_empty() {
            return Err(AnalysisError::validation("text", "must not be empty"));
        }
        if length < limits.min_text_length {
            return Err(AnalysisError::validation(
                "text",
                format!(
                    "too short. Minimum {} characters required",
                    limits.min_text_length
                ),
            ));
        }
        if length > limits.max_text_length {
            return Err(AnalysisError::validation(
                "text",
                format!(
                    "too long. Maximum {} characters allowed",
                    limits.max_text_length
                ),
            ));
        }

        if let Some(product) = self.context.get(CONTEXT_PRODUCT_NAME)
            && product.chars().count() > limits.max_product_name_length
        {
            return Err(AnalysisError::validation(
                CONTEXT_PRODUCT_NAME,
                format!(
                    "longer than {} characters",
                    limits.max_product_name_length
                ),
            ));
        }

        self.tasks.validate()?;
        self.model_params.validate()?;

        Ok(AnalysisRequest {
            input_text,
            tasks: self.tasks,
            context: self.context,
            model_params: self.model_params,
        })
    }
}
