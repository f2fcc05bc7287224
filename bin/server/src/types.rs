//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use textlens_analysis::AnalysisResult;
use textlens_inference::ModelInfo;

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeBody {
    pub text: String,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Task name to enabled flag. Omitted means the review tasks.
    #[serde(default)]
    pub tasks: Option<HashMap<String, bool>>,
}

/// One entry of a batch: bare text, or text with a product name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BatchItem {
    Text(String),
    Review {
        text: String,
        #[serde(default)]
        product_name: Option<String>,
    },
}

impl BatchItem {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Review { text, .. } => text,
        }
    }

    #[must_use]
    pub fn product_name(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Review { product_name, .. } => product_name.as_deref(),
        }
    }
}

/// Body of `POST /analyze/batch`. Model settings apply to every item.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchBody {
    pub items: Vec<BatchItem>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub tasks: Option<HashMap<String, bool>>,
}

/// Body of `POST /summarize`.
#[derive(Debug, Clone, Deserialize)]
pub struct SummarizeBody {
    pub text: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub mode: String,
    /// The requested language code, or `auto` when none was given.
    pub language: String,
    pub original_length: usize,
    pub summary_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub api_status: String,
    pub inference_status: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

/// Body of `GET /history`, newest entry first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub capacity: usize,
    pub entries: Vec<AnalysisResult>,
}
