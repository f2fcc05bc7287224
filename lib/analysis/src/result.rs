//! Analysis results.

use crate::error::AnalysisError;
use crate::request::Context;
use crate::task::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use textlens_core::{AnalysisId, BatchId};
use textlens_inference::FailureKind;

/// The outcome of analysing one item.
///
/// A failed result carries no fields: an item either has every requested
/// task's output or none of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: AnalysisId,
    pub source_text: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: Context,
    pub fields: BTreeMap<Task, String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the failure came from the inference call itself rather
    /// than from an unusable reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    pub latency_ms: u64,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// A successful result.
    #[must_use]
    pub fn success(
        id: AnalysisId,
        source_text: impl Into<String>,
        context: Context,
        fields: BTreeMap<Task, String>,
        latency_ms: u64,
    ) -> Self {
        Self {
            id,
            source_text: source_text.into(),
            context,
            fields,
            success: true,
            error: None,
            failure_kind: None,
            latency_ms,
            analyzed_at: Utc::now(),
        }
    }

    /// A failed result.
    #[must_use]
    pub fn failure(
        id: AnalysisId,
        source_text: impl Into<String>,
        context: Context,
        error: impl Into<String>,
        failure_kind: Option<FailureKind>,
        latency_ms: u64,
    ) -> Self {
        Self {
            id,
            source_text: source_text.into(),
            context,
            fields: BTreeMap::new(),
            success: false,
            error: Some(error.into()),
            failure_kind,
            latency_ms,
            analyzed_at: Utc::now(),
        }
    }

    /// Returns the normalized output for `task`.
    #[must_use]
    pub fn field(&self, task: Task) -> Option<&str> {
        self.fields.get(&task).map(String::as_str)
    }

    /// Converts an inference failure back into an error.
    ///
    /// Returns `None` for successful results and for results that failed
    /// on content rather than on the call.
    #[must_use]
    pub fn inference_error(&self) -> Option<AnalysisError> {
        let kind = self.failure_kind?;
        Some(AnalysisError::from_failure(
            kind,
            self.error.clone().unwrap_or_default(),
        ))
    }
}

/// The outcome of a batch call.
///
/// `results` is in request order and `total == results.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch_id: BatchId,
    pub results: Vec<AnalysisResult>,
    pub total: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub partial_failure: bool,
}

impl BatchResult {
    /// Tallies `results` into a batch result.
    #[must_use]
    pub fn from_results(batch_id: BatchId, results: Vec<AnalysisResult>) -> Self {
        let total = results.len();
        let success_count = results.iter().filter(|r| r.success).count();
        let error_count = total - success_count;
        Self {
            batch_id,
            results,
            total,
            success_count,
            error_count,
            partial_failure: error_count > 0 && error_count < total,
        }
    }

    /// Describes a partial failure, if some but not all items failed.
    #[must_use]
    pub fn partial_failure_error(&self) -> Option<AnalysisError> {
        self.partial_failure.then_some(AnalysisError::PartialBatchFailure {
            failed: self.error_count,
            total: self.total,
        })
    }
}
