//! Single-item and batch orchestration.
//!
//! An item fans out one prompt per task and joins on all of them before a
//! result is assembled. A batch runs items strictly one after another so a
//! single local inference server only ever sees one item's fan-out at a
//! time. There is no batch-level deadline; every call carries its own
//! timeout.

use crate::error::AnalysisError;
use crate::health::{HealthReport, check_health};
use crate::normalize::normalize;
use crate::prompt::build_prompt;
use crate::request::AnalysisRequest;
use crate::result::{AnalysisResult, BatchResult};
use crate::task::Task;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use textlens_core::{AnalysisId, BatchId};
use textlens_inference::{CompletionRequest, InferenceBackend, RawCompletion};
use tracing::{info, instrument, warn};

/// Batch progress is logged every this many items.
const PROGRESS_INTERVAL: usize = 10;

/// Runs analysis requests against an inference backend.
#[derive(Debug, Clone)]
pub struct Analyzer<B> {
    backend: B,
    call_timeout: Duration,
}

impl<B: InferenceBackend> Analyzer<B> {
    /// Creates an analyzer with the default per-call timeout.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            call_timeout: textlens_inference::completion::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the timeout applied to every inference call.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Returns the backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Probes the inference server.
    pub async fn check_health(&self) -> HealthReport {
        check_health(&self.backend).await
    }

    /// Analyses one item.
    ///
    /// All task pipelines run concurrently and are joined before the result
    /// is built. If any call failed, the item fails with the first failure
    /// in task order and every task output is discarded. An empty reply
    /// also fails the item, without a failure kind.
    #[instrument(skip(self, request), fields(tasks = request.tasks().len()))]
    pub async fn analyze_item(&self, request: &AnalysisRequest) -> AnalysisResult {
        let id = AnalysisId::new();
        let started = Instant::now();

        let pipelines = request.tasks().iter().map(|task| self.run_task(task, request));
        let outcomes: Vec<(Task, RawCompletion)> = join_all(pipelines).await;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        if let Some((task, failed)) = outcomes.iter().find(|(_, completion)| !completion.ok) {
            warn!(
                analysis_id = %id,
                task = %task,
                failure = ?failed.failure_kind,
                "item failed"
            );
            return AnalysisResult::failure(
                id,
                request.input_text(),
                request.context().clone(),
                failed.text.clone(),
                failed.failure_kind,
                latency_ms,
            );
        }

        let mut fields = BTreeMap::new();
        for (task, completion) in &outcomes {
            let value = normalize(&completion.text, *task);
            if value.is_empty() {
                warn!(analysis_id = %id, task = %task, "inference server returned an empty reply");
                return AnalysisResult::failure(
                    id,
                    request.input_text(),
                    request.context().clone(),
                    format!("The model returned an empty response for the {task} task."),
                    None,
                    latency_ms,
                );
            }
            fields.insert(*task, value);
        }

        info!(analysis_id = %id, latency_ms, "item analysed");
        AnalysisResult::success(
            id,
            request.input_text(),
            request.context().clone(),
            fields,
            latency_ms,
        )
    }

    /// Analyses a batch, one item at a time.
    ///
    /// A failing item is recorded and the batch carries on. Results keep
    /// request order.
    ///
    /// # Errors
    ///
    /// Returns a validation error, before any inference call, if the batch
    /// is empty or longer than `max_batch_size`.
    #[instrument(skip(self, requests), fields(total = requests.len()))]
    pub async fn analyze_batch(
        &self,
        requests: &[AnalysisRequest],
        max_batch_size: usize,
    ) -> Result<BatchResult, AnalysisError> {
        if requests.is_empty() {
            return Err(AnalysisError::validation(
                "items",
                "at least one item is required",
            ));
        }
        if requests.len() > max_batch_size {
            return Err(AnalysisError::validation(
                "items",
                format!(
                    "{} items submitted, maximum is {max_batch_size}",
                    requests.len()
                ),
            ));
        }

        let batch_id = BatchId::new();
        let total = requests.len();
        info!(batch_id = %batch_id, total, "starting batch analysis");

        let mut results = Vec::with_capacity(total);
        for (index, request) in requests.iter().enumerate() {
            let result = self.analyze_item(request).await;
            if !result.success {
                warn!(
                    batch_id = %batch_id,
                    item = index + 1,
                    error = result.error.as_deref().unwrap_or_default(),
                    "batch item failed"
                );
            }
            results.push(result);

            if (index + 1) % PROGRESS_INTERVAL == 0 {
                info!(batch_id = %batch_id, processed = index + 1, total, "batch progress");
            }
        }

        let batch = BatchResult::from_results(batch_id, results);
        info!(
            batch_id = %batch_id,
            success_count = batch.success_count,
            error_count = batch.error_count,
            "batch analysis complete"
        );
        Ok(batch)
    }

    async fn run_task(&self, task: Task, request: &AnalysisRequest) -> (Task, RawCompletion) {
        let prompt = build_prompt(task, request.input_text(), request.context());
        let params = request.model_params();
        let completion_request = CompletionRequest::new(prompt.rendered_text, &params.model_id)
            .with_temperature(params.temperature)
            .with_timeout(self.call_timeout);
        let completion = self.backend.complete(&completion_request).await;
        (task, completion)
    }
}
