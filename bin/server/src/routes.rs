//! HTTP route handlers.

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{
    AnalyzeBody, BatchBody, HealthResponse, HistoryResponse, ModelsResponse, SummarizeBody,
    SummarizeResponse,
};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use std::collections::HashMap;
use std::sync::Arc;
use textlens_analysis::request::{CONTEXT_LANGUAGE, CONTEXT_PRODUCT_NAME};
use textlens_analysis::{
    AnalysisError, AnalysisRequest, AnalysisResult, BatchResult, RequestLimits, Task, TaskSet,
    detect_language,
};
use textlens_inference::InferenceBackend;
use tracing::instrument;

/// Reports API and inference server status.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let report = state.analyzer.check_health().await;
    let inference_status = if report.inference_alive {
        "online"
    } else {
        "offline"
    };

    Json(HealthResponse {
        api_status: "online".to_string(),
        inference_status: inference_status.to_string(),
        model: state.default_model.clone(),
    })
}

/// Analyses one text.
///
/// An unreachable or failing inference server is an error response. A reply
/// that yields nothing usable is a `200` with `success: false`.
#[instrument(skip(state, payload))]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(body) = payload?;
    let tasks = task_set(body.tasks.as_ref())?;
    let request =
        AnalysisRequest::builder(body.text, state.model_params(body.model, body.temperature))
            .tasks(tasks)
            .context(CONTEXT_PRODUCT_NAME, body.product_name)
            .build(&state.limits)?;

    let result = state.analyzer.analyze_item(&request).await;
    if let Some(err) = result.inference_error() {
        return Err(err.into());
    }

    state.history.lock().await.push(result.clone());
    Ok(Json(result))
}

/// Analyses a list of texts in order.
///
/// Every item is validated before any is analysed. Item failures during
/// analysis are reported inside the batch result.
#[instrument(skip(state, payload))]
pub async fn analyze_batch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchBody>, JsonRejection>,
) -> Result<Json<BatchResult>, ApiError> {
    let Json(body) = payload?;
    let tasks = task_set(body.tasks.as_ref())?;
    let params = state.model_params(body.model, body.temperature);

    let requests = body
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            AnalysisRequest::builder(item.text(), params.clone())
                .tasks(tasks.clone())
                .context(CONTEXT_PRODUCT_NAME, item.product_name())
                .build(&state.limits)
                .map_err(|err| at_item(index, err))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let batch = state
        .analyzer
        .analyze_batch(&requests, state.limits.max_batch_size)
        .await?;

    if let Some(err) = batch.partial_failure_error() {
        tracing::warn!(
            batch_id = %batch.batch_id,
            error = %err,
            "batch finished with failed items"
        );
    }

    state
        .history
        .lock()
        .await
        .extend(batch.results.iter().cloned());
    Ok(Json(batch))
}

/// Summarizes one text in the requested mode.
///
/// Without an explicit `language`, the response language is detected from
/// the text; if detection fails the model is told to answer in kind.
#[instrument(skip(state, payload))]
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SummarizeBody>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let Json(body) = payload?;
    let mode = summary_mode(body.mode.as_deref())?;
    let language = body
        .language
        .map(|code| code.trim().to_lowercase())
        .filter(|code| !code.is_empty())
        .or_else(|| detect_language(&body.text).map(str::to_string));

    let limits = RequestLimits {
        min_text_length: state.limits.min_summary_length,
        ..state.limits
    };
    let request =
        AnalysisRequest::builder(body.text, state.model_params(body.model, body.temperature))
            .tasks(TaskSet::new([mode]))
            .context(CONTEXT_LANGUAGE, language.clone())
            .build(&limits)?;

    let result = state.analyzer.analyze_item(&request).await;
    if let Some(err) = result.inference_error() {
        return Err(err.into());
    }
    let Some(summary) = result.field(mode).map(str::to_string) else {
        return Err(ApiError::EmptyResponse {
            details: result.error.clone().unwrap_or_default(),
        });
    };

    let original_length = request.input_text().chars().count();
    state.history.lock().await.push(result);

    Ok(Json(SummarizeResponse {
        summary_length: summary.chars().count(),
        summary,
        mode: mode.as_str().to_string(),
        language: language.unwrap_or_else(|| "auto".to_string()),
        original_length,
    }))
}

/// Lists the models installed on the inference server.
pub async fn list_models(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ModelsResponse>, ApiError> {
    let models = state.analyzer.backend().list_models().await?;
    Ok(Json(ModelsResponse { models }))
}

/// Returns recent results, newest first.
pub async fn history(State(state): State<Arc<AppState>>) -> Json<HistoryResponse> {
    let history = state.history.lock().await;
    Json(HistoryResponse {
        capacity: history.capacity(),
        entries: history.newest_first().cloned().collect(),
    })
}

/// Empties the history.
pub async fn clear_history(State(state): State<Arc<AppState>>) -> StatusCode {
    state.history.lock().await.clear();
    StatusCode::NO_CONTENT
}

fn task_set(params: Option<&HashMap<String, bool>>) -> Result<TaskSet, AnalysisError> {
    params.map_or_else(|| Ok(TaskSet::review()), TaskSet::from_params)
}

fn summary_mode(mode: Option<&str>) -> Result<Task, ApiError> {
    let Some(mode) = mode else {
        return Ok(Task::Brief);
    };
    mode.parse::<Task>()
        .ok()
        .filter(|task| task.is_summary_mode())
        .ok_or_else(|| ApiError::Validation {
            field: "mode".to_string(),
            reason: format!(
                "'{mode}' is not a summary mode. Choose from: {}",
                Task::SUMMARY_MODES.map(Task::as_str).join(", ")
            ),
        })
}

fn at_item(index: usize, err: AnalysisError) -> AnalysisError {
    match err {
        AnalysisError::Validation { field, reason } => AnalysisError::Validation {
            field: format!("items[{index}].{field}"),
            reason,
        },
        other => other,
    }
}
