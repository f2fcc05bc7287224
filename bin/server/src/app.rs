//! Router assembly and the serve loop.

use crate::config::ServerConfig;
use crate::error::StartupError;
use crate::routes;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use rootcause::prelude::Report;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the API router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::health))
        .route("/health", get(routes::health))
        .route("/analyze", post(routes::analyze))
        .route("/analyze/batch", post(routes::analyze_batch))
        .route("/summarize", post(routes::summarize))
        .route("/models", get(routes::list_models))
        .route(
            "/history",
            get(routes::history).delete(routes::clear_history),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the inference client cannot be built, the address
/// cannot be bound, or the server fails while running.
pub async fn serve(config: ServerConfig) -> Result<(), Report<StartupError>> {
    let state = AppState::new(&config).map_err(|e| StartupError::Inference {
        details: e.to_string(),
    })?;
    tracing::info!(
        inference_url = %config.inference.base_url,
        model = %config.inference.model,
        "Inference client configured"
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|e| StartupError::Bind {
            addr: config.bind_addr.clone(),
            details: e.to_string(),
        })?;
    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, router(Arc::new(state)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Serve {
            details: e.to_string(),
        })?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use serde_json::{Value, json};
    use std::time::Duration;
    use textlens_analysis::Analyzer;
    use textlens_inference::OllamaClient;
    use tower::ServiceExt;

    fn state_for(server: &MockServer) -> Arc<AppState> {
        let mut config = ServerConfig::default();
        config.inference.base_url = server.base_url();
        Arc::new(AppState::new(&config).expect("state"))
    }

    fn unreachable_state() -> Arc<AppState> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let mut config = ServerConfig::default();
        config.inference.base_url = format!("http://{addr}");
        Arc::new(AppState::new(&config).expect("state"))
    }

    async fn send(
        state: &Arc<AppState>,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("request");

        let response = router(state.clone())
            .oneshot(request)
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    async fn mock_reply(server: &MockServer, prompt_fragment: &str, reply: &str) {
        let reply = reply.to_string();
        server
            .mock_async(move |when, then| {
                when.method(POST)
                    .path("/api/generate")
                    .body_contains(prompt_fragment);
                then.status(200)
                    .json_body(json!({ "model": "mistral", "response": reply, "done": true }));
            })
            .await;
    }

    #[tokio::test]
    async fn analyze_returns_normalized_fields() {
        let server = MockServer::start_async().await;
        mock_reply(&server, "Analyze the sentiment", "Positive.").await;
        mock_reply(&server, "main topic", "Quality").await;
        mock_reply(&server, "one concise sentence", "The buyer loves it.").await;
        let state = state_for(&server);

        let (status, body) = send(
            &state,
            Method::POST,
            "/analyze",
            Some(json!({ "text": "I absolutely love this product!", "product_name": "Blender" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["fields"]["sentiment"], "Positive");
        assert_eq!(body["fields"]["topic"], "Quality");
        assert_eq!(body["fields"]["summary"], "The buyer loves it.");
        assert_eq!(body["context"]["product_name"], "Blender");
        assert_eq!(state.history.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn analyze_sentiment_only() {
        let server = MockServer::start_async().await;
        mock_reply(&server, "Analyze the sentiment", "Negative").await;
        let state = state_for(&server);

        let (status, body) = send(
            &state,
            Method::POST,
            "/analyze",
            Some(json!({ "text": "Broke after a week.", "tasks": { "sentiment": true } })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fields"], json!({ "sentiment": "Negative" }));
    }

    #[tokio::test]
    async fn analyze_rejects_short_text_without_calling_inference() {
        let server = MockServer::start_async().await;
        let generate = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({ "response": "Positive" }));
            })
            .await;
        let state = state_for(&server);

        let (status, body) =
            send(&state, Method::POST, "/analyze", Some(json!({ "text": "ok" }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
        assert!(body["detail"].as_str().unwrap_or_default().contains("too short"));
        assert_eq!(generate.hits_async().await, 0);
    }

    #[tokio::test]
    async fn analyze_maps_unreachable_inference_to_503() {
        let state = unreachable_state();

        let (status, body) = send(
            &state,
            Method::POST,
            "/analyze",
            Some(json!({ "text": "Nice and sturdy." })),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "inference_unavailable");
        assert!(state.history.lock().await.is_empty());
    }

    #[tokio::test]
    async fn analyze_maps_remote_error_to_500() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(404).body("model 'mistral' not found");
            })
            .await;
        let state = state_for(&server);

        let (status, body) = send(
            &state,
            Method::POST,
            "/analyze",
            Some(json!({ "text": "Nice and sturdy." })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "inference_error");
    }

    #[tokio::test]
    async fn analyze_maps_timeout_to_504() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .json_body(json!({ "response": "Positive" }));
            })
            .await;
        let client = OllamaClient::new(server.base_url()).expect("client");
        let mut config = ServerConfig::default();
        config.inference.base_url = server.base_url();
        let mut state = AppState::new(&config).expect("state");
        state.analyzer = Analyzer::new(client).with_call_timeout(Duration::from_millis(50));
        let state = Arc::new(state);

        let (status, body) = send(
            &state,
            Method::POST,
            "/analyze",
            Some(json!({ "text": "Nice and sturdy.", "tasks": { "sentiment": true } })),
        )
        .await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"], "inference_timeout");
    }

    #[tokio::test]
    async fn batch_isolates_failed_items() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/generate")
                    .body_contains("Broken three");
                then.status(500).body("out of memory");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/generate")
                    .body_contains("Fine item");
                then.status(200).json_body(json!({ "response": "Neutral" }));
            })
            .await;
        let state = state_for(&server);

        let (status, body) = send(
            &state,
            Method::POST,
            "/analyze/batch",
            Some(json!({
                "items": [
                    "Fine item one",
                    "Fine item two",
                    "Broken three",
                    { "text": "Fine item four", "product_name": "Kettle" },
                    "Fine item five"
                ],
                "tasks": { "sentiment": true }
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 5);
        assert_eq!(body["success_count"], 4);
        assert_eq!(body["error_count"], 1);
        assert_eq!(body["partial_failure"], true);
        assert_eq!(body["results"][2]["success"], false);
        assert_eq!(body["results"][2]["source_text"], "Broken three");
        assert_eq!(body["results"][3]["fields"]["sentiment"], "Neutral");
        assert_eq!(body["results"][3]["context"]["product_name"], "Kettle");
        assert_eq!(state.history.lock().await.len(), 5);
    }

    #[tokio::test]
    async fn batch_rejects_invalid_item_by_index() {
        let server = MockServer::start_async().await;
        let state = state_for(&server);

        let (status, body) = send(
            &state,
            Method::POST,
            "/analyze/batch",
            Some(json!({ "items": ["Fine text", "  "] })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap_or_default().contains("items[1].text"));
    }

    #[tokio::test]
    async fn batch_rejects_empty_and_oversized() {
        let server = MockServer::start_async().await;
        let state = state_for(&server);

        let (status, _) = send(
            &state,
            Method::POST,
            "/analyze/batch",
            Some(json!({ "items": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let items: Vec<String> = (0..101).map(|i| format!("Review number {i}")).collect();
        let (status, body) = send(
            &state,
            Method::POST,
            "/analyze/batch",
            Some(json!({ "items": items })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap_or_default().contains("maximum is 100"));
    }

    #[tokio::test]
    async fn summarize_in_requested_mode_and_language() {
        let server = MockServer::start_async().await;
        mock_reply(&server, "bullet points", "- fast\n- cheap").await;
        let state = state_for(&server);

        let (status, body) = send(
            &state,
            Method::POST,
            "/summarize",
            Some(json!({
                "text": "The service was fast and the prices were low.",
                "mode": "bullets",
                "language": "FR"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "- fast\n- cheap");
        assert_eq!(body["mode"], "bullets");
        assert_eq!(body["language"], "fr");
        assert_eq!(body["original_length"], 45);
        assert_eq!(body["summary_length"], 14);
    }

    #[tokio::test]
    async fn summarize_rejects_unknown_mode() {
        let server = MockServer::start_async().await;
        let state = state_for(&server);

        let (status, body) = send(
            &state,
            Method::POST,
            "/summarize",
            Some(json!({ "text": "Some text to summarize.", "mode": "haiku" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap_or_default().contains("brief, detailed, bullets"));
    }

    #[tokio::test]
    async fn summarize_empty_reply_is_500() {
        let server = MockServer::start_async().await;
        mock_reply(&server, "2-3 sentences", "   ").await;
        let state = state_for(&server);

        let (status, body) = send(
            &state,
            Method::POST,
            "/summarize",
            Some(json!({ "text": "Some text to summarize." })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "empty_response");
    }

    #[tokio::test]
    async fn summarize_detects_language_when_not_given() {
        let server = MockServer::start_async().await;
        mock_reply(&server, "Respond in French. Summarize this text", "Service rapide.").await;
        let state = state_for(&server);

        let (status, body) = send(
            &state,
            Method::POST,
            "/summarize",
            Some(json!({
                "text": "Le service était rapide et le personnel très aimable. \
                         Nous reviendrons certainement l'année prochaine avec toute la famille."
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["language"], "fr");
        assert_eq!(body["summary"], "Service rapide.");
    }

    #[tokio::test]
    async fn summarize_requires_longer_text_than_analyze() {
        let server = MockServer::start_async().await;
        let generate = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({ "response": "Short." }));
            })
            .await;
        let state = state_for(&server);

        let (status, body) = send(
            &state,
            Method::POST,
            "/summarize",
            Some(json!({ "text": "Too short" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap_or_default().contains("Minimum 10"));
        assert_eq!(generate.hits_async().await, 0);
    }

    #[tokio::test]
    async fn malformed_bodies_are_json_validation_errors() {
        let server = MockServer::start_async().await;
        let state = state_for(&server);

        let (status, body) = send(
            &state,
            Method::POST,
            "/analyze",
            Some(json!({ "product_name": "Kettle" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
        assert!(body["detail"].as_str().unwrap_or_default().contains("text"));

        let request = Request::builder()
            .method(Method::POST)
            .uri("/analyze/batch")
            .header("content-type", "application/json")
            .body(Body::from("{ not json"))
            .expect("request");
        let response = router(state.clone())
            .oneshot(request)
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn batch_item_errors_do_not_expose_server_address() {
        let state = unreachable_state();

        let (status, body) = send(
            &state,
            Method::POST,
            "/analyze/batch",
            Some(json!({ "items": ["Fine item one"], "tasks": { "sentiment": true } })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error_count"], 1);
        let error = body["results"][0]["error"].as_str().unwrap_or_default();
        assert!(error.contains("Cannot connect"));
        assert!(!error.contains("http://"));
        assert!(!error.contains("127.0.0.1"));
    }

    #[tokio::test]
    async fn health_reports_inference_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tags");
                then.status(200).json_body(json!({ "models": [] }));
            })
            .await;
        let state = state_for(&server);

        for uri in ["/health", "/"] {
            let (status, body) = send(&state, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(
                body,
                json!({ "api_status": "online", "inference_status": "online", "model": "mistral" })
            );
        }

        let (status, body) = send(&unreachable_state(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["inference_status"], "offline");
    }

    #[tokio::test]
    async fn models_lists_installed_models() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tags");
                then.status(200).json_body(json!({
                    "models": [{ "name": "mistral:latest", "size": 4109865159_u64 }]
                }));
            })
            .await;
        let state = state_for(&server);

        let (status, body) = send(&state, Method::GET, "/models", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["models"][0]["name"], "mistral:latest");

        let (status, _) = send(&unreachable_state(), Method::GET, "/models", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn history_lists_newest_first_and_clears() {
        let server = MockServer::start_async().await;
        mock_reply(&server, "Analyze the sentiment", "Positive").await;
        let state = state_for(&server);

        for text in ["First review", "Second review"] {
            let (status, _) = send(
                &state,
                Method::POST,
                "/analyze",
                Some(json!({ "text": text, "tasks": { "sentiment": true } })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(&state, Method::GET, "/history", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["capacity"], 20);
        assert_eq!(body["entries"][0]["source_text"], "Second review");
        assert_eq!(body["entries"][1]["source_text"], "First review");

        let (status, _) = send(&state, Method::DELETE, "/history", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = send(&state, Method::GET, "/history", None).await;
        assert_eq!(body["entries"], json!([]));
    }
}
