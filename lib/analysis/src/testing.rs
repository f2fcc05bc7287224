//! In-memory inference backend for tests.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use textlens_inference::{
    CompletionRequest, FailureKind, InferenceBackend, InferenceError, ModelInfo, RawCompletion,
};

type Script = Box<dyn Fn(&CompletionRequest) -> RawCompletion + Send + Sync>;

/// Answers completions from a closure and records what it was asked.
pub(crate) struct ScriptedBackend {
    script: Script,
    delay: Duration,
    alive: AtomicBool,
    prompts: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedBackend {
    pub(crate) fn new(
        script: impl Fn(&CompletionRequest) -> RawCompletion + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            delay: Duration::ZERO,
            alive: AtomicBool::new(true),
            prompts: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Always replies with `text`.
    pub(crate) fn replying(text: &'static str) -> Self {
        Self::new(move |_| RawCompletion::success(text, Duration::from_millis(1)))
    }

    /// Holds every completion open for `delay` so overlap is observable.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::SeqCst);
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    async fn complete(&self, request: &CompletionRequest) -> RawCompletion {
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(request.prompt.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        (self.script)(request)
    }

    async fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, InferenceError> {
        Ok(vec![ModelInfo {
            name: "mistral".to_string(),
            size: None,
            modified_at: None,
        }])
    }
}

/// A connection failure as the HTTP client would report it.
pub(crate) fn connection_failure() -> RawCompletion {
    RawCompletion::failure(
        FailureKind::ConnectionFailure,
        "Cannot connect to the inference server",
        Duration::ZERO,
    )
}
