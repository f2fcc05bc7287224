//! Service health reporting.

use serde::{Deserialize, Serialize};
use textlens_inference::InferenceBackend;
use tracing::debug;

/// Liveness of this service and of the inference server behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Always true: reaching this code means the service is up.
    pub api_alive: bool,
    pub inference_alive: bool,
}

/// Probes the inference server. Re-probes on every call; never fails.
pub async fn check_health<B: InferenceBackend + ?Sized>(backend: &B) -> HealthReport {
    let inference_alive = backend.is_alive().await;
    debug!(inference_alive, "health probe");
    HealthReport {
        api_alive: true,
        inference_alive,
    }
}
