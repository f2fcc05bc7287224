//! HTTP API for textlens.
//!
//! Exposes review analysis, batch analysis, summarization, model listing,
//! health and a short in-memory history over a local inference server.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod types;

pub use app::{router, serve};
pub use config::ServerConfig;
pub use error::{ApiError, StartupError};
pub use state::AppState;
