//! Core types shared across the textlens crates.
//!
//! Holds the identifier types stamped onto analysis results and the
//! `Result` alias used at crate boundaries.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{AnalysisId, BatchId};
