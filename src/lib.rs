//! Fraud/credit-risk scoring pipeline.
//!
//! Trains two binary classifiers on transaction features, serves per-record
//! predictions over HTTP, and scores whole CSV files in batch. The piece
//! shared between training and serving is the feature preprocessor: its
//! fitted statistics are persisted next to the models and reused verbatim at
//! inference time.

pub mod config;
pub mod data;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pipeline;

use std::sync::Arc;

pub use config::Config;
pub use error::{AppError, AppResult, PipelineError};
pub use models::registry::ModelBundle;

/// Shared application state for the HTTP service.
///
/// Built once in `main` and handed to every handler. The model bundle is
/// immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub bundle: Arc<ModelBundle>,
    pub config: Config,
}
