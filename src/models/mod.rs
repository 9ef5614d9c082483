//! Classifiers, evaluation metrics and artifact registry

pub mod boosting;
pub mod logistic;
pub mod metrics;
pub mod registry;

use thiserror::Error;

pub use boosting::GradientBoosting;
pub use logistic::LogisticRegression;
pub use metrics::EvalReport;
pub use registry::{ModelBundle, TrainingReport};

/// Errors that can occur with a classifier.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model not trained")]
    NotTrained,

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("dimension mismatch: expected {expected} features, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("training failed: {0}")]
    TrainingFailed(String),
}
