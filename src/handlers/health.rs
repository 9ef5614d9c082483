//! Health check handler
//!
//! Reports service liveness plus model readiness: which artifact directory is
//! live, whether the weight-of-evidence map was fitted, and how many boosted
//! trees the bundle carries.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model_dir: String,
    woe_fitted: bool,
    boosting_trees: usize,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model_dir: state.config.model_dir.clone(),
        woe_fitted: state.bundle.fitted_params.woe.is_some(),
        boosting_trees: state.bundle.boosting.n_trees(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::data::{TransactionBatch, TransactionRecord};
    use crate::models::{GradientBoosting, LogisticRegression, ModelBundle};
    use crate::pipeline::preprocess::Preprocessor;
    use ndarray::array;
    use std::sync::Arc;

    fn test_state() -> AppState {
        let mut a = TransactionRecord::complete(1, 1.0, 1.0, 1);
        a.is_high_risk = Some(1);
        let mut b = TransactionRecord::complete(2, 2.0, 2.0, 2);
        b.is_high_risk = Some(0);
        let batch = TransactionBatch::from_rows(vec![a, b]);
        let fitted_params = Preprocessor::fit(&batch).unwrap();

        let x = array![[1.0], [2.0], [8.0], [9.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let mut logistic = LogisticRegression::default();
        logistic.fit(&x, &y).unwrap();
        let mut boosting = GradientBoosting::new(0.3, 10);
        boosting.fit(&x, &y).unwrap();

        AppState {
            bundle: Arc::new(ModelBundle {
                fitted_params,
                logistic,
                boosting,
            }),
            config: Config {
                port: 8080,
                model_dir: "models".to_string(),
                environment: "development".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_health_reports_model_readiness() {
        let response = check(State(test_state())).await.0;

        assert_eq!(response.status, "healthy");
        assert_eq!(response.model_dir, "models");
        assert!(response.woe_fitted);
        assert!(response.boosting_trees > 0);
    }
}
