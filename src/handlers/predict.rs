//! Prediction handler
//!
//! Accepts one transaction, wraps it in a one-row batch, applies the
//! persisted fitted parameters (never refitting on the incoming record), and
//! returns both classifiers' positive-class probabilities.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::data::{TransactionBatch, TransactionRecord};
use crate::pipeline::features::feature_matrix;
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct PredictRequest {
    #[serde(rename = "CountryCode")]
    pub country_code: i64,

    /// NaN and infinities fail the range check at the boundary.
    #[serde(rename = "Amount")]
    #[validate(range(min = -1e12, max = 1e12))]
    pub amount: f64,

    #[serde(rename = "Value")]
    #[validate(range(min = -1e12, max = 1e12))]
    pub value: f64,

    #[serde(rename = "PricingStrategy")]
    pub pricing_strategy: i64,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub logistic_regression_probability: f64,
    pub gradient_boosting_probability: f64,
}

/// Score one transaction.
pub async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> AppResult<Json<PredictResponse>> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let record = TransactionRecord::complete(
        req.country_code,
        req.amount,
        req.value,
        req.pricing_strategy,
    );
    let batch = TransactionBatch::from_rows(vec![record]);

    let transformed = state.bundle.fitted_params.transform(&batch)?;
    let x = feature_matrix(&transformed);

    let lr = state.bundle.logistic.predict_proba(&x)?;
    let gb = state.bundle.boosting.predict_proba(&x)?;

    Ok(Json(PredictResponse {
        logistic_regression_probability: lr[0],
        gradient_boosting_probability: gb[0],
    }))
}
