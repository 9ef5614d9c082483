//! Feature preprocessing
//!
//! The one piece training and serving must agree on. `Preprocessor::fit`
//! learns imputation, scaling and encoding statistics from a batch;
//! `FittedParams::transform` applies them without ever refitting. The fitted
//! state is serialized next to the model artifacts so the serving path reuses
//! the training-time statistics instead of recomputing them from whatever
//! batch walks in (a one-row batch has a degenerate standard deviation).
//!
//! Pinned conventions:
//! - numeric imputation: column median, even counts average the middle two;
//! - categorical imputation: column mode, ties resolve to the lowest value;
//! - standardization: `(x - mean) / std` with population std (ddof = 0);
//!   a zero-spread column maps to 0 instead of dividing by zero;
//! - weight-of-evidence: `ln(P(level|pos) / P(level|neg))` with +0.5 count
//!   smoothing per class, fitted only when labels are present and always
//!   applied at transform time; unseen levels encode to 0.0.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::{TransactionBatch, TransactionRecord};
use crate::error::PipelineError;

/// Mean/std pair for one numeric column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: f64,
    pub std: f64,
}

impl ScalerParams {
    /// Fit on already-imputed values. Population std.
    fn fit(values: &[f64]) -> Self {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Self {
            mean,
            std: variance.sqrt(),
        }
    }

    fn apply(&self, x: f64) -> f64 {
        if self.std > f64::EPSILON {
            (x - self.mean) / self.std
        } else {
            0.0
        }
    }
}

/// Everything `transform` needs, learned once from a training batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedParams {
    pub amount_median: f64,
    pub value_median: f64,
    pub pricing_mode: i64,
    pub amount_scaler: ScalerParams,
    pub value_scaler: ScalerParams,
    /// Weight-of-evidence map for `PricingStrategy`, keyed by the level's
    /// decimal string form. `None` when fitted without labels; the raw code
    /// then passes through numerically.
    pub woe: Option<BTreeMap<String, f64>>,
}

/// One record after imputation, scaling and encoding. Label and identifier
/// pass through untouched.
#[derive(Debug, Clone)]
pub struct TransformedRow {
    pub transaction_id: Option<String>,
    pub country_code: f64,
    pub amount: f64,
    pub value: f64,
    pub pricing_strategy: f64,
    pub is_high_risk: Option<u8>,
}

/// Transformed batch, same row count and order as its input.
#[derive(Debug, Clone)]
pub struct TransformedBatch {
    rows: Vec<TransformedRow>,
}

impl TransformedBatch {
    pub fn rows(&self) -> &[TransformedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Fit entry point.
pub struct Preprocessor;

impl Preprocessor {
    /// Learn imputation, scaling and encoding statistics from a batch.
    ///
    /// The weight-of-evidence map is fitted iff the batch carries labels; a
    /// partially-labeled batch is rejected rather than guessed at.
    pub fn fit(batch: &TransactionBatch) -> Result<FittedParams, PipelineError> {
        if batch.is_empty() {
            return Err(PipelineError::Data(
                "batch".to_string(),
                "cannot fit on an empty batch".to_string(),
            ));
        }

        let amount_median = column_median(batch.rows(), "Amount", |r| r.amount)?;
        let value_median = column_median(batch.rows(), "Value", |r| r.value)?;
        let pricing_mode = column_mode(batch.rows(), "PricingStrategy", |r| r.pricing_strategy)?;

        // Scalers are fitted on the imputed series, matching the original
        // fillna-then-scale order.
        let amounts: Vec<f64> = batch
            .rows()
            .iter()
            .map(|r| r.amount.unwrap_or(amount_median))
            .collect();
        let values: Vec<f64> = batch
            .rows()
            .iter()
            .map(|r| r.value.unwrap_or(value_median))
            .collect();

        let woe = if batch.has_labels() {
            Some(fit_woe(batch.rows(), pricing_mode)?)
        } else {
            None
        };

        Ok(FittedParams {
            amount_median,
            value_median,
            pricing_mode,
            amount_scaler: ScalerParams::fit(&amounts),
            value_scaler: ScalerParams::fit(&values),
            woe,
        })
    }
}

impl FittedParams {
    /// Apply the fitted statistics to a batch. Row count and order are
    /// preserved; nothing is refitted.
    pub fn transform(&self, batch: &TransactionBatch) -> Result<TransformedBatch, PipelineError> {
        let mut rows = Vec::with_capacity(batch.len());

        for record in batch.rows() {
            let country_code = record.country_code.ok_or_else(|| {
                PipelineError::Data(
                    "CountryCode".to_string(),
                    "missing value and no imputation statistic exists".to_string(),
                )
            })? as f64;

            let amount = self
                .amount_scaler
                .apply(record.amount.unwrap_or(self.amount_median));
            let value = self
                .value_scaler
                .apply(record.value.unwrap_or(self.value_median));

            let pricing_code = record.pricing_strategy.unwrap_or(self.pricing_mode);
            let pricing_strategy = match &self.woe {
                // Unseen level: zero evidence either way.
                Some(map) => *map.get(&pricing_code.to_string()).unwrap_or(&0.0),
                None => pricing_code as f64,
            };

            rows.push(TransformedRow {
                transaction_id: record.transaction_id.clone(),
                country_code,
                amount,
                value,
                pricing_strategy,
                is_high_risk: record.is_high_risk,
            });
        }

        Ok(TransformedBatch { rows })
    }
}

/// Fit and transform in one call, reproducing the original per-call-refit
/// semantics. Used at training time; serving always goes through persisted
/// [`FittedParams`]. Not idempotent by design: statistics are refit from the
/// batch on every call.
pub fn preprocess(
    batch: &TransactionBatch,
) -> Result<(FittedParams, TransformedBatch), PipelineError> {
    let params = Preprocessor::fit(batch)?;
    let transformed = params.transform(batch)?;
    Ok((params, transformed))
}

fn column_median<F>(
    rows: &[TransactionRecord],
    column: &str,
    get: F,
) -> Result<f64, PipelineError>
where
    F: Fn(&TransactionRecord) -> Option<f64>,
{
    let mut values: Vec<f64> = rows.iter().filter_map(&get).filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return Err(PipelineError::Data(
            column.to_string(),
            "no non-missing values to compute a median from".to_string(),
        ));
    }

    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    let median = if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    };
    Ok(median)
}

fn column_mode<F>(rows: &[TransactionRecord], column: &str, get: F) -> Result<i64, PipelineError>
where
    F: Fn(&TransactionRecord) -> Option<i64>,
{
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for value in rows.iter().filter_map(&get) {
        *counts.entry(value).or_insert(0) += 1;
    }

    // BTreeMap iterates in ascending key order, so a strict comparison keeps
    // the lowest value on ties.
    counts
        .iter()
        .fold(None, |best: Option<(i64, usize)>, (&value, &count)| match best {
            Some((_, best_count)) if count <= best_count => best,
            _ => Some((value, count)),
        })
        .map(|(value, _)| value)
        .ok_or_else(|| {
            PipelineError::Data(
                column.to_string(),
                "no non-missing values to compute a mode from".to_string(),
            )
        })
}

/// Weight-of-evidence per `PricingStrategy` level with +0.5 smoothing on each
/// class count, so levels absent from one class stay finite.
fn fit_woe(
    rows: &[TransactionRecord],
    pricing_mode: i64,
) -> Result<BTreeMap<String, f64>, PipelineError> {
    let mut class_counts: BTreeMap<i64, (f64, f64)> = BTreeMap::new();
    let mut total_pos = 0.0;
    let mut total_neg = 0.0;

    for record in rows {
        let label = record.is_high_risk.ok_or_else(|| {
            PipelineError::Data(
                "is_high_risk".to_string(),
                "label column is partially missing".to_string(),
            )
        })?;
        let level = record.pricing_strategy.unwrap_or(pricing_mode);
        let entry = class_counts.entry(level).or_insert((0.0, 0.0));
        if label > 0 {
            entry.0 += 1.0;
            total_pos += 1.0;
        } else {
            entry.1 += 1.0;
            total_neg += 1.0;
        }
    }

    if total_pos == 0.0 || total_neg == 0.0 {
        return Err(PipelineError::Data(
            "is_high_risk".to_string(),
            "weight-of-evidence needs both classes present".to_string(),
        ));
    }

    let n_levels = class_counts.len() as f64;
    let mut map = BTreeMap::new();
    for (level, (pos, neg)) in class_counts {
        let p_pos = (pos + 0.5) / (total_pos + 0.5 * n_levels);
        let p_neg = (neg + 0.5) / (total_neg + 0.5 * n_levels);
        map.insert(level.to_string(), (p_pos / p_neg).ln());
    }
    Ok(map)
}
