//! Feature matrix assembly
//!
//! Every downstream model depends on this exact column set and order.
//! Producing anything else is a contract violation.

use ndarray::{Array1, Array2};

use super::preprocess::TransformedBatch;

/// Required feature columns, in the order the classifiers were trained on.
pub const FEATURE_COLUMNS: [&str; 4] = ["CountryCode", "Amount", "Value", "PricingStrategy"];

/// Build the rectangular feature matrix, one row per record, columns in
/// [`FEATURE_COLUMNS`] order regardless of how the input arrived.
pub fn feature_matrix(batch: &TransformedBatch) -> Array2<f64> {
    let mut matrix = Array2::zeros((batch.len(), FEATURE_COLUMNS.len()));
    for (i, row) in batch.rows().iter().enumerate() {
        matrix[[i, 0]] = row.country_code;
        matrix[[i, 1]] = row.amount;
        matrix[[i, 2]] = row.value;
        matrix[[i, 3]] = row.pricing_strategy;
    }
    matrix
}

/// Extract the label vector, if every row carries one.
pub fn labels(batch: &TransformedBatch) -> Option<Array1<f64>> {
    let mut values = Vec::with_capacity(batch.len());
    for row in batch.rows() {
        values.push(f64::from(row.is_high_risk?));
    }
    Some(Array1::from(values))
}
