//! Transaction record model

use serde::{Deserialize, Serialize};

/// One raw transaction as it arrives from tabular storage or a request.
///
/// Field names mirror the upstream column names. Every feature field is
/// optional so that missing cells survive deserialization; the preprocessor
/// decides what missing means per column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "TransactionId", default)]
    pub transaction_id: Option<String>,

    #[serde(rename = "CountryCode", default)]
    pub country_code: Option<i64>,

    #[serde(rename = "Amount", default)]
    pub amount: Option<f64>,

    #[serde(rename = "Value", default)]
    pub value: Option<f64>,

    #[serde(rename = "PricingStrategy", default)]
    pub pricing_strategy: Option<i64>,

    /// Binary label, present only in training data.
    #[serde(rename = "is_high_risk", default)]
    pub is_high_risk: Option<u8>,
}

impl TransactionRecord {
    /// Build a fully-populated record, the shape the predict endpoint sees.
    pub fn complete(country_code: i64, amount: f64, value: f64, pricing_strategy: i64) -> Self {
        Self {
            transaction_id: None,
            country_code: Some(country_code),
            amount: Some(amount),
            value: Some(value),
            pricing_strategy: Some(pricing_strategy),
            is_high_risk: None,
        }
    }
}
