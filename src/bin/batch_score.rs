//! Batch scoring binary
//!
//! Reads an unlabeled transaction CSV, applies the persisted preprocessing
//! parameters and both classifiers, and writes one probability pair per input
//! row, in input order.
//!
//! Usage: `batch-score [data.csv] [output.csv] [model_dir]` (defaults:
//! `data/raw/data.csv`, `data/predictions/fraud_predictions.csv`, `$MODEL_DIR`
//! or `models`).

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use fraudscore::data::TransactionBatch;
use fraudscore::models::ModelBundle;
use fraudscore::pipeline::feature_matrix;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
struct ScoredRow {
    #[serde(rename = "TransactionId")]
    transaction_id: Option<String>,
    lr_prob: f64,
    gb_prob: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "batch_score=info,fraudscore=info".into()),
        )
        .init();

    dotenvy::dotenv().ok();
    let mut args = std::env::args().skip(1);
    let data_path = args.next().unwrap_or_else(|| "data/raw/data.csv".to_string());
    let output_path = args
        .next()
        .unwrap_or_else(|| "data/predictions/fraud_predictions.csv".to_string());
    let model_dir = args.next().unwrap_or_else(|| {
        std::env::var("MODEL_DIR").unwrap_or_else(|_| "models".to_string())
    });

    let bundle = ModelBundle::load(&model_dir)
        .with_context(|| format!("failed to load model bundle from {}", model_dir))?;
    info!("Model bundle loaded from {}", model_dir);

    let batch = TransactionBatch::read_csv(&data_path)
        .with_context(|| format!("failed to load {}", data_path))?;
    info!("Loaded {} records from {}", batch.len(), data_path);

    // Persisted training-time statistics only; nothing is refit here.
    let transformed = bundle.fitted_params.transform(&batch)?;
    let x = feature_matrix(&transformed);

    let lr_probs = bundle.logistic.predict_proba(&x)?;
    let gb_probs = bundle.boosting.predict_proba(&x)?;

    if let Some(parent) = Path::new(&output_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = Writer::from_writer(File::create(&output_path)?);
    for (i, row) in transformed.rows().iter().enumerate() {
        writer.serialize(ScoredRow {
            transaction_id: row.transaction_id.clone(),
            lr_prob: lr_probs[i],
            gb_prob: gb_probs[i],
        })?;
    }
    writer.flush()?;

    info!(
        "Wrote {} predictions to {}",
        transformed.len(),
        output_path
    );
    Ok(())
}
