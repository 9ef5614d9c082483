//! Training binary
//!
//! Reads a labeled transaction CSV, fits the preprocessor, trains both
//! classifiers on a seeded train/test split, logs held-out metrics, and
//! writes the model bundle plus a training report to the model directory.
//!
//! Usage: `train [data.csv] [model_dir]` (defaults: `data/raw/training.csv`,
//! `$MODEL_DIR` or `models`).

use anyhow::{bail, Context, Result};
use fraudscore::data::batch::{split_indices, TransactionBatch};
use fraudscore::models::{
    EvalReport, GradientBoosting, LogisticRegression, ModelBundle, TrainingReport,
};
use fraudscore::pipeline::{feature_matrix, labels, preprocess};
use ndarray::Axis;
use tracing::info;

const TEST_FRACTION: f64 = 0.2;
const SPLIT_SEED: u64 = 42;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "train=info,fraudscore=info".into()),
        )
        .init();

    dotenvy::dotenv().ok();
    let mut args = std::env::args().skip(1);
    let data_path = args
        .next()
        .unwrap_or_else(|| "data/raw/training.csv".to_string());
    let model_dir = args.next().unwrap_or_else(|| {
        std::env::var("MODEL_DIR").unwrap_or_else(|_| "models".to_string())
    });

    info!("Loading training data from {}", data_path);
    let batch = TransactionBatch::read_csv(&data_path)
        .with_context(|| format!("failed to load {}", data_path))?;
    info!("Loaded {} records", batch.len());

    if !batch.has_labels() {
        bail!("training data has no `is_high_risk` column");
    }

    // Fit preprocessing statistics on the full batch and transform it; the
    // fitted params ship with the models so serving reuses them verbatim.
    let (params, transformed) = preprocess(&batch)?;
    let x = feature_matrix(&transformed);
    let y = labels(&transformed)
        .context("`is_high_risk` is partially missing; every training row needs a label")?;

    let (train_idx, test_idx) = split_indices(x.nrows(), TEST_FRACTION, SPLIT_SEED);
    let x_train = x.select(Axis(0), &train_idx);
    let y_train = y.select(Axis(0), &train_idx);
    let x_test = x.select(Axis(0), &test_idx);
    let y_test = y.select(Axis(0), &test_idx);
    info!(
        "Split: {} train rows, {} test rows",
        train_idx.len(),
        test_idx.len()
    );

    let mut logistic = LogisticRegression::default();
    logistic.fit(&x_train, &y_train)?;
    let lr_eval = EvalReport::binary(&y_test, &logistic.predict_proba(&x_test)?);
    info!(
        accuracy = lr_eval.accuracy,
        precision = lr_eval.precision,
        recall = lr_eval.recall,
        f1 = lr_eval.f1,
        roc_auc = ?lr_eval.roc_auc,
        "Logistic regression evaluated"
    );

    let mut boosting = GradientBoosting::default();
    boosting.fit(&x_train, &y_train)?;
    let gb_eval = EvalReport::binary(&y_test, &boosting.predict_proba(&x_test)?);
    info!(
        accuracy = gb_eval.accuracy,
        precision = gb_eval.precision,
        recall = gb_eval.recall,
        f1 = gb_eval.f1,
        roc_auc = ?gb_eval.roc_auc,
        "Gradient boosting evaluated"
    );

    let bundle = ModelBundle {
        fitted_params: params,
        logistic,
        boosting,
    };
    bundle.save(&model_dir)?;

    let report = TrainingReport::new(train_idx.len(), test_idx.len(), lr_eval, gb_eval);
    report.save(&model_dir)?;
    info!(
        run_id = %report.run_id,
        "Model bundle and training report written to {}",
        model_dir
    );

    Ok(())
}
