//! End-to-end pipeline test: fit the preprocessor and both classifiers on a
//! synthetic labeled batch, persist everything, reload it, and score a single
//! transaction the way the serving path does.

use std::fs::File;
use std::io::Write;

use fraudscore::data::{TransactionBatch, TransactionRecord};
use fraudscore::models::{GradientBoosting, LogisticRegression, ModelBundle};
use fraudscore::pipeline::{feature_matrix, labels, preprocess};
use tempfile::tempdir;

/// High-risk rows carry large amounts and pricing strategy 3; low-risk rows
/// stay small with strategies 1 and 2. Country codes alternate within both
/// classes so the one raw-scale column stays uninformative. A few cells go
/// missing on purpose.
fn synthetic_training_batch() -> TransactionBatch {
    let mut rows = Vec::new();
    for i in 0..40 {
        let country = if i % 2 == 0 { 251 } else { 44 };
        let mut r = TransactionRecord::complete(
            country,
            50.0 + (i as f64) * 3.0,
            1.0 + (i % 4) as f64,
            1 + (i % 2) as i64,
        );
        if i % 13 == 0 {
            r.amount = None;
        }
        r.is_high_risk = Some(0);
        rows.push(r);
    }
    for i in 0..40 {
        let country = if i % 2 == 0 { 251 } else { 44 };
        let mut r = TransactionRecord::complete(
            country,
            2000.0 + (i as f64) * 25.0,
            5.0 + (i % 3) as f64,
            3,
        );
        if i % 11 == 0 {
            r.value = None;
        }
        r.is_high_risk = Some(1);
        rows.push(r);
    }
    TransactionBatch::from_rows(rows)
}

#[test]
fn train_persist_reload_and_score_single_record() {
    let batch = synthetic_training_batch();

    let (params, transformed) = preprocess(&batch).expect("preprocess");
    assert_eq!(transformed.len(), batch.len());

    let x = feature_matrix(&transformed);
    let y = labels(&transformed).expect("all rows labeled");
    assert_eq!(x.dim(), (80, 4));

    let mut logistic = LogisticRegression::default();
    logistic.fit(&x, &y).expect("logistic fit");
    let mut boosting = GradientBoosting::default();
    boosting.fit(&x, &y).expect("boosting fit");

    let dir = tempdir().unwrap();
    ModelBundle {
        fitted_params: params,
        logistic,
        boosting,
    }
    .save(dir.path())
    .expect("save bundle");

    // Serving path: reload, wrap one record in a batch, transform with the
    // persisted params only.
    let bundle = ModelBundle::load(dir.path()).expect("load bundle");
    let request = TransactionBatch::from_rows(vec![TransactionRecord::complete(
        251, 1500.0, 3.0, 1,
    )]);
    let transformed = bundle
        .fitted_params
        .transform(&request)
        .expect("transform single record");
    let x = feature_matrix(&transformed);
    assert_eq!(x.dim(), (1, 4));

    // A one-row batch must not produce degenerate statistics: the values
    // come from the training-time scaler, so they are finite.
    for v in x.iter() {
        assert!(v.is_finite());
    }

    let lr = bundle.logistic.predict_proba(&x).expect("lr proba")[0];
    let gb = bundle.boosting.predict_proba(&x).expect("gb proba")[0];
    assert!((0.0..=1.0).contains(&lr), "lr prob out of range: {lr}");
    assert!((0.0..=1.0).contains(&gb), "gb prob out of range: {gb}");
}

#[test]
fn feature_matrix_order_is_independent_of_csv_column_order() {
    // The file carries the required columns in a scrambled order; records
    // deserialize by header name, so the assembled matrix must still come out
    // as {CountryCode, Amount, Value, PricingStrategy}.
    let dir = tempdir().unwrap();
    let path = dir.path().join("shuffled.csv");
    let mut file = File::create(&path).unwrap();
    writeln!(file, "PricingStrategy,Value,Amount,CountryCode,TransactionId").unwrap();
    writeln!(file, "1,3,0,251,t1").unwrap();
    writeln!(file, "1,3,10,44,t2").unwrap();
    drop(file);

    let batch = TransactionBatch::read_csv(&path).unwrap();
    assert_eq!(batch.rows()[0].transaction_id.as_deref(), Some("t1"));
    assert_eq!(batch.rows()[0].country_code, Some(251));
    assert_eq!(batch.rows()[1].amount, Some(10.0));

    let (_, transformed) = preprocess(&batch).unwrap();
    let x = feature_matrix(&transformed);
    assert_eq!(x.dim(), (2, 4));

    // Column 0: raw country codes. Column 1: Amount standardized over
    // {0, 10}. Column 2: Value has zero spread and maps to 0. Column 3:
    // unlabeled fit leaves PricingStrategy numeric.
    assert_eq!(x[[0, 0]], 251.0);
    assert_eq!(x[[1, 0]], 44.0);
    assert!((x[[0, 1]] + 1.0).abs() < 1e-12);
    assert!((x[[1, 1]] - 1.0).abs() < 1e-12);
    assert_eq!(x[[0, 2]], 0.0);
    assert_eq!(x[[0, 3]], 1.0);
}

#[test]
fn classifiers_separate_the_synthetic_classes() {
    let batch = synthetic_training_batch();
    let (params, transformed) = preprocess(&batch).unwrap();
    let x = feature_matrix(&transformed);
    let y = labels(&transformed).unwrap();

    let mut logistic = LogisticRegression::default();
    logistic.fit(&x, &y).unwrap();

    // Score an obvious high-risk and an obvious low-risk record through the
    // fitted transform; the high-risk one must rank higher.
    let holdout = TransactionBatch::from_rows(vec![
        TransactionRecord::complete(44, 2500.0, 6.0, 3),
        TransactionRecord::complete(251, 60.0, 1.0, 1),
    ]);
    let holdout_x = feature_matrix(&params.transform(&holdout).unwrap());
    let probs = logistic.predict_proba(&holdout_x).unwrap();
    assert!(
        probs[0] > probs[1],
        "expected high-risk record to outrank low-risk: {} vs {}",
        probs[0],
        probs[1]
    );
}
