//! Batch loading and splitting
//!
//! A batch is an ordered sequence of records; order is preserved through
//! every transformation so scores can be re-attached to inputs by position.

use std::fs::File;
use std::path::Path;

use csv::Reader;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::record::TransactionRecord;
use crate::error::PipelineError;
use crate::pipeline::features::FEATURE_COLUMNS;

/// Ordered batch of raw transactions with a uniform schema.
#[derive(Debug, Clone, Default)]
pub struct TransactionBatch {
    rows: Vec<TransactionRecord>,
}

impl TransactionBatch {
    pub fn from_rows(rows: Vec<TransactionRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TransactionRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether any row carries the training label.
    pub fn has_labels(&self) -> bool {
        self.rows.iter().any(|r| r.is_high_risk.is_some())
    }

    /// Load a batch from a CSV file.
    ///
    /// The header is checked against the required feature columns up front;
    /// a column missing from the file fails the whole call rather than being
    /// silently skipped, so training and serving can never disagree on the
    /// matrix width.
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let file = File::open(path.as_ref())?;
        let mut reader = Reader::from_reader(file);

        let headers = reader.headers()?.clone();
        for column in FEATURE_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(PipelineError::Schema(column.to_string()));
            }
        }

        let mut rows = Vec::new();
        for result in reader.deserialize() {
            let record: TransactionRecord = result?;
            rows.push(record);
        }

        Ok(Self { rows })
    }
}

/// Shuffle `0..n` with a seeded generator and cut off a test fraction.
///
/// Returns `(train_indices, test_indices)`. The test set holds at least one
/// row whenever `n > 1`.
pub fn split_indices(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut n_test = ((n as f64) * test_fraction).round() as usize;
    if n > 1 {
        n_test = n_test.clamp(1, n - 1);
    } else {
        n_test = 0;
    }

    let test = indices.split_off(n - n_test);
    (indices, test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_read_csv_with_missing_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batch.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "TransactionId,CountryCode,Amount,Value,PricingStrategy").unwrap();
        writeln!(file, "t1,251,1500,3,1").unwrap();
        writeln!(file, "t2,44,,1,2").unwrap();
        drop(file);

        let batch = TransactionBatch::read_csv(&path).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.rows()[0].amount, Some(1500.0));
        assert_eq!(batch.rows()[1].amount, None);
        assert_eq!(batch.rows()[1].transaction_id.as_deref(), Some("t2"));
        assert!(!batch.has_labels());
    }

    #[test]
    fn test_read_csv_missing_column_is_schema_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "CountryCode,Value,PricingStrategy").unwrap();
        writeln!(file, "251,3,1").unwrap();
        drop(file);

        let err = TransactionBatch::read_csv(&path).unwrap_err();
        match err {
            PipelineError::Schema(col) => assert_eq!(col, "Amount"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_split_indices_deterministic_and_disjoint() {
        let (train_a, test_a) = split_indices(100, 0.2, 42);
        let (train_b, test_b) = split_indices(100, 0.2, 42);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
        assert_eq!(train_a.len(), 80);
        assert_eq!(test_a.len(), 20);

        for i in &test_a {
            assert!(!train_a.contains(i));
        }
    }

    #[test]
    fn test_split_indices_tiny_batch() {
        let (train, test) = split_indices(2, 0.2, 7);
        assert_eq!(train.len(), 1);
        assert_eq!(test.len(), 1);

        let (train, test) = split_indices(1, 0.2, 7);
        assert_eq!(train.len(), 1);
        assert!(test.is_empty());
    }
}
