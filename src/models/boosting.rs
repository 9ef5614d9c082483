//! Gradient boosting for binary risk classification
//!
//! Additive regression stumps fitted to residuals in probability space. Each
//! round searches every feature for the split that best reduces squared
//! residual error; predictions accumulate with a learning rate and are
//! clamped to `[0, 1]`.

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ModelError;

/// Maximum split candidates examined per feature each round.
const MAX_SPLIT_CANDIDATES: usize = 32;

/// One depth-1 regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Stump {
    feature_index: usize,
    threshold: f64,
    left_value: f64,
    right_value: f64,
}

impl Stump {
    fn predict(&self, row: ArrayView1<f64>) -> f64 {
        if row[self.feature_index] <= self.threshold {
            self.left_value
        } else {
            self.right_value
        }
    }
}

/// Gradient-boosted stump ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoosting {
    trees: Vec<Stump>,
    base_score: f64,
    learning_rate: f64,
    n_rounds: usize,
    trained: bool,
}

impl Default for GradientBoosting {
    fn default() -> Self {
        Self::new(0.1, 100)
    }
}

impl GradientBoosting {
    pub fn new(learning_rate: f64, n_rounds: usize) -> Self {
        Self {
            trees: Vec::new(),
            base_score: 0.5,
            learning_rate,
            n_rounds,
            trained: false,
        }
    }

    /// Fit on a feature matrix and 0/1 labels.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        let (n, d) = x.dim();
        if n == 0 {
            return Err(ModelError::TrainingFailed(
                "empty training set".to_string(),
            ));
        }
        if y.len() != n {
            return Err(ModelError::InvalidData(format!(
                "{} rows but {} labels",
                n,
                y.len()
            )));
        }

        self.trees.clear();
        self.base_score = y.sum() / n as f64;

        info!(
            "Training gradient boosting: {} samples, {} features, {} rounds",
            n, d, self.n_rounds
        );

        let mut predictions = vec![self.base_score; n];

        for _ in 0..self.n_rounds {
            let residuals: Vec<f64> = y
                .iter()
                .zip(predictions.iter())
                .map(|(&label, &pred)| label - pred)
                .collect();

            let Some(stump) = Self::fit_stump(x, &residuals) else {
                break;
            };

            for (i, pred) in predictions.iter_mut().enumerate() {
                *pred = (*pred + self.learning_rate * stump.predict(x.row(i))).clamp(0.0, 1.0);
            }
            self.trees.push(stump);
        }

        self.trained = true;
        Ok(())
    }

    /// Find the stump minimizing squared residual error across all features.
    fn fit_stump(x: &Array2<f64>, residuals: &[f64]) -> Option<Stump> {
        let (n, d) = x.dim();
        let mut best: Option<(Stump, f64)> = None;

        for feature in 0..d {
            let mut values: Vec<f64> = x.column(feature).to_vec();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();
            if values.len() < 2 {
                continue;
            }

            // Thin out candidates on wide columns; midpoints between
            // neighbouring observed values.
            let step = (values.len() / MAX_SPLIT_CANDIDATES).max(1);
            for pair in values.windows(2).step_by(step) {
                let threshold = (pair[0] + pair[1]) / 2.0;

                let mut left_sum = 0.0;
                let mut left_count = 0.0;
                let mut right_sum = 0.0;
                let mut right_count = 0.0;
                for i in 0..n {
                    if x[[i, feature]] <= threshold {
                        left_sum += residuals[i];
                        left_count += 1.0;
                    } else {
                        right_sum += residuals[i];
                        right_count += 1.0;
                    }
                }
                if left_count == 0.0 || right_count == 0.0 {
                    continue;
                }

                let left_value = left_sum / left_count;
                let right_value = right_sum / right_count;

                let sse: f64 = (0..n)
                    .map(|i| {
                        let fitted = if x[[i, feature]] <= threshold {
                            left_value
                        } else {
                            right_value
                        };
                        (residuals[i] - fitted).powi(2)
                    })
                    .sum();

                if best.as_ref().map_or(true, |(_, best_sse)| sse < *best_sse) {
                    best = Some((
                        Stump {
                            feature_index: feature,
                            threshold,
                            left_value,
                            right_value,
                        },
                        sse,
                    ));
                }
            }
        }

        best.map(|(stump, _)| stump)
    }

    /// Probability of the positive class per row, clamped to `[0, 1]`.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if !self.trained {
            return Err(ModelError::NotTrained);
        }

        let n = x.nrows();
        let mut probs = Vec::with_capacity(n);
        for i in 0..n {
            let mut score = self.base_score;
            for tree in &self.trees {
                score = (score + self.learning_rate * tree.predict(x.row(i))).clamp(0.0, 1.0);
            }
            probs.push(score);
        }
        Ok(Array1::from(probs))
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_threshold_pattern() {
        // Positive iff the single feature exceeds 5.
        let x = array![
            [1.0],
            [2.0],
            [3.0],
            [4.0],
            [6.0],
            [7.0],
            [8.0],
            [9.0]
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];

        let mut model = GradientBoosting::new(0.3, 50);
        model.fit(&x, &y).unwrap();
        assert!(model.n_trees() > 0);

        let probs = model.predict_proba(&x).unwrap();
        for (i, &p) in probs.iter().enumerate() {
            assert!((0.0..=1.0).contains(&p));
            if y[i] > 0.5 {
                assert!(p > 0.5, "row {i}: expected high prob, got {p}");
            } else {
                assert!(p < 0.5, "row {i}: expected low prob, got {p}");
            }
        }
    }

    #[test]
    fn test_constant_feature_stops_early() {
        let x = array![[1.0], [1.0], [1.0]];
        let y = array![0.0, 1.0, 0.0];

        let mut model = GradientBoosting::default();
        model.fit(&x, &y).unwrap();
        // No usable split: prediction falls back to the base rate.
        assert_eq!(model.n_trees(), 0);
        let probs = model.predict_proba(&x).unwrap();
        for &p in probs.iter() {
            assert!((p - 1.0 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_training_set_fails() {
        let x = Array2::<f64>::zeros((0, 4));
        let y = Array1::<f64>::zeros(0);
        let mut model = GradientBoosting::default();
        assert!(matches!(
            model.fit(&x, &y),
            Err(ModelError::TrainingFailed(_))
        ));
        assert!(!model.is_trained());
    }

    #[test]
    fn test_untrained_model_errors() {
        let model = GradientBoosting::default();
        let x = array![[1.0]];
        assert!(matches!(
            model.predict_proba(&x),
            Err(ModelError::NotTrained)
        ));
    }

    #[test]
    fn test_serde_roundtrip_keeps_predictions() {
        let x = array![[1.0], [2.0], [8.0], [9.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let mut model = GradientBoosting::new(0.3, 20);
        model.fit(&x, &y).unwrap();

        let json = serde_json::to_string(&model).unwrap();
        let restored: GradientBoosting = serde_json::from_str(&json).unwrap();

        let a = model.predict_proba(&x).unwrap();
        let b = restored.predict_proba(&x).unwrap();
        for (p, q) in a.iter().zip(b.iter()) {
            assert!((p - q).abs() < 1e-12);
        }
    }
}
