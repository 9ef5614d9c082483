//! Logistic regression for binary risk classification
//!
//! Plain batch gradient descent with optional L2 regularization. Coefficients
//! are kept as `Vec<f64>` so the trained model serializes to JSON alongside
//! the fitted preprocessing parameters.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ModelError;

/// Logistic regression classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    coefficients: Vec<f64>,
    intercept: f64,
    learning_rate: f64,
    max_iter: usize,
    tolerance: f64,
    /// L2 penalty strength; 0 disables regularization.
    l2: f64,
    trained: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(0.1, 500, 1e-6, 0.0)
    }
}

impl LogisticRegression {
    pub fn new(learning_rate: f64, max_iter: usize, tolerance: f64, l2: f64) -> Self {
        Self {
            coefficients: Vec::new(),
            intercept: 0.0,
            learning_rate,
            max_iter,
            tolerance,
            l2,
            trained: false,
        }
    }

    /// Create with L2 regularization, sklearn-style `C` (inverse strength).
    pub fn with_l2(c: f64) -> Self {
        Self::new(0.1, 500, 1e-6, 1.0 / c)
    }

    fn sigmoid(z: f64) -> f64 {
        if z >= 0.0 {
            1.0 / (1.0 + (-z).exp())
        } else {
            let exp_z = z.exp();
            exp_z / (1.0 + exp_z)
        }
    }

    fn log_loss(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        let eps = 1e-15;
        let n = y_true.len() as f64;
        -y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&y, &p)| {
                let p = p.clamp(eps, 1.0 - eps);
                y * p.ln() + (1.0 - y) * (1.0 - p).ln()
            })
            .sum::<f64>()
            / n
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

        let mut w = Array1::<f64>::zeros(d);
        let mut b = 0.0;
        let mut prev_loss = f64::INFINITY;

        info!("Training logistic regression: {} samples, {} features", n, d);

        for iter in 0..self.max_iter {
            let z = x.dot(&w) + b;
            let p = z.mapv(Self::sigmoid);
            let err = &p - y;

            let grad_w = x.t().dot(&err) / n as f64 + &w * self.l2;
            let grad_b = err.sum() / n as f64;

            w = w - grad_w * self.learning_rate;
            b -= grad_b * self.learning_rate;

            let loss = Self::log_loss(y, &p);
            if (prev_loss - loss).abs() < self.tolerance {
                info!("Converged after {} iterations (loss {:.6})", iter + 1, loss);
                break;
            }
            prev_loss = loss;
        }

        self.coefficients = w.to_vec();
        self.intercept = b;
        self.trained = true;
        Ok(())
    }

    /// Probability of the positive class per row, each in `[0, 1]`.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if !self.trained {
            return Err(ModelError::NotTrained);
        }
        if x.ncols() != self.coefficients.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.coefficients.len(),
                got: x.ncols(),
            });
        }

        let w = Array1::from(self.coefficients.clone());
        let z = x.dot(&w) + self.intercept;
        Ok(z.mapv(Self::sigmoid))
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }
}
