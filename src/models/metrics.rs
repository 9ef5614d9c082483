//! Evaluation metrics for binary classifiers
//!
//! Accuracy, precision, recall and F1 at a 0.5 threshold, plus rank-based
//! ROC-AUC over the raw probabilities.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Held-out evaluation for one classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// `None` when the held-out split contains only one class.
    pub roc_auc: Option<f64>,
}

impl EvalReport {
    /// Evaluate probabilities against 0/1 labels at a 0.5 decision threshold.
    pub fn binary(y_true: &Array1<f64>, probs: &Array1<f64>) -> Self {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        let mut tn = 0usize;

        for (&truth, &p) in y_true.iter().zip(probs.iter()) {
            let predicted_positive = p >= 0.5;
            let actually_positive = truth >= 0.5;
            match (actually_positive, predicted_positive) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => tn += 1,
            }
        }

        let total = tp + fp + fn_ + tn;
        let accuracy = if total == 0 {
            0.0
        } else {
            (tp + tn) as f64 / total as f64
        };
        let precision = if tp + fp == 0 {
            0.0
        } else {
            tp as f64 / (tp + fp) as f64
        };
        let recall = if tp + fn_ == 0 {
            0.0
        } else {
            tp as f64 / (tp + fn_) as f64
        };
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Self {
            accuracy,
            precision,
            recall,
            f1,
            roc_auc: roc_auc(y_true, probs),
        }
    }
}

/// Mann-Whitney ROC-AUC with average ranks for tied scores.
pub fn roc_auc(y_true: &Array1<f64>, scores: &Array1<f64>) -> Option<f64> {
    let n = y_true.len();
    if n == 0 || n != scores.len() {
        return None;
    }

    let n_pos = y_true.iter().filter(|&&t| t >= 0.5).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Average ranks across tied scores.
    let mut ranks = vec![0.0f64; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = ((i + 1 + j + 1) as f64) / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = y_true
        .iter()
        .zip(ranks.iter())
        .filter(|(&t, _)| t >= 0.5)
        .map(|(_, &r)| r)
        .sum();

    let auc = (pos_rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0) / (n_pos * n_neg) as f64;
    Some(auc)
}
