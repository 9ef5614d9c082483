//! Model artifact registry
//!
//! The trained classifiers and the fitted preprocessing parameters persist
//! together as JSON files in one directory; the serving process loads them
//! once at startup. A training report with run id, timestamp, and held-out
//! metrics lands next to them.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use super::boosting::GradientBoosting;
use super::logistic::LogisticRegression;
use super::metrics::EvalReport;
use crate::error::PipelineError;
use crate::pipeline::preprocess::FittedParams;

pub const FITTED_PARAMS_FILE: &str = "fitted_params.json";
pub const LOGISTIC_FILE: &str = "logistic_regression.json";
pub const BOOSTING_FILE: &str = "gradient_boosting.json";
pub const REPORT_FILE: &str = "training_report.json";

/// Everything serving needs: fitted transform state plus both classifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub fitted_params: FittedParams,
    pub logistic: LogisticRegression,
    pub boosting: GradientBoosting,
}

impl ModelBundle {
    /// Write the three artifacts into `dir`, creating it if needed.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<(), PipelineError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        write_json(dir.join(FITTED_PARAMS_FILE), &self.fitted_params)?;
        write_json(dir.join(LOGISTIC_FILE), &self.logistic)?;
        write_json(dir.join(BOOSTING_FILE), &self.boosting)?;
        Ok(())
    }

    /// Load all three artifacts from `dir`. A missing file fails with a
    /// model error naming it.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, PipelineError> {
        let dir = dir.as_ref();
        Ok(Self {
            fitted_params: read_json(dir.join(FITTED_PARAMS_FILE))?,
            logistic: read_json(dir.join(LOGISTIC_FILE))?,
            boosting: read_json(dir.join(BOOSTING_FILE))?,
        })
    }
}

/// Record of one training run; the lightweight stand-in for an experiment
/// tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub run_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub n_train: usize,
    pub n_test: usize,
    pub logistic: EvalReport,
    pub boosting: EvalReport,
}

impl TrainingReport {
    pub fn new(n_train: usize, n_test: usize, logistic: EvalReport, boosting: EvalReport) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            trained_at: Utc::now(),
            n_train,
            n_test,
            logistic,
            boosting,
        }
    }

    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<(), PipelineError> {
        std::fs::create_dir_all(dir.as_ref())?;
        write_json(dir.as_ref().join(REPORT_FILE), self)
    }
}

fn write_json<T: Serialize>(path: PathBuf, value: &T) -> Result<(), PipelineError> {
    let file = File::create(&path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: PathBuf) -> Result<T, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::Model(format!(
            "model artifact not found: {}",
            path.display()
        )));
    }
    let file = File::open(&path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
