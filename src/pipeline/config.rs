//! Pipeline configuration

use crate::training::Scorer;
use serde::{Deserialize, Serialize};

/// Settings for the validate stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Scorers evaluated on every fold
    pub scorers: Vec<Scorer>,
    /// Decimal places kept in the cross-validation summary
    pub precision: u32,
    /// Worker threads for fold evaluation (None = global rayon pool)
    pub n_jobs: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scorers: Scorer::defaults(),
            precision: 3,
            n_jobs: None,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scorers(mut self, scorers: Vec<Scorer>) -> Self {
        self.scorers = scorers;
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = Some(n_jobs);
        self
    }
}
