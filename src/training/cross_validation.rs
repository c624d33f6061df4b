//! Parallel cross-validation over precomputed folds

use super::metrics::Scorer;
use crate::error::{ForecastError, Result};
use crate::timeseries::TimeSeriesSplit;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scores and timings of a single fold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldScore {
    pub fold: usize,
    /// One value per configured scorer, higher is better
    pub scores: BTreeMap<Scorer, f64>,
    pub fit_time_secs: f64,
    pub score_time_secs: f64,
}

/// Raw per-fold results, in fold order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CVResults {
    pub folds: Vec<FoldScore>,
}

impl CVResults {
    pub fn n_folds(&self) -> usize {
        self.folds.len()
    }

    /// Per-fold values of one scorer
    pub fn scores(&self, scorer: Scorer) -> Vec<f64> {
        self.folds
            .iter()
            .filter_map(|f| f.scores.get(&scorer).copied())
            .collect()
    }

    /// Collapse to a mean/std summary per scorer
    pub fn summarize(&self, precision: u32) -> CVSummary {
        let scorers: Vec<Scorer> = self
            .folds
            .iter()
            .flat_map(|f| f.scores.keys().copied())
            .collect();

        let scores = scorers
            .into_iter()
            .map(|scorer| (scorer, ScoreSummary::from_scores(&self.scores(scorer), precision)))
            .collect();

        CVSummary {
            n_folds: self.n_folds(),
            scores,
        }
    }
}

/// Mean and population standard deviation of a metric's magnitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub mean: f64,
    pub std: f64,
}

impl ScoreSummary {
    /// Summarize `|score|` over folds, rounded half-to-even to `precision` decimals
    pub fn from_scores(scores: &[f64], precision: u32) -> Self {
        let n = scores.len() as f64;
        let abs: Vec<f64> = scores.iter().map(|s| s.abs()).collect();
        let mean = abs.iter().sum::<f64>() / n;
        let variance = abs.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

        Self {
            mean: round_to(mean, precision),
            std: round_to(variance.sqrt(), precision),
        }
    }
}

fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round_ties_even() / factor
}

/// Aggregated cross-validation outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CVSummary {
    pub n_folds: usize,
    pub scores: BTreeMap<Scorer, ScoreSummary>,
}

impl CVSummary {
    pub fn get(&self, scorer: Scorer) -> Option<&ScoreSummary> {
        self.scores.get(&scorer)
    }

    /// Mean absolute error summary, if scored
    pub fn mae(&self) -> Option<&ScoreSummary> {
        self.get(Scorer::NegMeanAbsoluteError)
    }

    /// Mean absolute percentage error summary, if scored
    pub fn mape(&self) -> Option<&ScoreSummary> {
        self.get(Scorer::NegMeanAbsolutePercentageError)
    }
}

/// Evaluate every fold in parallel and collect the scores
///
/// Each fold is independent; the first failing fold aborts the round and is
/// reported as [`ForecastError::ValidationFailed`]. With `n_jobs` set, folds
/// run on a dedicated pool of that many threads instead of the global one.
pub fn cross_validate<F>(splits: &[TimeSeriesSplit], n_jobs: Option<usize>, evaluate: F) -> Result<CVResults>
where
    F: Fn(&TimeSeriesSplit) -> Result<FoldScore> + Send + Sync,
{
    if splits.is_empty() {
        return Err(ForecastError::ConfigError(
            "No folds to cross-validate".to_string(),
        ));
    }

    let pool = match n_jobs {
        Some(n) => Some(
            rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ForecastError::ThreadPoolError(e.to_string()))?,
        ),
        None => None,
    };

    let run = || -> Result<Vec<FoldScore>> {
        splits
            .par_iter()
            .map(|split| evaluate(split).map_err(|e| ForecastError::validation_failed(split.fold, e)))
            .collect::<Result<Vec<_>>>()
    };

    let mut folds = match pool {
        Some(ref pool) => pool.install(run)?,
        None => run()?,
    };
    folds.sort_by_key(|f| f.fold);

    Ok(CVResults { folds })
}
