//! Time series cross-validation
//!
//! Walk-forward splitting of a chronologically ordered series into
//! train/test folds under a rolling or expanding window.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// How the training window moves from one fold to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowStrategy {
    /// Fixed-size training window that slides forward with the test window
    Rolling,
    /// Training window anchored at the start of the series, growing every fold
    Expanding,
}

impl Default for WindowStrategy {
    fn default() -> Self {
        WindowStrategy::Rolling
    }
}

impl fmt::Display for WindowStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowStrategy::Rolling => write!(f, "rolling"),
            WindowStrategy::Expanding => write!(f, "expanding"),
        }
    }
}

impl FromStr for WindowStrategy {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rolling" => Ok(WindowStrategy::Rolling),
            "expanding" => Ok(WindowStrategy::Expanding),
            other => Err(ForecastError::ConfigError(format!(
                "Unknown validation strategy '{}', expected 'rolling' or 'expanding'",
                other
            ))),
        }
    }
}

/// Immutable splitter configuration, expressed in observations (one per day)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitConfig {
    train_size: usize,
    horizon: usize,
    strategy: WindowStrategy,
}

impl SplitConfig {
    /// Create a new split configuration
    pub fn new(train_size: usize, horizon: usize, strategy: WindowStrategy) -> Result<Self> {
        if train_size == 0 {
            return Err(ForecastError::ConfigError(
                "train_size must be at least 1".to_string(),
            ));
        }
        if horizon == 0 {
            return Err(ForecastError::ConfigError(
                "forecasting horizon must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            train_size,
            horizon,
            strategy,
        })
    }

    /// Rolling window configuration
    pub fn rolling(train_size: usize, horizon: usize) -> Result<Self> {
        Self::new(train_size, horizon, WindowStrategy::Rolling)
    }

    /// Expanding window configuration
    pub fn expanding(train_size: usize, horizon: usize) -> Result<Self> {
        Self::new(train_size, horizon, WindowStrategy::Expanding)
    }

    pub fn train_size(&self) -> usize {
        self.train_size
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn strategy(&self) -> WindowStrategy {
        self.strategy
    }
}

/// One train/test fold, both sides contiguous positions in the original ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesSplit {
    /// Fold number (0-indexed, chronological)
    pub fold: usize,
    /// Training positions
    pub train: Range<usize>,
    /// Test positions, always right after the training positions
    pub test: Range<usize>,
}

impl TimeSeriesSplit {
    pub fn train_len(&self) -> usize {
        self.train.len()
    }

    pub fn test_len(&self) -> usize {
        self.test.len()
    }

    /// Training indices, materialized
    pub fn train_indices(&self) -> Vec<usize> {
        self.train.clone().collect()
    }

    /// Test indices, materialized
    pub fn test_indices(&self) -> Vec<usize> {
        self.test.clone().collect()
    }
}

/// Walk-forward cross-validator
///
/// The first test window starts as soon as `train_size` observations are
/// available, then advances by exactly `horizon` observations per fold.
/// A trailing window shorter than `horizon` is dropped so every fold scores
/// the same number of points.
#[derive(Debug, Clone)]
pub struct WalkForwardCV {
    config: SplitConfig,
}

impl WalkForwardCV {
    /// Create new walk-forward CV
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }

    /// Create new walk-forward CV with sliding window
    pub fn rolling(train_size: usize, horizon: usize) -> Result<Self> {
        SplitConfig::rolling(train_size, horizon).map(Self::new)
    }

    /// Create new walk-forward CV with expanding window
    pub fn expanding(train_size: usize, horizon: usize) -> Result<Self> {
        SplitConfig::expanding(train_size, horizon).map(Self::new)
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Number of folds `split` would produce for `n_samples` observations
    pub fn n_splits(&self, n_samples: usize) -> usize {
        n_samples
            .checked_sub(self.config.train_size)
            .map_or(0, |rest| rest / self.config.horizon)
    }

    /// Generate splits
    pub fn split(&self, n_samples: usize) -> Result<Vec<TimeSeriesSplit>> {
        let SplitConfig {
            train_size,
            horizon,
            strategy,
        } = self.config;

        if train_size.checked_add(horizon).map_or(true, |need| need > n_samples) {
            return Err(ForecastError::ConfigError(format!(
                "train_size ({}) + horizon ({}) exceeds the {} available observations",
                train_size, horizon, n_samples
            )));
        }

        let splits = (0..self.n_splits(n_samples))
            .map(|fold| {
                let test_start = train_size + fold * horizon;
                let train_start = match strategy {
                    WindowStrategy::Rolling => test_start - train_size,
                    WindowStrategy::Expanding => 0,
                };

                TimeSeriesSplit {
                    fold,
                    train: train_start..test_start,
                    test: test_start..test_start + horizon,
                }
            })
            .collect();

        Ok(splits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_forward_rolling() {
        let cv = WalkForwardCV::rolling(5, 2).unwrap();
        let splits = cv.split(15).unwrap();

        // (15 - 5) / 2 = 5 folds
        assert_eq!(splits.len(), 5);
        assert_eq!(splits[0].train, 0..5);
        assert_eq!(splits[0].test, 5..7);
        assert_eq!(splits[4].train, 8..13);
        assert_eq!(splits[4].test, 13..15);

        for split in &splits {
            assert_eq!(split.train_len(), 5);
        }
    }

    #[test]
    fn test_walk_forward_expanding() {
        let cv = WalkForwardCV::expanding(5, 2).unwrap();
        let splits = cv.split(15).unwrap();

        assert_eq!(splits.len(), 5);
        for split in &splits {
            assert_eq!(split.train.start, 0);
            assert_eq!(split.train.end, split.test.start);
        }
        for pair in splits.windows(2) {
            assert!(pair[1].train_len() > pair[0].train_len());
        }
    }

    #[test]
    fn test_oversized_window_is_config_error() {
        let cv = WalkForwardCV::rolling(usize::MAX, 2).unwrap();
        assert!(matches!(cv.split(100), Err(ForecastError::ConfigError(_))));
        assert_eq!(cv.n_splits(100), 0);

        let cv = WalkForwardCV::expanding(10, usize::MAX).unwrap();
        assert!(matches!(cv.split(100), Err(ForecastError::ConfigError(_))));
    }

    #[test]
    fn test_partial_trailing_fold_dropped() {
        let cv = WalkForwardCV::rolling(4, 3).unwrap();
        let splits = cv.split(12).unwrap();

        // Tests at [4, 7) and [7, 10); [10, 12) is too short
        assert_eq!(splits.len(), 2);
        assert!(splits.iter().all(|s| s.test_len() == 3));
        assert_eq!(splits.last().unwrap().test.end, 10);
    }

    #[test]
    fn test_exact_fit_yields_single_fold() {
        let cv = WalkForwardCV::rolling(3650, 365).unwrap();
        let splits = cv.split(4015).unwrap();

        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].train_len(), 3650);
        assert_eq!(splits[0].test_len(), 365);
    }

    #[test]
    fn test_window_larger_than_history() {
        let cv = WalkForwardCV::rolling(3650, 365).unwrap();
        let err = cv.split(4000).unwrap_err();
        assert!(matches!(err, ForecastError::ConfigError(_)));
    }

    #[test]
    fn test_zero_sizes_rejected() {
        assert!(matches!(
            SplitConfig::rolling(0, 10),
            Err(ForecastError::ConfigError(_))
        ));
        assert!(matches!(
            SplitConfig::expanding(10, 0),
            Err(ForecastError::ConfigError(_))
        ));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("rolling".parse::<WindowStrategy>().unwrap(), WindowStrategy::Rolling);
        assert_eq!("Expanding".parse::<WindowStrategy>().unwrap(), WindowStrategy::Expanding);
        assert!("sliding".parse::<WindowStrategy>().is_err());
        assert_eq!(WindowStrategy::Expanding.to_string(), "expanding");
    }

    #[test]
    fn test_no_lookahead_across_folds() {
        let cv = WalkForwardCV::rolling(7, 3).unwrap();
        let splits = cv.split(40).unwrap();

        for (k, split) in splits.iter().enumerate() {
            // Rows tested in fold k are never trained on in fold k or earlier
            for earlier in &splits[..=k] {
                assert!(earlier.train.end <= split.test.start);
            }
        }
    }
}
