//! Regression error metrics and named scorers

use crate::error::{ForecastError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn check_lengths(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(ForecastError::ShapeError {
            expected: format!("{} predictions", y_true.len()),
            actual: format!("{} predictions", y_pred.len()),
        });
    }
    if y_true.is_empty() {
        return Err(ForecastError::DataError(
            "Cannot score an empty prediction set".to_string(),
        ));
    }
    Ok(())
}

/// Mean absolute error
pub fn mean_absolute_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let total: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).abs())
        .sum();
    Ok(total / y_true.len() as f64)
}

/// Mean absolute percentage error, as a fraction
///
/// Each term is `|y - ŷ| / max(|y|, ε)` so zero targets give a large but
/// finite error.
pub fn mean_absolute_percentage_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let total: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).abs() / t.abs().max(f64::EPSILON))
        .sum();
    Ok(total / y_true.len() as f64)
}

/// Named scorer; higher is better, so error metrics are negated
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scorer {
    NegMeanAbsoluteError,
    NegMeanAbsolutePercentageError,
}

impl Scorer {
    /// Scorers used when none are configured
    pub fn defaults() -> Vec<Scorer> {
        vec![Scorer::NegMeanAbsolutePercentageError, Scorer::NegMeanAbsoluteError]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scorer::NegMeanAbsoluteError => "neg_mean_absolute_error",
            Scorer::NegMeanAbsolutePercentageError => "neg_mean_absolute_percentage_error",
        }
    }

    /// Score predictions against the truth
    pub fn score(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
        let error = match self {
            Scorer::NegMeanAbsoluteError => mean_absolute_error(y_true, y_pred)?,
            Scorer::NegMeanAbsolutePercentageError => mean_absolute_percentage_error(y_true, y_pred)?,
        };
        Ok(-error)
    }
}

impl fmt::Display for Scorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scorer {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "neg_mean_absolute_error" => Ok(Scorer::NegMeanAbsoluteError),
            "neg_mean_absolute_percentage_error" => Ok(Scorer::NegMeanAbsolutePercentageError),
            other => Err(ForecastError::ConfigError(format!("Unknown scorer '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mean_absolute_error() {
        let y_true = array![100.0, 200.0, 300.0];
        let y_pred = array![110.0, 190.0, 300.0];
        let mae = mean_absolute_error(&y_true, &y_pred).unwrap();
        assert!((mae - 20.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_mean_absolute_percentage_error() {
        let y_true = array![100.0, 200.0];
        let y_pred = array![110.0, 150.0];
        let mape = mean_absolute_percentage_error(&y_true, &y_pred).unwrap();
        // (0.10 + 0.25) / 2
        assert!((mape - 0.175).abs() < 1e-12);
    }

    #[test]
    fn test_mape_zero_target_is_finite() {
        let mape = mean_absolute_percentage_error(&array![0.0], &array![1.0]).unwrap();
        assert!(mape.is_finite());
        assert!(mape > 1e10);
    }

    #[test]
    fn test_length_mismatch() {
        let err = mean_absolute_error(&array![1.0, 2.0], &array![1.0]).unwrap_err();
        assert!(matches!(err, ForecastError::ShapeError { .. }));
    }

    #[test]
    fn test_scorer_negates_and_parses() {
        let y_true = array![10.0, 20.0];
        let y_pred = array![12.0, 18.0];

        assert_eq!(Scorer::NegMeanAbsoluteError.score(&y_true, &y_pred).unwrap(), -2.0);

        let scorer: Scorer = "neg_mean_absolute_percentage_error".parse().unwrap();
        assert_eq!(scorer, Scorer::NegMeanAbsolutePercentageError);
        assert_eq!(scorer.to_string(), "neg_mean_absolute_percentage_error");
        assert!("r2".parse::<Scorer>().is_err());

        let json = serde_json::to_string(&Scorer::NegMeanAbsoluteError).unwrap();
        assert_eq!(json, "\"neg_mean_absolute_error\"");
    }
}
