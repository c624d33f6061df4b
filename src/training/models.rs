//! Regressor trait and baseline model

use crate::error::{ForecastError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Trait for regressors trained on an encoded feature matrix
pub trait Regressor: Send + Sync {
    /// Fit the model to training data, discarding any previous fit
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Make predictions
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Short model name for logs
    fn name(&self) -> &'static str;

    /// Get feature importances (if available)
    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }
}

/// Constant baseline predicting the training mean
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeanRegressor {
    mean: Option<f64>,
    n_features: usize,
}

impl MeanRegressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fitted mean, if any
    pub fn mean(&self) -> Option<f64> {
        self.mean
    }
}

impl Regressor for MeanRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(ForecastError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }

        let mean = y.mean().ok_or_else(|| {
            ForecastError::TrainingError("Cannot fit on an empty target".to_string())
        })?;
        if !mean.is_finite() {
            return Err(ForecastError::TrainingError(
                "Target contains non-finite values".to_string(),
            ));
        }

        self.mean = Some(mean);
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let mean = self.mean.ok_or(ForecastError::ModelNotFitted)?;
        if x.ncols() != self.n_features {
            return Err(ForecastError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(Array1::from_elem(x.nrows(), mean))
    }

    fn name(&self) -> &'static str {
        "mean"
    }
}
