//! Encode-then-regress pipeline

use crate::error::{ForecastError, Result};
use crate::preprocessing::{CategoricalSchema, OrdinalEncoder};
use crate::training::Regressor;
use ndarray::{Array1, ArrayView1};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Ordinal encoder composed with a regressor
///
/// Cloning an unfitted pipeline gives an independent copy that can be
/// trained without affecting the original.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline<R> {
    encoder: OrdinalEncoder,
    regressor: R,
}

impl<R: Regressor> Pipeline<R> {
    pub fn new(encoder: OrdinalEncoder, regressor: R) -> Self {
        Self { encoder, regressor }
    }

    /// Derive the categorical schema from `data` and compose it with `regressor`
    pub fn build(data: &DataFrame, regressor: R) -> Result<Self> {
        let schema = CategoricalSchema::from_frame(data)?;
        Ok(Self::new(OrdinalEncoder::new(schema), regressor))
    }

    pub fn encoder(&self) -> &OrdinalEncoder {
        &self.encoder
    }

    pub fn schema(&self) -> &CategoricalSchema {
        self.encoder.schema()
    }

    pub fn regressor(&self) -> &R {
        &self.regressor
    }

    /// Train the regressor on the encoded frame
    pub fn fit(&mut self, data: &DataFrame, target: ArrayView1<f64>) -> Result<()> {
        if data.height() != target.len() {
            return Err(ForecastError::ShapeError {
                expected: format!("{} target values", data.height()),
                actual: format!("{} target values", target.len()),
            });
        }

        let x = self.encoder.transform(data)?;
        self.regressor.fit(&x, &target.to_owned())
    }

    /// Predict one value per row of `data`
    pub fn predict(&self, data: &DataFrame) -> Result<Array1<f64>> {
        let x = self.encoder.transform(data)?;
        self.regressor.predict(&x)
    }
}
