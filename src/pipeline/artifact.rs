//! Serialized fitted pipeline

use super::definition::Pipeline;
use crate::error::Result;
use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Immutable product of a successful fit
///
/// Holds the bincode-encoded trained pipeline together with the in-sample
/// residuals. Only the crate can create one, so the bytes it deserializes
/// always come from a pipeline this process trained.
#[derive(Debug, Clone)]
pub struct FittedArtifact {
    bytes: Vec<u8>,
    residuals: Array1<f64>,
    fitted_at: DateTime<Utc>,
}

impl FittedArtifact {
    pub(crate) fn new<R: Serialize>(pipeline: &Pipeline<R>, residuals: Array1<f64>) -> Result<Self> {
        let bytes = bincode::serialize(pipeline)?;
        Ok(Self {
            bytes,
            residuals,
            fitted_at: Utc::now(),
        })
    }

    /// Rebuild the trained pipeline
    pub(crate) fn load<R: DeserializeOwned>(&self) -> Result<Pipeline<R>> {
        Ok(bincode::deserialize(&self.bytes)?)
    }

    /// Serialized model bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Training target minus in-sample predictions
    pub fn residuals(&self) -> &Array1<f64> {
        &self.residuals
    }

    pub fn fitted_at(&self) -> DateTime<Utc> {
        self.fitted_at
    }
}
