//! Error types for the powerload forecasting pipeline

use thiserror::Error;

/// Result type alias for forecasting operations
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Main error type for the forecasting pipeline
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Unknown category {category:?} in column {column:?}")]
    UnknownCategory { column: String, category: String },

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Model fitting failed: {source}")]
    FitFailed {
        #[source]
        source: Box<ForecastError>,
    },

    #[error("Cross-validation failed on fold {fold}: {source}")]
    ValidationFailed {
        fold: usize,
        #[source]
        source: Box<ForecastError>,
    },

    #[error("Model inference failed: {source}")]
    InferenceFailed {
        #[source]
        source: Box<ForecastError>,
    },

    #[error("Model not fitted, call `fit()` first")]
    ModelNotFitted,

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ForecastError {
    /// Wrap an estimator error raised while fitting the full training set
    pub fn fit_failed(source: ForecastError) -> Self {
        ForecastError::FitFailed { source: Box::new(source) }
    }

    /// Wrap an error raised by one cross-validation fold
    pub fn validation_failed(fold: usize, source: ForecastError) -> Self {
        ForecastError::ValidationFailed { fold, source: Box::new(source) }
    }

    /// Wrap an error raised while serving predictions
    pub fn inference_failed(source: ForecastError) -> Self {
        ForecastError::InferenceFailed { source: Box::new(source) }
    }
}

impl From<polars::error::PolarsError> for ForecastError {
    fn from(err: polars::error::PolarsError) -> Self {
        ForecastError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for ForecastError {
    fn from(err: bincode::Error) -> Self {
        ForecastError::SerializationError(err.to_string())
    }
}
