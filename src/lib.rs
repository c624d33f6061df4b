//! Powerload - daily power load forecasting
//!
//! This crate provides a forecasting pipeline for daily load series:
//! - Calendar feature derivation and chronological train/test partitioning
//! - Walk-forward cross-validation with rolling or expanding windows
//! - An encode-then-regress pipeline with a fit/validate/predict lifecycle
//! - Gradient boosted regression trees
//!
//! # Modules
//!
//! - [`timeseries`] - Walk-forward splitting, calendar features, holidays
//! - [`preprocessing`] - Categorical schema and ordinal encoding
//! - [`training`] - Regressors, metrics, parallel fold evaluation
//! - [`pipeline`] - Forecasting pipeline lifecycle and fitted artifacts
//! - [`export`] - Artifact stores
//! - [`utils`] - CSV loading and train/test partitioning
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core modules
pub mod timeseries;
pub mod preprocessing;
pub mod training;
pub mod pipeline;

// Utilities
pub mod export;
pub mod utils;

// Services
pub mod cli;

pub use error::{ForecastError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{ForecastError, Result};

    // Time series
    pub use crate::timeseries::{CalendarFeatures, HolidayCalendar, SplitConfig, TimeSeriesSplit, WalkForwardCV, WindowStrategy};

    // Preprocessing
    pub use crate::preprocessing::{CategoricalSchema, OrdinalEncoder};

    // Training
    pub use crate::training::{
        CVSummary, GradientBoostingConfig, GradientBoostingRegressor, MeanRegressor, Regressor, Scorer,
    };

    // Pipeline
    pub use crate::pipeline::{FittedArtifact, ForecastingPipeline, Pipeline, PipelineConfig};

    // Export
    pub use crate::export::{ArtifactStore, FileStore, LoggingStore, MemoryStore};

    // Data loading
    pub use crate::utils::{DataLoader, LoaderConfig, TrainTestSplit};
}
