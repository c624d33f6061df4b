//! Forecasting pipeline module
//!
//! Composes the categorical encoder and a regressor into a single pipeline
//! and manages its lifecycle:
//! - build the untrained definition once from the training frame
//! - fit it on the full training set into an immutable artifact
//! - cross-validate it over walk-forward folds
//! - predict from the fitted artifact

mod artifact;
mod config;
mod definition;
mod forecasting;

pub use artifact::FittedArtifact;
pub use config::PipelineConfig;
pub use definition::Pipeline;
pub use forecasting::ForecastingPipeline;
