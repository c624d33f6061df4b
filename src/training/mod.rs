//! Model training module
//!
//! Provides the estimators and scoring used by the forecasting pipeline:
//! - Gradient boosting over regression trees
//! - A constant mean baseline
//! - Regression metrics and named scorers
//! - Parallel fold evaluation

mod models;
pub mod cross_validation;
pub mod decision_tree;
pub mod gradient_boosting;
pub mod metrics;

pub use cross_validation::{cross_validate, CVResults, CVSummary, FoldScore, ScoreSummary};
pub use decision_tree::{RegressionTree, TreeNode};
pub use gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
pub use metrics::{mean_absolute_error, mean_absolute_percentage_error, Scorer};
pub use models::{MeanRegressor, Regressor};
