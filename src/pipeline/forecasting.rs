//! Forecasting pipeline lifecycle
//!
//! Owns the training data and drives the fit, validate and predict stages.
//! The untrained pipeline definition is built once in the constructor and
//! cloned for every training run, so the stages never share mutable state.

use super::artifact::FittedArtifact;
use super::config::PipelineConfig;
use super::definition::Pipeline;
use crate::error::{ForecastError, Result};
use crate::export::{ArtifactStore, LoggingStore};
use crate::timeseries::{SplitConfig, TimeSeriesSplit, WalkForwardCV, WindowStrategy};
use crate::training::{cross_validate, CVSummary, FoldScore, GradientBoostingRegressor, Regressor};
use ndarray::{s, Array1};
use polars::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Span};

/// Fit/validate/predict driver over a fixed training set
pub struct ForecastingPipeline<R = GradientBoostingRegressor> {
    config: PipelineConfig,
    data: DataFrame,
    target: Array1<f64>,
    definition: Pipeline<R>,
    artifact: Option<Arc<FittedArtifact>>,
    store: Arc<dyn ArtifactStore>,
    span: Span,
}

impl ForecastingPipeline<GradientBoostingRegressor> {
    /// Pipeline with the default seeded gradient boosting regressor
    pub fn new(data: DataFrame, target: Array1<f64>) -> Result<Self> {
        Self::with_regressor(data, target, GradientBoostingRegressor::default())
    }
}

impl<R> ForecastingPipeline<R>
where
    R: Regressor + Clone + Serialize + DeserializeOwned,
{
    /// Pipeline around an arbitrary regressor prototype
    pub fn with_regressor(data: DataFrame, target: Array1<f64>, regressor: R) -> Result<Self> {
        if data.height() != target.len() {
            return Err(ForecastError::ShapeError {
                expected: format!("{} target values", data.height()),
                actual: format!("{} target values", target.len()),
            });
        }
        if data.height() == 0 || data.width() == 0 {
            return Err(ForecastError::DataError(
                "Training data is empty".to_string(),
            ));
        }

        let definition = Pipeline::build(&data, regressor)?;

        Ok(Self {
            config: PipelineConfig::default(),
            data,
            target,
            definition,
            artifact: None,
            store: Arc::new(LoggingStore),
            span: info_span!("forecasting_pipeline"),
        })
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Destination for residuals, model bytes, scores and predictions
    pub fn with_store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.store = store;
        self
    }

    /// Span all stage events are recorded under
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The untrained pipeline every stage starts from
    pub fn definition(&self) -> &Pipeline<R> {
        &self.definition
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn target(&self) -> &Array1<f64> {
        &self.target
    }

    pub fn n_observations(&self) -> usize {
        self.data.height()
    }

    pub fn is_fitted(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn artifact(&self) -> Option<&FittedArtifact> {
        self.artifact.as_deref()
    }

    /// In-sample residuals of the current fit
    pub fn residuals(&self) -> Option<&Array1<f64>> {
        self.artifact().map(FittedArtifact::residuals)
    }

    /// Train on the full training set and replace the fitted artifact
    ///
    /// On failure the previous artifact, if any, is left in place.
    pub fn fit(&mut self) -> Result<()> {
        let span = self.span.clone();
        let _enter = span.enter();
        let start = Instant::now();

        info!(
            n_samples = self.data.height(),
            n_features = self.definition.schema().n_features(),
            model = self.definition.regressor().name(),
            "Fitting forecasting pipeline"
        );

        let artifact = self.train_artifact().map_err(|e| {
            error!(error = %e, "Model fitting failed.");
            ForecastError::fit_failed(e)
        })?;

        info!("Saving in-sample residuals");
        self.persist_json("residuals.json", &artifact.residuals().to_vec());
        info!(size_bytes = artifact.size_bytes(), "Saving model artifact");
        self.persist("model.bin", artifact.bytes());

        self.artifact = Some(Arc::new(artifact));

        info!(elapsed_secs = start.elapsed().as_secs_f64(), "Pipeline fitted");
        Ok(())
    }

    fn train_artifact(&self) -> Result<FittedArtifact> {
        let mut pipeline = self.definition.clone();
        pipeline.fit(&self.data, self.target.view())?;

        let in_sample = pipeline.predict(&self.data)?;
        let residuals = &self.target - &in_sample;

        FittedArtifact::new(&pipeline, residuals)
    }

    /// Walk-forward cross-validation of the untrained pipeline
    ///
    /// Folds are evaluated in parallel over the same training set `fit` uses.
    /// Returns `mean(|score|)` and `std(|score|)` per scorer; the fitted
    /// artifact is not touched.
    pub fn validate(&self, train_size: usize, horizon: usize, strategy: WindowStrategy) -> Result<CVSummary> {
        let span = self.span.clone();
        let _enter = span.enter();

        if self.config.scorers.is_empty() {
            return Err(ForecastError::ConfigError(
                "At least one scorer is required".to_string(),
            ));
        }

        let cv = WalkForwardCV::new(SplitConfig::new(train_size, horizon, strategy)?);
        let splits = cv.split(self.data.height()).map_err(|e| {
            error!(error = %e, "Invalid cross-validation setup.");
            e
        })?;

        info!(
            n_folds = splits.len(),
            strategy = %strategy,
            train_size,
            horizon,
            "Cross-validating pipeline"
        );

        let results = cross_validate(&splits, self.config.n_jobs, |split| self.evaluate_fold(split, &span))
            .map_err(|e| {
                error!(error = %e, "Cross-validation failed.");
                e
            })?;

        let summary = results.summarize(self.config.precision);
        for (scorer, score) in &summary.scores {
            info!(scorer = %scorer, mean = score.mean, std = score.std, "Cross-validation score");
        }

        self.persist_json("cv_scores.json", &summary);
        Ok(summary)
    }

    fn evaluate_fold(&self, split: &TimeSeriesSplit, parent: &Span) -> Result<FoldScore> {
        let fold_span = info_span!(parent: parent, "fold", fold = split.fold);
        let _enter = fold_span.enter();

        let train = self.data.slice(split.train.start as i64, split.train_len());
        let test = self.data.slice(split.test.start as i64, split.test_len());
        let y_train = self.target.slice(s![split.train.start..split.train.end]);
        let y_test = self.target.slice(s![split.test.start..split.test.end]).to_owned();

        let mut pipeline = self.definition.clone();

        let fit_start = Instant::now();
        pipeline.fit(&train, y_train)?;
        let fit_time_secs = fit_start.elapsed().as_secs_f64();

        let score_start = Instant::now();
        let y_pred = pipeline.predict(&test)?;
        let scores = self
            .config
            .scorers
            .iter()
            .map(|scorer| Ok((*scorer, scorer.score(&y_test, &y_pred)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        let score_time_secs = score_start.elapsed().as_secs_f64();

        debug!(
            train_rows = split.train_len(),
            test_rows = split.test_len(),
            fit_time_secs,
            "Fold evaluated"
        );

        Ok(FoldScore {
            fold: split.fold,
            scores,
            fit_time_secs,
            score_time_secs,
        })
    }

    /// Predict with the fitted artifact
    pub fn predict(&self, new_observations: &DataFrame) -> Result<Array1<f64>> {
        let span = self.span.clone();
        let _enter = span.enter();

        let artifact = self.artifact.as_ref().ok_or_else(|| {
            error!("Model inference failed: pipeline is not fitted.");
            ForecastError::ModelNotFitted
        })?;

        let predictions = Self::predict_with(artifact, new_observations).map_err(|e| {
            error!(error = %e, "Model inference failed.");
            ForecastError::inference_failed(e)
        })?;

        info!(n_predictions = predictions.len(), "Predictions computed");
        self.persist_json("predictions.json", &predictions.to_vec());
        Ok(predictions)
    }

    fn predict_with(artifact: &FittedArtifact, new_observations: &DataFrame) -> Result<Array1<f64>> {
        let pipeline: Pipeline<R> = artifact.load()?;
        pipeline.predict(new_observations)
    }

    fn persist(&self, key: &str, bytes: &[u8]) {
        if let Err(e) = self.store.save(key, bytes) {
            warn!(key, error = %e, "Failed to save artifact");
        }
    }

    fn persist_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_vec_pretty(value) {
            Ok(bytes) => self.persist(key, &bytes),
            Err(e) => warn!(key, error = %e, "Failed to encode artifact"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::MemoryStore;
    use crate::training::MeanRegressor;

    fn frame(n: usize) -> (DataFrame, Array1<f64>) {
        let weekdays = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];
        let df = df!(
            "t" => (0..n).map(|i| i as f64).collect::<Vec<_>>(),
            "weekday" => (0..n).map(|i| weekdays[i % 7]).collect::<Vec<_>>()
        )
        .unwrap();
        let y = (0..n).map(|i| 100.0 + (i % 7) as f64).collect();
        (df, y)
    }

    #[test]
    fn test_definition_is_cached() {
        let (df, y) = frame(14);
        let pipeline = ForecastingPipeline::with_regressor(df, y, MeanRegressor::new()).unwrap();

        assert!(std::ptr::eq(pipeline.definition(), pipeline.definition()));
        assert_eq!(pipeline.definition().schema().categorical_indices(), vec![1]);
    }

    #[test]
    fn test_rejects_mismatched_target() {
        let (df, _) = frame(10);
        let result = ForecastingPipeline::with_regressor(df, Array1::zeros(9), MeanRegressor::new());
        assert!(matches!(result, Err(ForecastError::ShapeError { .. })));
    }

    #[test]
    fn test_fit_saves_artifacts() {
        let (df, y) = frame(21);
        let store = Arc::new(MemoryStore::new());
        let mut pipeline = ForecastingPipeline::with_regressor(df, y, MeanRegressor::new())
            .unwrap()
            .with_store(store.clone());

        pipeline.fit().unwrap();

        assert!(pipeline.is_fitted());
        assert_eq!(pipeline.residuals().unwrap().len(), 21);
        assert_eq!(store.keys(), vec!["model.bin", "residuals.json"]);
        assert_eq!(store.get("model.bin").unwrap(), pipeline.artifact().unwrap().bytes());
    }

    #[test]
    fn test_failed_refit_keeps_previous_artifact() {
        let (df, y) = frame(14);
        let mut pipeline = ForecastingPipeline::with_regressor(df, y, MeanRegressor::new()).unwrap();
        pipeline.fit().unwrap();
        let fitted_at = pipeline.artifact().unwrap().fitted_at();

        // A NaN target makes the next fit fail
        pipeline.target[0] = f64::NAN;
        let err = pipeline.fit().unwrap_err();

        assert!(matches!(err, ForecastError::FitFailed { .. }));
        assert!(pipeline.is_fitted());
        assert_eq!(pipeline.artifact().unwrap().fitted_at(), fitted_at);
    }

    #[test]
    fn test_validate_leaves_artifact_untouched() {
        let (df, y) = frame(28);
        let mut pipeline = ForecastingPipeline::with_regressor(df, y, MeanRegressor::new()).unwrap();

        let summary = pipeline.validate(14, 7, WindowStrategy::Rolling).unwrap();
        assert_eq!(summary.n_folds, 2);
        assert!(!pipeline.is_fitted());

        pipeline.fit().unwrap();
        let bytes = pipeline.artifact().unwrap().bytes().to_vec();
        pipeline.validate(7, 7, WindowStrategy::Expanding).unwrap();
        assert_eq!(pipeline.artifact().unwrap().bytes(), bytes.as_slice());
    }

    #[test]
    fn test_failing_store_does_not_fail_stages() {
        struct BrokenStore;
        impl ArtifactStore for BrokenStore {
            fn save(&self, _key: &str, _bytes: &[u8]) -> Result<()> {
                Err(ForecastError::IoError(std::io::Error::other("disk full")))
            }
        }

        let (df, y) = frame(14);
        let mut pipeline = ForecastingPipeline::with_regressor(df.clone(), y, MeanRegressor::new())
            .unwrap()
            .with_store(Arc::new(BrokenStore));

        pipeline.fit().unwrap();
        pipeline.validate(7, 7, WindowStrategy::Rolling).unwrap();
        assert_eq!(pipeline.predict(&df).unwrap().len(), 14);
    }
}
