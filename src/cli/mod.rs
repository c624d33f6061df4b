//! Powerload CLI Module
//!
//! Command-line entry point: load → split → fit → validate → predict → report.

use clap::Parser;
use colored::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::export::{ArtifactStore, FileStore, LoggingStore};
use crate::pipeline::{ForecastingPipeline, PipelineConfig};
use crate::timeseries::WindowStrategy;
use crate::training::{
    mean_absolute_error, mean_absolute_percentage_error, CVSummary, GradientBoostingConfig, GradientBoostingRegressor,
};
use crate::utils::{DataLoader, LoaderConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white().bold());
}

/// Format a value as a whole number with thousands separators
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    if rounded < 0.0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// Format a fraction as a percentage with one decimal
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "powerload")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Daily power load forecasting with temporal cross-validation")]
#[command(long_about = None)]
pub struct Cli {
    /// Input CSV with a date column and a load column
    #[arg(short, long)]
    pub data: PathBuf,

    /// Training window for cross-validation, in days
    #[arg(long, default_value_t = 3650)]
    pub training_window: usize,

    /// Forecasting horizon for cross-validation, in days
    #[arg(long, default_value_t = 365)]
    pub forecasting_horizon: usize,

    /// Validation strategy (rolling, expanding)
    #[arg(long, default_value = "rolling")]
    pub validation_strategy: String,

    /// Training data ends before this year
    #[arg(long)]
    pub cutoff: Option<i32>,

    /// Test data ends before this year
    #[arg(long)]
    pub ignore: Option<i32>,

    /// Directory receiving model, residuals, scores and predictions
    #[arg(long)]
    pub artifact_dir: Option<PathBuf>,

    /// JSON run configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Full run configuration, loadable from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub loader: LoaderConfig,
    pub pipeline: PipelineConfig,
    pub model: GradientBoostingConfig,
}

impl RunConfig {
    /// Read a JSON configuration file; missing sections take their defaults
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(cutoff) = cli.cutoff {
            self.loader.cutoff_year = cutoff;
        }
        if let Some(ignore) = cli.ignore {
            self.loader.ignore_year = ignore;
        }
        self
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

/// Metrics of a completed run
///
/// Only produced once prediction on the test period has succeeded.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub cv: CVSummary,
    pub n_predictions: usize,
    pub mae: f64,
    pub mape: f64,
}

impl RunReport {
    fn print(&self) {
        section("Cross-validation");
        kv("Folds", &self.cv.n_folds.to_string());
        if let Some(mae) = self.cv.mae() {
            kv("CV MAE", &format!("{} ± {}", format_thousands(mae.mean), format_thousands(mae.std)));
        }
        if let Some(mape) = self.cv.mape() {
            kv("CV MAPE", &format!("{} ± {}", format_percent(mape.mean), format_percent(mape.std)));
        }

        section("Test results");
        kv("MAE", &format!("{} GWh", format_thousands(self.mae)));
        kv("MAPE", &format_percent(self.mape));
        println!();
    }
}

/// Load, fit, cross-validate and predict without reporting any metric
pub fn run_forecast(cli: &Cli) -> anyhow::Result<RunReport> {
    let strategy: WindowStrategy = cli.validation_strategy.parse()?;
    let config = match &cli.config {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    }
    .with_overrides(cli);

    step_run("Loading data");
    let start = Instant::now();
    let loader = DataLoader::new(config.loader.clone());
    let split = loader.load(&cli.data)?;
    step_done(&format!(
        "{} train / {} test rows in {:?}",
        split.data_train.height(),
        split.data_test.height(),
        start.elapsed()
    ));

    let store: Arc<dyn ArtifactStore> = match &cli.artifact_dir {
        Some(dir) => Arc::new(FileStore::new(dir)),
        None => Arc::new(LoggingStore),
    };

    let mut pipeline = ForecastingPipeline::with_regressor(
        split.data_train,
        split.target_train,
        GradientBoostingRegressor::new(config.model),
    )?
    .with_config(config.pipeline)
    .with_store(store);

    step_run("Fitting model");
    let start = Instant::now();
    pipeline.fit()?;
    step_done(&format!("{:?}", start.elapsed()));

    step_run(&format!("Cross-validating ({} window)", strategy.to_string().cyan()));
    let start = Instant::now();
    let cv = pipeline.validate(cli.training_window, cli.forecasting_horizon, strategy)?;
    step_done(&format!("{} folds in {:?}", cv.n_folds, start.elapsed()));

    step_run("Predicting test period");
    let predictions = pipeline.predict(&split.data_test)?;
    step_done(&format!("{} days", predictions.len()));

    Ok(RunReport {
        cv,
        n_predictions: predictions.len(),
        mae: mean_absolute_error(&split.target_test, &predictions)?,
        mape: mean_absolute_percentage_error(&split.target_test, &predictions)?,
    })
}

pub fn cmd_run(cli: &Cli) -> anyhow::Result<()> {
    section("Forecast");
    let report = run_forecast(cli)?;
    report.print();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForecastError;
    use chrono::{Datelike, Duration, NaiveDate};
    use std::ffi::OsString;
    use std::fmt::Write as _;
    use tempfile::tempdir;

    /// Daily load from 2016 through 2021 with a zone column; `late_zone` is
    /// the zone reported from 2020 on
    fn write_zoned_csv(path: &Path, late_zone: &str) {
        let mut csv = String::from("date,zone,load\n");
        let mut day = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();
        while day <= end {
            let zone = if day.year() >= 2020 {
                late_zone
            } else if day.day() % 2 == 0 {
                "north"
            } else {
                "south"
            };
            let load = 900.0 + 20.0 * day.weekday().num_days_from_monday() as f64;
            writeln!(csv, "{},{},{:.1}", day.format("%Y-%m-%d"), zone, load).unwrap();
            day += Duration::days(1);
        }
        std::fs::write(path, csv).unwrap();
    }

    fn small_run_cli(data: &Path, config: &Path) -> Cli {
        std::fs::write(config, r#"{"model": {"n_estimators": 10, "min_samples_leaf": 5}}"#).unwrap();
        let args: Vec<OsString> = vec![
            "powerload".into(),
            "--data".into(),
            data.as_os_str().to_owned(),
            "--training-window".into(),
            "365".into(),
            "--forecasting-horizon".into(),
            "180".into(),
            "--config".into(),
            config.as_os_str().to_owned(),
        ];
        Cli::parse_from(args)
    }

    #[test]
    fn test_run_produces_report_after_prediction() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("load.csv");
        write_zoned_csv(&data, "north");

        let report = run_forecast(&small_run_cli(&data, &dir.path().join("run.json"))).unwrap();

        // 2016..=2018 train rows: (1096 - 365) / 180 = 4 folds
        assert_eq!(report.cv.n_folds, 4);
        assert_eq!(report.n_predictions, 366 + 365);
        assert!(report.mae.is_finite());
        assert!(report.mape.is_finite());
    }

    #[test]
    fn test_failed_prediction_yields_no_report() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("load.csv");
        write_zoned_csv(&data, "islands");

        let err = run_forecast(&small_run_cli(&data, &dir.path().join("run.json"))).unwrap_err();

        match err.downcast_ref::<ForecastError>() {
            Some(ForecastError::InferenceFailed { source }) => {
                assert!(matches!(**source, ForecastError::UnknownCategory { .. }));
            }
            other => panic!("expected InferenceFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.4), "0");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(1234.6), "1,235");
        assert_eq!(format_thousands(1234567.0), "1,234,567");
        assert_eq!(format_thousands(-98765.0), "-98,765");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.0523), "5.2%");
        assert_eq!(format_percent(1.0), "100.0%");
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["powerload", "--data", "load.csv"]);
        assert_eq!(cli.training_window, 3650);
        assert_eq!(cli.forecasting_horizon, 365);
        assert_eq!(cli.validation_strategy, "rolling");

        let config = RunConfig::default().with_overrides(&cli);
        assert_eq!(config.loader.cutoff_year, 2019);
        assert_eq!(config.loader.ignore_year, 2022);
    }

    #[test]
    fn test_overrides_and_partial_config() {
        let cli = Cli::parse_from(["powerload", "--data", "x.csv", "--cutoff", "2018"]);
        let config: RunConfig = serde_json::from_str(r#"{"model": {"n_estimators": 50}}"#).unwrap();
        let config = config.with_overrides(&cli);

        assert_eq!(config.model.n_estimators, 50);
        assert_eq!(config.model.learning_rate, 0.1);
        assert_eq!(config.loader.cutoff_year, 2018);
        assert_eq!(config.pipeline.precision, 3);
    }
}
