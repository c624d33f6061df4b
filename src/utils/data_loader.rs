//! Data loading utilities
//!
//! Reads a daily load series from CSV, derives calendar features and
//! partitions it into a training period and a held-out test period.

use crate::error::{ForecastError, Result};
use crate::timeseries::CalendarFeatures;
use chrono::{Datelike, NaiveDate};
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Loader settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Column holding the observation date
    pub date_column: String,
    /// Column holding the value to forecast
    pub target_column: String,
    /// chrono format of the date column
    pub date_format: String,
    /// Training rows are strictly before this year
    pub cutoff_year: i32,
    /// Test rows are strictly between the cutoff year and this year
    pub ignore_year: i32,
    /// Calendar features appended to the remaining columns
    pub calendar: CalendarFeatures,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            date_column: "date".to_string(),
            target_column: "load".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            cutoff_year: 2019,
            ignore_year: 2022,
            calendar: CalendarFeatures::default(),
        }
    }
}

impl LoaderConfig {
    pub fn with_target_column(mut self, name: impl Into<String>) -> Self {
        self.target_column = name.into();
        self
    }

    pub fn with_date_column(mut self, name: impl Into<String>) -> Self {
        self.date_column = name.into();
        self
    }

    pub fn with_cutoff_year(mut self, year: i32) -> Self {
        self.cutoff_year = year;
        self
    }

    pub fn with_ignore_year(mut self, year: i32) -> Self {
        self.ignore_year = year;
        self
    }

    pub fn with_calendar(mut self, calendar: CalendarFeatures) -> Self {
        self.calendar = calendar;
        self
    }
}

/// Feature frame, target and dates, row-aligned and sorted by date
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub features: DataFrame,
    pub target: Array1<f64>,
    pub dates: Vec<NaiveDate>,
}

/// Training and held-out test partitions
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub data_train: DataFrame,
    pub data_test: DataFrame,
    pub target_train: Array1<f64>,
    pub target_test: Array1<f64>,
    pub dates_train: Vec<NaiveDate>,
    pub dates_test: Vec<NaiveDate>,
}

/// Data loader for daily load series
#[derive(Debug, Clone, Default)]
pub struct DataLoader {
    config: LoaderConfig,
}

impl DataLoader {
    /// Create a new data loader
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let start = Instant::now();

        let file = File::open(path)
            .map_err(|e| ForecastError::DataError(format!("Cannot open {}: {}", path.display(), e)))?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(100))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| ForecastError::DataError(e.to_string()))?;

        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            elapsed_secs = start.elapsed().as_secs_f64(),
            "Loaded CSV"
        );
        Ok(df)
    }

    /// Parse dates, extract the target and derive calendar features
    pub fn prepare(&self, raw: &DataFrame) -> Result<PreparedData> {
        let LoaderConfig {
            date_column,
            target_column,
            ..
        } = &self.config;

        let dates = self.parse_dates(raw)?;
        let target = Self::extract_target(raw, target_column)?;

        let mut columns: Vec<Column> = raw
            .get_columns()
            .iter()
            .filter(|c| c.name().as_str() != date_column.as_str() && c.name().as_str() != target_column.as_str())
            .cloned()
            .collect();
        columns.extend(self.config.calendar.columns(&dates));

        if columns.is_empty() {
            return Err(ForecastError::DataError(
                "No feature columns left after removing date and target".to_string(),
            ));
        }

        let features = DataFrame::new(columns)?;
        debug!(features = ?features.get_column_names(), "Prepared feature frame");

        Ok(PreparedData {
            features,
            target,
            dates,
        })
    }

    fn parse_dates(&self, raw: &DataFrame) -> Result<Vec<NaiveDate>> {
        let name = &self.config.date_column;
        let column = raw
            .column(name)
            .map_err(|_| ForecastError::FeatureNotFound(name.clone()))?
            .cast(&DataType::String)?;

        let dates = column
            .as_materialized_series()
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                let value = value.ok_or_else(|| {
                    ForecastError::DataError(format!("Missing date at row {}", row))
                })?;
                NaiveDate::parse_from_str(value.trim(), &self.config.date_format).map_err(|e| {
                    ForecastError::DataError(format!("Invalid date '{}' at row {}: {}", value, row, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(row) = dates.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ForecastError::DataError(format!(
                "Dates must be strictly ascending: {} is followed by {} at row {}",
                dates[row],
                dates[row + 1],
                row + 1
            )));
        }

        Ok(dates)
    }

    fn extract_target(raw: &DataFrame, name: &str) -> Result<Array1<f64>> {
        let column = raw
            .column(name)
            .map_err(|_| ForecastError::FeatureNotFound(name.to_string()))?
            .cast(&DataType::Float64)?;

        column
            .as_materialized_series()
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.ok_or_else(|| ForecastError::DataError(format!("Missing target at row {}", row)))
            })
            .collect()
    }

    /// Partition into pre-cutoff training rows and cutoff-to-ignore test rows
    pub fn train_test_split(&self, prepared: &PreparedData) -> Result<TrainTestSplit> {
        let cutoff = self.config.cutoff_year;
        let ignore = self.config.ignore_year;
        if cutoff >= ignore {
            return Err(ForecastError::ConfigError(format!(
                "cutoff year ({}) must be before ignore year ({})",
                cutoff, ignore
            )));
        }

        // Dates are sorted, so both partitions are contiguous
        let dates = &prepared.dates;
        let train_end = dates.partition_point(|d| d.year() < cutoff);
        let test_start = dates.partition_point(|d| d.year() <= cutoff);
        let test_end = dates.partition_point(|d| d.year() < ignore);

        if train_end == 0 {
            return Err(ForecastError::DataError(format!(
                "No training rows before {}",
                cutoff
            )));
        }
        if test_end <= test_start {
            return Err(ForecastError::DataError(format!(
                "No test rows between {} and {}",
                cutoff, ignore
            )));
        }

        let test_len = test_end - test_start;
        let split = TrainTestSplit {
            data_train: prepared.features.slice(0, train_end),
            data_test: prepared.features.slice(test_start as i64, test_len),
            target_train: prepared.target.slice(ndarray::s![..train_end]).to_owned(),
            target_test: prepared.target.slice(ndarray::s![test_start..test_end]).to_owned(),
            dates_train: dates[..train_end].to_vec(),
            dates_test: dates[test_start..test_end].to_vec(),
        };

        info!(
            train_rows = train_end,
            test_rows = test_len,
            cutoff_year = cutoff,
            ignore_year = ignore,
            "Split data"
        );
        Ok(split)
    }

    /// Load, prepare and split in one go
    pub fn load(&self, path: impl AsRef<Path>) -> Result<TrainTestSplit> {
        let raw = self.load_csv(path)?;
        let prepared = self.prepare(&raw)?;
        self.train_test_split(&prepared)
    }
}
