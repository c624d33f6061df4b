//! Calendar feature engineering
//!
//! Derives year, month, weekday and holiday columns from observation dates.
//! Month and weekday are emitted as string columns so the pipeline treats
//! them as categorical.

use super::holidays::HolidayCalendar;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// Configuration for calendar features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarFeatures {
    /// Include year (numeric)
    pub year: bool,
    /// Include month (categorical)
    pub month: bool,
    /// Include day of week (categorical)
    pub weekday: bool,
    /// Include a 0/1 holiday flag from this calendar
    pub holidays: Option<HolidayCalendar>,
}

impl Default for CalendarFeatures {
    fn default() -> Self {
        Self {
            year: true,
            month: true,
            weekday: true,
            holidays: Some(HolidayCalendar::italy()),
        }
    }
}

impl CalendarFeatures {
    /// Names of the columns `append_to` adds, in order
    pub fn feature_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.year {
            names.push("year");
        }
        if self.month {
            names.push("month");
        }
        if self.weekday {
            names.push("weekday");
        }
        if self.holidays.is_some() {
            names.push("holiday");
        }
        names
    }

    /// Calendar columns for `dates`, in `feature_names` order
    pub fn columns(&self, dates: &[NaiveDate]) -> Vec<Column> {
        let mut columns = Vec::new();

        if self.year {
            let years: Vec<f64> = dates.iter().map(|d| d.year() as f64).collect();
            columns.push(Column::new("year".into(), years));
        }

        if self.month {
            let months: Vec<&str> = dates.iter().map(|d| MONTHS[d.month0() as usize]).collect();
            columns.push(Column::new("month".into(), months));
        }

        if self.weekday {
            let weekdays: Vec<&str> = dates
                .iter()
                .map(|d| WEEKDAYS[d.weekday().num_days_from_monday() as usize])
                .collect();
            columns.push(Column::new("weekday".into(), weekdays));
        }

        if let Some(calendar) = &self.holidays {
            let flags: Vec<f64> = dates
                .iter()
                .map(|&d| if calendar.is_holiday(d) { 1.0 } else { 0.0 })
                .collect();
            columns.push(Column::new("holiday".into(), flags));
        }

        columns
    }

    /// Append calendar columns to `df`, one date per row
    pub fn append_to(&self, df: &mut DataFrame, dates: &[NaiveDate]) -> Result<()> {
        if df.height() != dates.len() {
            return Err(ForecastError::ShapeError {
                expected: format!("{} dates", df.height()),
                actual: format!("{} dates", dates.len()),
            });
        }

        for column in self.columns(dates) {
            df.with_column(column)?;
        }
        Ok(())
    }
}
