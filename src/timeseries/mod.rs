//! Time series module
//!
//! Provides the temporal pieces of the forecasting pipeline:
//! - Walk-forward cross-validation (rolling and expanding windows)
//! - Calendar features
//! - Holiday calendars

mod features;
mod holidays;
mod validation;

pub use features::CalendarFeatures;
pub use holidays::{easter_sunday, HolidayCalendar};
pub use validation::{SplitConfig, TimeSeriesSplit, WalkForwardCV, WindowStrategy};
