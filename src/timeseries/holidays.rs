//! National holiday calendars

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Holiday calendar made of fixed-date holidays plus Easter-relative ones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolidayCalendar {
    /// Calendar name (ISO country code)
    pub country: String,
    /// Fixed (month, day) holidays
    pub fixed: Vec<(u32, u32)>,
    /// Offsets in days from Easter Sunday (0 = Easter Sunday, 1 = Easter Monday)
    pub easter_offsets: Vec<i64>,
}

impl HolidayCalendar {
    /// Italian national holidays
    pub fn italy() -> Self {
        Self {
            country: "IT".to_string(),
            fixed: vec![
                (1, 1),   // Capodanno
                (1, 6),   // Epifania
                (4, 25),  // Festa della Liberazione
                (5, 1),   // Festa dei Lavoratori
                (6, 2),   // Festa della Repubblica
                (8, 15),  // Ferragosto
                (11, 1),  // Ognissanti
                (12, 8),  // Immacolata Concezione
                (12, 25), // Natale
                (12, 26), // Santo Stefano
            ],
            easter_offsets: vec![0, 1],
        }
    }

    /// Whether `date` is a holiday in this calendar
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        if self.fixed.contains(&(date.month(), date.day())) {
            return true;
        }

        easter_sunday(date.year()).map_or(false, |easter| {
            self.easter_offsets
                .iter()
                .any(|&offset| easter + Duration::days(offset) == date)
        })
    }
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::italy()
    }
}

/// Easter Sunday for a Gregorian year (anonymous Gregorian algorithm)
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}
