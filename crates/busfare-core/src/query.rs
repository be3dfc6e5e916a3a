//! Search query and travel date types.
//!
//! Every target site renders its calendar differently (localized month
//! label, numeric `data-month` attribute, or both), so the date is parsed
//! once here into day / month-name / month-number / year components and
//! each scraper picks the representation its UI needs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical English month names, index 0 = January.
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Errors from parsing the fixed `"<day> <MonthName> <year>"` date form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TravelDateError {
    #[error("expected \"<day> <MonthName> <year>\", got \"{0}\"")]
    Malformed(String),

    #[error("unknown month name \"{0}\"")]
    UnknownMonth(String),

    #[error("invalid day \"{0}\"")]
    InvalidDay(String),

    #[error("invalid year \"{0}\"")]
    InvalidYear(String),

    #[error("day {day} is out of range for {month} {year}")]
    DayOutOfRange { day: u32, month: String, year: i32 },
}

/// A travel date parsed from the fixed textual form `"15 February 2026"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TravelDate {
    day: u32,
    month_index: usize,
    year: i32,
}

impl TravelDate {
    /// Parses `"<day> <MonthName> <year>"` (e.g. `"15 February 2026"`).
    ///
    /// # Errors
    ///
    /// Returns [`TravelDateError`] when the text does not have exactly three
    /// whitespace-separated segments, the month name is not a canonical
    /// English month, or the day/year are not in range.
    pub fn parse(text: &str) -> Result<Self, TravelDateError> {
        let parts: Vec<&str> = text.split_whitespace().collect();
        let [day_text, month_text, year_text] = parts.as_slice() else {
            return Err(TravelDateError::Malformed(text.to_owned()));
        };

        let day: u32 = day_text
            .parse()
            .map_err(|_| TravelDateError::InvalidDay((*day_text).to_owned()))?;
        let year: i32 = year_text
            .parse()
            .map_err(|_| TravelDateError::InvalidYear((*year_text).to_owned()))?;
        let month_index = MONTH_NAMES
            .iter()
            .position(|m| m.eq_ignore_ascii_case(month_text))
            .ok_or_else(|| TravelDateError::UnknownMonth((*month_text).to_owned()))?;

        if day == 0 || day > days_in_month(month_index, year) {
            return Err(TravelDateError::DayOutOfRange {
                day,
                month: MONTH_NAMES[month_index].to_owned(),
                year,
            });
        }
        if !(2000..=2100).contains(&year) {
            return Err(TravelDateError::InvalidYear((*year_text).to_owned()));
        }

        Ok(Self {
            day,
            month_index,
            year,
        })
    }

    #[must_use]
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Canonical capitalized English month name (`"February"`).
    #[must_use]
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[self.month_index]
    }

    /// 1-based month number as used by `data-month` calendar attributes.
    #[must_use]
    pub fn month_number(&self) -> u32 {
        u32::try_from(self.month_index).unwrap_or(0) + 1
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Calendar-header label for the target month (`"February 2026"`).
    #[must_use]
    pub fn month_year_label(&self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }
}

impl std::fmt::Display for TravelDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.day, self.month_name(), self.year)
    }
}

impl TryFrom<String> for TravelDate {
    type Error = TravelDateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TravelDate> for String {
    fn from(date: TravelDate) -> Self {
        date.to_string()
    }
}

fn days_in_month(month_index: usize, year: i32) -> u32 {
    match month_index {
        0 | 2 | 4 | 6 | 7 | 9 | 11 => 31,
        3 | 5 | 8 | 10 => 30,
        1 => {
            if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// One fare search. Immutable once dispatched; each scraper task gets a
/// clone and no task may re-dispatch with a modified query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub origin: String,
    pub destination: String,
    pub travel_date: TravelDate,
}

impl SearchQuery {
    /// # Errors
    ///
    /// Returns [`TravelDateError`] when `travel_date` is not in the fixed
    /// `"<day> <MonthName> <year>"` form.
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        travel_date: &str,
    ) -> Result<Self, TravelDateError> {
        Ok(Self {
            origin: origin.into(),
            destination: destination.into(),
            travel_date: TravelDate::parse(travel_date)?,
        })
    }
}
