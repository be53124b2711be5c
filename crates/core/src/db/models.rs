use serde::{Deserialize, Serialize};
use time::Date;

/// Rows per page when the caller does not ask for a size
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// One station's one-day record, exactly as stored
///
/// Temperatures are tenths of a degree Celsius, precipitation is tenths of a
/// millimeter. `None` means the raw file had no measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Observation {
    pub station_id: String,
    pub date: Date,
    pub max_temp: Option<i32>,
    pub min_temp: Option<i32>,
    pub precipitation: Option<i32>,
}

/// One station's one-year summary, already in final units
///
/// Temperatures are degrees Celsius, precipitation is centimeters. A value is
/// `None` when every observation feeding it was missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct YearlyStatistic {
    pub station_id: String,
    pub year: i32,
    pub avg_max_temp: Option<f64>,
    pub avg_min_temp: Option<f64>,
    pub total_precipitation: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationFilter {
    pub station_id: Option<String>,
    pub date: Option<Date>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatisticFilter {
    pub station_id: Option<String>,
    pub year: Option<i32>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PageError {
    #[error("page must be a positive integer, got {0}")]
    Number(u32),
    #[error("per_page must be a positive integer, got {0}")]
    Size(u32),
}

/// A 1-indexed page of `size` rows
///
/// Page `n` covers rows `[(n - 1) * size, n * size)` of an ordered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u32,
    size: u32,
}

impl Page {
    pub fn new(number: u32, size: u32) -> Result<Self, PageError> {
        if number == 0 {
            return Err(PageError::Number(number));
        }
        if size == 0 {
            return Err(PageError::Size(size));
        }
        Ok(Self { number, size })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.number) - 1).saturating_mul(i64::from(self.size))
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}
