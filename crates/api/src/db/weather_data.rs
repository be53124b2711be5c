use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{format_description::BorrowedFormatItem, macros::format_description, Date};
use utoipa::ToSchema;
use weather_core::{
    db, Observation, ObservationFilter, Page, StatisticFilter, WeatherStore, YearlyStatistic,
};

/// ISO-8601 calendar date, the only date shape the API reads or writes
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Raw observations are stored in tenths of a unit
const TENTHS: f64 = 10.0;

pub struct WeatherAccess {
    store: Arc<dyn WeatherStore>,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to query weather store: {0}")]
    Store(#[from] db::Error),
    #[error("Failed to format date: {0}")]
    TimeFormat(#[from] time::error::Format),
}

#[async_trait]
pub trait WeatherData: Sync + Send {
    /// Observations matching `filter`, converted to degrees C and mm
    async fn observations(
        &self,
        filter: &ObservationFilter,
        page: Page,
    ) -> Result<Vec<ObservationRecord>, Error>;
    async fn statistics(
        &self,
        filter: &StatisticFilter,
        page: Page,
    ) -> Result<Vec<StatisticRecord>, Error>;
}

impl WeatherAccess {
    pub fn new(store: Arc<dyn WeatherStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl WeatherData for WeatherAccess {
    async fn observations(
        &self,
        filter: &ObservationFilter,
        page: Page,
    ) -> Result<Vec<ObservationRecord>, Error> {
        let rows = self.store.query_observations(filter, page).await?;
        rows.into_iter().map(ObservationRecord::try_from).collect()
    }

    async fn statistics(
        &self,
        filter: &StatisticFilter,
        page: Page,
    ) -> Result<Vec<StatisticRecord>, Error> {
        let rows = self.store.query_statistics(filter, page).await?;
        Ok(rows.into_iter().map(StatisticRecord::from).collect())
    }
}

pub fn parse_date(value: &str) -> Result<Date, time::error::Parse> {
    Date::parse(value, DATE_FORMAT)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct ObservationRecord {
    pub station_id: String,
    /// YYYY-MM-DD
    pub date: String,
    /// Degrees Celsius
    pub max_temp: Option<f64>,
    /// Degrees Celsius
    pub min_temp: Option<f64>,
    /// Millimeters
    pub precipitation: Option<f64>,
}

fn from_tenths(value: Option<i32>) -> Option<f64> {
    value.map(|v| f64::from(v) / TENTHS)
}

impl TryFrom<Observation> for ObservationRecord {
    type Error = Error;

    fn try_from(row: Observation) -> Result<Self, Self::Error> {
        Ok(Self {
            date: row.date.format(DATE_FORMAT)?,
            station_id: row.station_id,
            max_temp: from_tenths(row.max_temp),
            min_temp: from_tenths(row.min_temp),
            precipitation: from_tenths(row.precipitation),
        })
    }
}

/// Yearly aggregate, already in final units
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct StatisticRecord {
    pub station_id: String,
    pub year: i32,
    /// Degrees Celsius
    pub avg_max_temp: Option<f64>,
    /// Degrees Celsius
    pub avg_min_temp: Option<f64>,
    /// Centimeters
    pub total_precipitation: Option<f64>,
}

impl From<YearlyStatistic> for StatisticRecord {
    fn from(row: YearlyStatistic) -> Self {
        Self {
            station_id: row.station_id,
            year: row.year,
            avg_max_temp: row.avg_max_temp,
            avg_min_temp: row.avg_min_temp,
            total_precipitation: row.total_precipitation,
        }
    }
}
