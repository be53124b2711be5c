mod models;
mod sqlite;

pub use models::*;
pub use sqlite::Database;

use async_trait::async_trait;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to query database: {0}")]
    Query(#[from] sqlx::Error),
    #[error("Failed to run database migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl Error {
    /// True when the statement hit a primary key or unique constraint
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Error::Query(sqlx::Error::Database(e)) if e.is_unique_violation())
    }
}

/// Repository over the observations and statistics tables
///
/// Every call is one unit of work: it acquires a pooled connection (or a
/// transaction for writes) and releases it before returning, on success and
/// on error alike.
#[async_trait]
pub trait WeatherStore: Send + Sync {
    /// Append observations in one transaction using multi-row inserts.
    /// Either every row is written or none is.
    async fn insert_batch(&self, rows: &[Observation]) -> Result<u64, Error>;

    /// Observations matching `filter`, ordered by (station_id, date)
    async fn query_observations(
        &self,
        filter: &ObservationFilter,
        page: Page,
    ) -> Result<Vec<Observation>, Error>;

    /// Statistics matching `filter`, ordered by (station_id, year)
    async fn query_statistics(
        &self,
        filter: &StatisticFilter,
        page: Page,
    ) -> Result<Vec<YearlyStatistic>, Error>;

    /// Aggregate every (station, year) in the observations table
    async fn yearly_statistics(&self) -> Result<Vec<YearlyStatistic>, Error>;

    /// Discard the statistics table and replace it with `rows`
    async fn replace_statistics(&self, rows: &[YearlyStatistic]) -> Result<u64, Error>;
}
