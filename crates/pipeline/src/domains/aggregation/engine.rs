use slog::{error, info, warn, Logger};
use std::sync::Arc;
use weather_core::{db::Error, WeatherStore, YearlyStatistic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationReport {
    /// No observations, the statistics table was left untouched
    NoData,
    /// Statistics table rebuilt with this many rows
    Replaced { rows: u64 },
}

pub struct StatisticsEngine {
    logger: Logger,
    store: Arc<dyn WeatherStore>,
}

impl StatisticsEngine {
    pub fn new(logger: Logger, store: Arc<dyn WeatherStore>) -> Self {
        Self { logger, store }
    }

    /// One row per (station, year) over all observations
    pub async fn fetch(&self) -> Result<Vec<YearlyStatistic>, Error> {
        info!(self.logger, "Retrieving station measurements");
        let stats = self.store.yearly_statistics().await.map_err(|e| {
            error!(self.logger, "Data retrieval failed: {}", e);
            e
        })?;
        info!(self.logger, "Computed {} station-year aggregates", stats.len());
        Ok(stats)
    }

    /// Replace the statistics table with `stats`; an empty slice writes nothing
    pub async fn save(&self, stats: &[YearlyStatistic]) -> Result<u64, Error> {
        if stats.is_empty() {
            warn!(self.logger, "No statistics available for storage");
            return Ok(0);
        }

        info!(self.logger, "Storing {} statistical records", stats.len());
        let rows = self.store.replace_statistics(stats).await.map_err(|e| {
            error!(self.logger, "Storage operation failed: {}", e);
            e
        })?;
        info!(self.logger, "Statistics committed: {} rows", rows);
        Ok(rows)
    }

    pub async fn run(&self) -> Result<AggregationReport, Error> {
        info!(self.logger, "Initiating weather analysis");

        let stats = self.fetch().await?;
        if stats.is_empty() {
            warn!(self.logger, "No observational data available");
            return Ok(AggregationReport::NoData);
        }

        let rows = self.save(&stats).await?;
        info!(self.logger, "Analysis process completed");
        Ok(AggregationReport::Replaced { rows })
    }
}
