use async_trait::async_trait;
use log::{debug, info};
use sqlx::{
    sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Encode, QueryBuilder, Type,
};
use std::{str::FromStr, time::Duration};

use super::{
    Error, Observation, ObservationFilter, Page, StatisticFilter, WeatherStore, YearlyStatistic,
};
use crate::DEFAULT_BATCH_SIZE;

/// SQLite's default SQLITE_MAX_VARIABLE_NUMBER since 3.32
const MAX_BIND_PARAMS: usize = 32_766;
const OBSERVATION_COLUMNS: usize = 5;
const STATISTIC_COLUMNS: usize = 5;

/// Must match `weather_stats` in migrations/20240601000000_weather_tables.sql
const CREATE_STATS_TABLE: &str = "CREATE TABLE weather_stats (
        station_id TEXT NOT NULL,
        year INTEGER NOT NULL,
        avg_max_temp REAL,
        avg_min_temp REAL,
        total_precipitation REAL,
        PRIMARY KEY (station_id, year)
    )";

const YEARLY_STATISTICS: &str = "SELECT
        station_id,
        CAST(strftime('%Y', date) AS INTEGER) AS year,
        AVG(max_temp) / 10.0 AS avg_max_temp,
        AVG(min_temp) / 10.0 AS avg_min_temp,
        SUM(precipitation) / 100.0 AS total_precipitation
    FROM weather_data
    GROUP BY station_id, year
    ORDER BY station_id, year";

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    batch_size: usize,
}

impl Database {
    /// Open (creating if missing) the database at `database_url` and migrate it
    pub async fn connect(database_url: &str) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .pragma("journal_mode", "WAL")
            .pragma("synchronous", "NORMAL")
            .pragma("busy_timeout", "5000")
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        let db = Self::from_pool(pool).await?;
        info!("SQLite database initialized at: {}", database_url);
        Ok(db)
    }

    /// Single-connection in-memory database, mostly useful in tests
    ///
    /// The connection is never recycled, otherwise the data would vanish with it.
    pub async fn in_memory() -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self, Error> {
        let db = Self {
            pool,
            batch_size: DEFAULT_BATCH_SIZE,
        };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Rows per multi-row INSERT statement, clamped to SQLite's bind limit
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        let max_rows = MAX_BIND_PARAMS / OBSERVATION_COLUMNS.max(STATISTIC_COLUMNS);
        self.batch_size = batch_size.clamp(1, max_rows);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn push_filter<'args, T>(
    builder: &mut QueryBuilder<'args, Sqlite>,
    clauses: &mut usize,
    column: &'static str,
    value: T,
) where
    T: 'args + Encode<'args, Sqlite> + Type<Sqlite> + Send,
{
    builder.push(if *clauses == 0 { " WHERE " } else { " AND " });
    builder.push(column).push(" = ").push_bind(value);
    *clauses += 1;
}

fn push_page(builder: &mut QueryBuilder<'_, Sqlite>, page: Page) {
    builder
        .push(" LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
}

#[async_trait]
impl WeatherStore for Database {
    async fn insert_batch(&self, rows: &[Observation]) -> Result<u64, Error> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for chunk in rows.chunks(self.batch_size) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT INTO weather_data (station_id, date, max_temp, min_temp, precipitation) ",
            );
            builder.push_values(chunk, |mut b, row| {
                b.push_bind(row.station_id.clone())
                    .push_bind(row.date)
                    .push_bind(row.max_temp)
                    .push_bind(row.min_temp)
                    .push_bind(row.precipitation);
            });
            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        // Dropping `tx` on an early return above rolls the whole batch back
        tx.commit().await?;
        debug!("inserted {} observations", inserted);
        Ok(inserted)
    }

    async fn query_observations(
        &self,
        filter: &ObservationFilter,
        page: Page,
    ) -> Result<Vec<Observation>, Error> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT station_id, date, max_temp, min_temp, precipitation FROM weather_data",
        );
        let mut clauses = 0;

        if let Some(station_id) = &filter.station_id {
            push_filter(&mut builder, &mut clauses, "station_id", station_id.clone());
        }
        if let Some(date) = filter.date {
            push_filter(&mut builder, &mut clauses, "date", date);
        }

        builder.push(" ORDER BY station_id, date");
        push_page(&mut builder, page);

        let rows = builder
            .build_query_as::<Observation>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn query_statistics(
        &self,
        filter: &StatisticFilter,
        page: Page,
    ) -> Result<Vec<YearlyStatistic>, Error> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT station_id, year, avg_max_temp, avg_min_temp, total_precipitation
             FROM weather_stats",
        );
        let mut clauses = 0;

        if let Some(station_id) = &filter.station_id {
            push_filter(&mut builder, &mut clauses, "station_id", station_id.clone());
        }
        if let Some(year) = filter.year {
            push_filter(&mut builder, &mut clauses, "year", year);
        }

        builder.push(" ORDER BY station_id, year");
        push_page(&mut builder, page);

        let rows = builder
            .build_query_as::<YearlyStatistic>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn yearly_statistics(&self) -> Result<Vec<YearlyStatistic>, Error> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, YearlyStatistic>(YEARLY_STATISTICS)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows)
    }

    async fn replace_statistics(&self, rows: &[YearlyStatistic]) -> Result<u64, Error> {
        // Readers keep seeing the previous table until commit
        let mut tx = self.pool.begin().await?;

        sqlx::query("DROP TABLE IF EXISTS weather_stats")
            .execute(&mut *tx)
            .await?;
        sqlx::query(CREATE_STATS_TABLE).execute(&mut *tx).await?;

        let mut inserted = 0;
        for chunk in rows.chunks(self.batch_size) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT INTO weather_stats
                 (station_id, year, avg_max_temp, avg_min_temp, total_precipitation) ",
            );
            builder.push_values(chunk, |mut b, row| {
                b.push_bind(row.station_id.clone())
                    .push_bind(row.year)
                    .push_bind(row.avg_max_temp)
                    .push_bind(row.avg_min_temp)
                    .push_bind(row.total_precipitation);
            });
            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
