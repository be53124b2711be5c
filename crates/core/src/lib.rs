//! Weather Analytics Core Library
//!
//! Shared pieces for the API server and the batch pipeline:
//! - The relational store (schema, migrations, repository trait, SQLite implementation)
//! - Configuration file discovery (XDG-compliant)
//! - File system utilities

mod config;
pub mod db;
pub mod fs;

pub use config::{find_config_file, load_config, ConfigSource};
pub use db::{
    Database, Observation, ObservationFilter, Page, PageError, StatisticFilter, WeatherStore,
    YearlyStatistic, DEFAULT_PAGE_SIZE,
};
pub use fs::{is_directory, list_files_with_extension, normalize_extension};

/// Application name used for XDG paths
pub const APP_NAME: &str = "weather-analytics";

/// Default API port
pub const DEFAULT_API_PORT: u16 = 5000;

/// Default database connection string
pub const DEFAULT_DATABASE_URL: &str = "sqlite://weather.db";

/// Default number of rows per multi-row INSERT statement
pub const DEFAULT_BATCH_SIZE: usize = 1000;
