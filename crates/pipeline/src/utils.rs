use clap::Parser;
use slog::{o, Drain, Level, Logger};
use std::env;
use tokio::signal;
use weather_core::{
    find_config_file, load_config, ConfigSource, DEFAULT_BATCH_SIZE, DEFAULT_DATABASE_URL,
};

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "Weather pipeline - ingests station files and recomputes yearly statistics"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $WEATHER_PIPELINE_CONFIG, ./pipeline.toml,
    /// $XDG_CONFIG_HOME/weather-analytics/pipeline.toml, /etc/weather-analytics/pipeline.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "WEATHER_PIPELINE_LEVEL")]
    pub level: Option<String>,

    /// Database connection string, e.g. sqlite://weather.db
    #[arg(short = 'u', long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Directory holding one raw file per station (ingest only)
    #[arg(short, long, env = "WEATHER_PIPELINE_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Extension of station files to pick up (ingest only)
    #[arg(short, long, env = "WEATHER_PIPELINE_EXTENSION")]
    pub extension: Option<String>,

    /// Rows per multi-row INSERT statement
    #[arg(short, long, env = "WEATHER_PIPELINE_BATCH_SIZE")]
    pub batch_size: Option<usize>,
}

impl Cli {
    /// Get the effective configuration value with defaults
    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
    }

    pub fn data_dir(&self) -> String {
        self.data_dir
            .clone()
            .unwrap_or_else(|| "./wx_data".to_string())
    }

    pub fn extension(&self) -> String {
        self.extension
            .clone()
            .unwrap_or_else(|| ".txt".to_string())
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    /// Fill every unset field from `fallback`
    fn or(self, fallback: Cli) -> Cli {
        Cli {
            config: self.config,
            level: self.level.or(fallback.level),
            database_url: self.database_url.or(fallback.database_url),
            data_dir: self.data_dir.or(fallback.data_dir),
            extension: self.extension.or(fallback.extension),
            batch_size: self.batch_size.or(fallback.batch_size),
        }
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    let cli_args = Cli::parse();

    let source = match cli_args.config {
        Some(ref path) => ConfigSource::Explicit(path.into()),
        None => find_config_file("WEATHER_PIPELINE_CONFIG", "pipeline.toml"),
    };

    // A broken config file falls back to flags, env and defaults
    let file_config: Cli = load_config(&source).unwrap_or_default();

    // CLI args override file config (env vars are handled by clap)
    cli_args.or(file_config)
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "warn" | "warning" => Level::Warning,
        "error" => Level::Error,
        _ => Level::Info,
    }
}

/// Build the root logger handed to every pipeline component
pub fn setup_logger(cli: &Cli) -> Logger {
    let level = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .map(|l| parse_level(&l))
        .unwrap_or(Level::Info);

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(level).fuse();
    slog::Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

/// Resolves on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never resolves, so the job runs to
/// completion instead of treating the failure as an interrupt.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
