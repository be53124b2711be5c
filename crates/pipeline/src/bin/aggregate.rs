use anyhow::Context;
use pipeline::{
    get_config_info, setup_logger, shutdown_signal, AggregationReport, Cli, StatisticsEngine,
};
use slog::{crit, info, o, Logger};
use std::{process::ExitCode, sync::Arc};
use weather_core::Database;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = get_config_info();
    let logger = setup_logger(&cli);

    info!(logger, "Weather aggregation starting...");
    info!(logger, "  Database: {}", cli.database_url());

    let outcome = tokio::select! {
        result = aggregate(&cli, &logger) => result,
        _ = shutdown_signal() => {
            info!(logger, "Processing halted by user");
            return ExitCode::SUCCESS;
        }
    };

    match outcome {
        Ok(AggregationReport::NoData) => {
            info!(logger, "Nothing to aggregate");
            ExitCode::SUCCESS
        }
        Ok(AggregationReport::Replaced { rows }) => {
            info!(logger, "Yearly statistics rebuilt: {} rows", rows);
            ExitCode::SUCCESS
        }
        Err(e) => {
            crit!(logger, "System failure: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn aggregate(cli: &Cli, logger: &Logger) -> anyhow::Result<AggregationReport> {
    let db = Database::connect(&cli.database_url())
        .await
        .context("cannot open database")?
        .with_batch_size(cli.batch_size());

    let engine = StatisticsEngine::new(logger.new(o!("job" => "aggregate")), Arc::new(db.clone()));
    let report = engine.run().await.context("aggregation failed");
    db.close().await;
    report
}
