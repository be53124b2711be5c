use pipeline::{get_config_info, setup_logger, shutdown_signal, IngestionOrchestrator};
use slog::{crit, info, o};
use std::{path::Path, process::ExitCode, sync::Arc};
use weather_core::Database;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = get_config_info();
    let logger = setup_logger(&cli);
    let data_dir = cli.data_dir();

    info!(logger, "Weather ingestion starting...");
    info!(logger, "  Database: {}", cli.database_url());
    info!(logger, "  Data dir: {}", data_dir);
    info!(logger, "  Extension: {}", cli.extension());

    let db = match Database::connect(&cli.database_url()).await {
        Ok(db) => db.with_batch_size(cli.batch_size()),
        Err(e) => {
            crit!(logger, "Cannot open database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let orchestrator = IngestionOrchestrator::new(
        logger.new(o!("job" => "ingest")),
        Arc::new(db.clone()),
    )
    .with_extension(cli.extension());

    tokio::select! {
        _ = orchestrator.ingest_directory(Path::new(&data_dir)) => {
            info!(logger, "Ingestion complete");
        }
        _ = shutdown_signal() => {
            info!(logger, "Ingestion halted by user");
        }
    }

    db.close().await;
    ExitCode::SUCCESS
}
