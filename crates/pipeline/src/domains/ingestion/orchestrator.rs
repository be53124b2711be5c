use super::{BulkLoader, LoadOutcome, StationFileParser};
use slog::{error, info, o, warn, Logger};
use std::{path::Path, sync::Arc};
use weather_core::{is_directory, list_files_with_extension, normalize_extension, WeatherStore};

/// Totals for one pass over the data directory
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub files_found: usize,
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub rows_inserted: u64,
}

pub struct IngestionOrchestrator {
    logger: Logger,
    parser: StationFileParser,
    loader: BulkLoader,
    extension: String,
}

impl IngestionOrchestrator {
    pub fn new(logger: Logger, store: Arc<dyn WeatherStore>) -> Self {
        Self {
            parser: StationFileParser::new(logger.new(o!("component" => "parser"))),
            loader: BulkLoader::new(logger.new(o!("component" => "loader")), store),
            logger,
            extension: String::from(".txt"),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Parse and load every matching file directly under `data_dir`
    ///
    /// Files are handled one at a time in path order. A file that fails to
    /// parse or load is logged and skipped; it never stops the run and never
    /// leaves partial rows behind.
    pub async fn ingest_directory(&self, data_dir: &Path) -> IngestSummary {
        let mut summary = IngestSummary::default();

        if !is_directory(data_dir) {
            error!(
                self.logger,
                "Data directory not found: {}",
                data_dir.display()
            );
            return summary;
        }

        let files = match list_files_with_extension(data_dir, &self.extension) {
            Ok(files) => files,
            Err(e) => {
                error!(
                    self.logger,
                    "Failed listing {} | Reason: {}",
                    data_dir.display(),
                    e
                );
                return summary;
            }
        };

        summary.files_found = files.len();
        if files.is_empty() {
            warn!(
                self.logger,
                "No *.{} files found in {}",
                normalize_extension(&self.extension),
                data_dir.display()
            );
            return summary;
        }
        info!(
            self.logger,
            "Found {} station files in {}",
            files.len(),
            data_dir.display()
        );

        for path in &files {
            match self.ingest_file(path).await {
                Some(rows) => {
                    summary.files_loaded += 1;
                    summary.rows_inserted += rows;
                }
                None => summary.files_skipped += 1,
            }
        }

        info!(
            self.logger,
            "Ingestion finished | files: {} loaded: {} skipped: {} rows: {}",
            summary.files_found,
            summary.files_loaded,
            summary.files_skipped,
            summary.rows_inserted
        );
        summary
    }

    /// Rows committed for `path`, or `None` when the file was skipped
    pub async fn ingest_file(&self, path: &Path) -> Option<u64> {
        let Some(parsed) = self.parser.parse_file(path).await else {
            warn!(self.logger, "Skipping unreadable file {}", path.display());
            return None;
        };
        if parsed.is_empty() {
            warn!(
                self.logger,
                "No valid entries in {}, skipping",
                path.display()
            );
            return None;
        }

        match self.loader.load(path, &parsed.rows).await {
            LoadOutcome::Loaded(rows) => Some(rows),
            LoadOutcome::Empty | LoadOutcome::Failed => None,
        }
    }
}
