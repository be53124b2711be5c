use slog::{error, info, warn, Logger};
use std::{path::Path, sync::Arc};
use weather_core::{Observation, WeatherStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing to write
    Empty,
    /// Rows committed
    Loaded(u64),
    /// Batch rolled back, nothing from it is stored
    Failed,
}

pub struct BulkLoader {
    logger: Logger,
    store: Arc<dyn WeatherStore>,
}

impl BulkLoader {
    pub fn new(logger: Logger, store: Arc<dyn WeatherStore>) -> Self {
        Self { logger, store }
    }

    /// Append one file's rows as a single all-or-nothing batch
    pub async fn load(&self, source: &Path, rows: &[Observation]) -> LoadOutcome {
        let file = source.display();
        if rows.is_empty() {
            warn!(self.logger, "Empty dataset from {}, nothing to store", file);
            return LoadOutcome::Empty;
        }

        info!(
            self.logger,
            "Attempting to store {} entries from {}",
            rows.len(),
            file
        );
        match self.store.insert_batch(rows).await {
            Ok(inserted) => {
                info!(
                    self.logger,
                    "Successfully stored {} entries from {}", inserted, file
                );
                LoadOutcome::Loaded(inserted)
            }
            Err(e) if e.is_unique_violation() => {
                error!(
                    self.logger,
                    "Storage failed for {} | Entries already exist for this station: {}", file, e
                );
                LoadOutcome::Failed
            }
            Err(e) => {
                error!(self.logger, "Storage failed for {} | Error: {}", file, e);
                LoadOutcome::Failed
            }
        }
    }
}
