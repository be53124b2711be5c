use async_trait::async_trait;
use mockall::mock;
use slog::{o, Drain, Level, Logger, Never, OwnedKVList, Record};
use std::sync::{Arc, Mutex};
use weather_core::{
    db::Error, Observation, ObservationFilter, Page, StatisticFilter, WeatherStore,
    YearlyStatistic,
};

mock! {
    pub Store {}
    #[async_trait]
    impl WeatherStore for Store {
        async fn insert_batch(&self, rows: &[Observation]) -> Result<u64, Error>;
        async fn query_observations(
            &self,
            filter: &ObservationFilter,
            page: Page,
        ) -> Result<Vec<Observation>, Error>;
        async fn query_statistics(
            &self,
            filter: &StatisticFilter,
            page: Page,
        ) -> Result<Vec<YearlyStatistic>, Error>;
        async fn yearly_statistics(&self) -> Result<Vec<YearlyStatistic>, Error>;
        async fn replace_statistics(&self, rows: &[YearlyStatistic]) -> Result<u64, Error>;
    }
}

pub fn discard_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}

/// Keeps every record so tests can assert on what was logged
#[derive(Clone, Default)]
pub struct CaptureDrain(Arc<Mutex<Vec<(Level, String)>>>);

impl CaptureDrain {
    pub fn logger(&self) -> Logger {
        Logger::root(self.clone(), o!())
    }

    pub fn records(&self) -> Vec<(Level, String)> {
        self.0.lock().unwrap().clone()
    }
}

impl Drain for CaptureDrain {
    type Ok = ();
    type Err = Never;

    fn log(&self, record: &Record, _: &OwnedKVList) -> Result<(), Never> {
        self.0
            .lock()
            .unwrap()
            .push((record.level(), record.msg().to_string()));
        Ok(())
    }
}
