pub mod aggregation;
pub mod ingestion;

pub use aggregation::*;
pub use ingestion::*;
