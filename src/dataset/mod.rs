// Dataset generation pipeline
// Enumerates parameter settings into indexed rows, fans them out over a
// bounded worker pool, and aggregates the results into on-disk tables

pub mod enumerate;
pub mod row;
pub mod writer;

pub use enumerate::{ensure_unique, enumerate_rows, ConfigError};
pub use row::{OutputRecord, Row, RowError, RowProcessor};
pub use writer::{DatasetError, DatasetSummary, DatasetWriter, WriterConfig};
