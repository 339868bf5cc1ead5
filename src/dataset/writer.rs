// Dataset writer
// Drives rows through a bounded rayon pool and aggregates the results
// into an index-ordered metadata table plus a failure table

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::iter::{ParallelBridge, ParallelIterator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::row::{OutputRecord, Row, RowProcessor};

/// Errors that abort a whole run. Everything row-scoped stays out of
/// this type by design of the row contract.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write table: {0}")]
    Table(#[from] csv::Error),

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Writer tuning knobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Worker pool size. Bounded; rows are pulled on demand.
    pub max_workers: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig { max_workers: 8 }
    }
}

/// Per-run accounting returned by [`DatasetWriter::create_dataset`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_rows: u64,
    pub succeeded_rows: u64,
    pub failed_rows: u64,

    /// Records in the success table; at least `succeeded_rows` and more
    /// when rows fan out.
    pub records_written: u64,

    /// Succeeded artifacts whose quality flag marked them silent.
    pub silent_artifacts: u64,
}

/// Creates one dataset: a directory of artifacts plus aggregated
/// metadata tables, produced by running a row processor over an
/// enumerated row sequence.
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    dataset_name: String,
    parent_dir: PathBuf,
    config: WriterConfig,
}

impl DatasetWriter {
    pub fn new(dataset_name: impl Into<String>, parent_dir: impl Into<PathBuf>) -> Self {
        DatasetWriter {
            dataset_name: dataset_name.into(),
            parent_dir: parent_dir.into(),
            config: WriterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: WriterConfig) -> Self {
        self.config = config;
        self
    }

    /// Directory artifacts and tables are written into.
    pub fn dataset_dir(&self) -> PathBuf {
        self.parent_dir.join(&self.dataset_name)
    }

    /// Run the pipeline to completion.
    ///
    /// Rows are pulled lazily from `rows` by a pool of `max_workers`
    /// independent workers; completion order is unconstrained and the
    /// output order is reconstructed from row indices afterwards. A
    /// processor failure marks only its own row failed; every other row
    /// completes normally. Aggregation is single-threaded and starts
    /// only after the pool has drained.
    pub fn create_dataset<P, I, R>(
        &self,
        rows: I,
        processor: &R,
    ) -> Result<DatasetSummary, DatasetError>
    where
        P: Send + Sync,
        I: IntoIterator<Item = Row<P>>,
        I::IntoIter: Send,
        R: RowProcessor<Params = P>,
    {
        let dataset_dir = self.dataset_dir();
        fs::create_dir_all(&dataset_dir)?;
        log::info!(
            "creating dataset '{}' in {} with {} workers",
            self.dataset_name,
            dataset_dir.display(),
            self.config.max_workers
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_workers)
            .build()?;

        let rows = rows.into_iter();
        let results: Vec<(u64, Result<Vec<OutputRecord>, String>)> = pool.install(|| {
            rows.par_bridge()
                .map(|row| {
                    let outcome = processor
                        .process(&dataset_dir, &row)
                        .map_err(|error| error.to_string());
                    (row.index, outcome)
                })
                .collect()
        });

        let total_rows = results.len() as u64;
        let mut records = Vec::new();
        let mut failures = Vec::new();
        for (index, outcome) in results {
            match outcome {
                Ok(row_records) => records.extend(row_records),
                Err(error) => {
                    log::error!("row {index} failed: {error}");
                    failures.push((index, error));
                }
            }
        }
        let failed_rows = failures.len() as u64;
        let succeeded_rows = total_rows - failed_rows;

        records.sort_by_key(|record| record.index);
        failures.sort_by_key(|(index, _)| *index);

        self.write_success_table(&dataset_dir, &records)?;
        self.write_failure_table(&dataset_dir, &failures)?;

        let silent_artifacts = records
            .iter()
            .filter(|record| record.get("is_silent") == Some(&Value::Bool(true)))
            .count() as u64;

        let summary = DatasetSummary {
            total_rows,
            succeeded_rows,
            failed_rows,
            records_written: records.len() as u64,
            silent_artifacts,
        };
        log::info!(
            "dataset '{}': {} rows succeeded, {} failed, {} records",
            self.dataset_name,
            summary.succeeded_rows,
            summary.failed_rows,
            summary.records_written
        );
        if summary.silent_artifacts > 0 {
            log::warn!(
                "dataset '{}' contains {} silent samples",
                self.dataset_name,
                summary.silent_artifacts
            );
        }
        Ok(summary)
    }

    /// Success-table path: `<dir>/<name>.csv`.
    pub fn table_path(&self) -> PathBuf {
        self.dataset_dir().join(format!("{}.csv", self.dataset_name))
    }

    /// Failure-table path: `<dir>/<name>_failures.csv`.
    pub fn failure_table_path(&self) -> PathBuf {
        self.dataset_dir()
            .join(format!("{}_failures.csv", self.dataset_name))
    }

    fn write_success_table(
        &self,
        dataset_dir: &Path,
        records: &[OutputRecord],
    ) -> Result<(), DatasetError> {
        // Schema is the union of all observed attribute keys, sorted so
        // reruns produce byte-identical tables. Missing keys become
        // empty cells, never dropped columns.
        let columns: BTreeSet<&str> = records
            .iter()
            .flat_map(|record| record.attrs.keys().map(String::as_str))
            .collect();

        let path = dataset_dir.join(format!("{}.csv", self.dataset_name));
        let mut table = csv::Writer::from_path(&path)?;
        let mut header = vec!["index"];
        header.extend(columns.iter().copied());
        table.write_record(&header)?;

        for record in records {
            let mut cells = vec![record.index.to_string()];
            for column in &columns {
                cells.push(match record.attrs.get(*column) {
                    None | Some(Value::Null) => String::new(),
                    Some(Value::String(text)) => text.clone(),
                    Some(value) => value.to_string(),
                });
            }
            table.write_record(&cells)?;
        }
        table.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    fn write_failure_table(
        &self,
        dataset_dir: &Path,
        failures: &[(u64, String)],
    ) -> Result<(), DatasetError> {
        let path = dataset_dir.join(format!("{}_failures.csv", self.dataset_name));
        let mut table = csv::Writer::from_path(&path)?;
        table.write_record(["index", "error"])?;
        for (index, error) in failures {
            table.write_record([index.to_string().as_str(), error.as_str()])?;
        }
        table.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}
