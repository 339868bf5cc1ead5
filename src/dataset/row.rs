// Rows and output records
// The unit of enumerated work and the processor contract that turns one
// row into zero or more metadata records

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::audio::RenderError;
use crate::audio::TrimError;
use crate::theory::TheoryError;

/// One unit of enumerated work. `index` is the first index of the row's
/// reserved block; records produced by the row use
/// `index .. index + fan_out`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row<P> {
    pub index: u64,
    pub fan_out: u64,
    pub params: P,
}

/// One line of the output table: an index plus named attribute values.
/// Keys are ordered so aggregation is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub index: u64,
    pub attrs: BTreeMap<String, Value>,
}

impl OutputRecord {
    pub fn new(index: u64) -> Self {
        OutputRecord {
            index,
            attrs: BTreeMap::new(),
        }
    }

    /// Set an attribute. Values go through `serde_json::Value` so the
    /// table layer can render strings, numbers, bools, and nulls alike.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.attrs.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }
}

/// Errors that fail a single row. Attribution is strictly per-row: a
/// failing row never affects its siblings.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("content computation failed: {0}")]
    Theory(#[from] TheoryError),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error("trim failed: {0}")]
    Trim(#[from] TrimError),

    #[error("artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Converts one row into its output records.
///
/// Implementations must be free of cross-row shared mutable state:
/// executing rows in any order or interleaving yields identical per-row
/// output, which is what makes parallel dispatch safe. Any randomness is
/// seeded from the row's own index.
pub trait RowProcessor: Sync {
    type Params: Send + Sync;

    fn process(
        &self,
        dataset_dir: &Path,
        row: &Row<Self::Params>,
    ) -> Result<Vec<OutputRecord>, RowError>;
}
