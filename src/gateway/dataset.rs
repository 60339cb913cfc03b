//! Client dataset cache
//!
//! Process-wide, lazily loaded view of the client CSV keyed by [`ClientId`].
//!
//! # Loading Rules
//!
//! - The file is read on the first lookup (or an explicit [`DatasetCache::warm`])
//! - Concurrent first callers wait on a single load; the file is never read twice
//! - A failed load leaves the cache empty, so a later lookup tries again
//! - Once loaded the dataset is read-only and never invalidated
//!
//! Duplicate identifiers resolve to the first row in file order.

use super::metrics::{cell_value, ClientId, MetricsRecord, CONSUMED_FIELDS};
use serde_json::Map;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Default dataset location
pub const DEFAULT_DATASET_PATH: &str = "clients.csv";

/// Name of the identifier column
pub const ID_COLUMN: &str = "client_id";

/// Errors from loading the dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The file could not be read
    #[error("dataset unavailable at {path}: {reason}")]
    Unavailable { path: String, reason: String },

    /// The file was read but is not valid CSV
    #[error("dataset is malformed: {0}")]
    Malformed(String),
}

impl From<csv::Error> for DatasetError {
    fn from(e: csv::Error) -> Self {
        DatasetError::Malformed(e.to_string())
    }
}

/// One row of the dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    /// Row identifier, if the id column is present and non-blank
    pub client_id: Option<ClientId>,
    /// Consumed columns of the row, not yet normalized
    pub metrics: MetricsRecord,
}

/// A parsed dataset with its first-match index
#[derive(Debug, Default)]
pub struct Dataset {
    rows: Vec<DatasetRow>,
    index: HashMap<ClientId, usize>,
    duplicates: usize,
}

impl Dataset {
    /// Parse CSV from any reader.
    ///
    /// Only the identifier column and [`CONSUMED_FIELDS`] are kept. Rows are
    /// retained in file order.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let id_pos = headers.iter().position(|h| h == ID_COLUMN);
        let field_pos: Vec<(&str, usize)> = CONSUMED_FIELDS
            .iter()
            .filter_map(|field| headers.iter().position(|h| h == *field).map(|p| (*field, p)))
            .collect();

        let mut dataset = Dataset::default();

        for record in csv_reader.records() {
            let record = record?;

            let client_id = id_pos
                .and_then(|p| record.get(p))
                .and_then(ClientId::parse);

            let mut map = Map::new();
            for (field, pos) in &field_pos {
                if let Some(value) = record.get(*pos).and_then(cell_value) {
                    map.insert(field.to_string(), value);
                }
            }

            dataset.push(DatasetRow {
                client_id,
                metrics: MetricsRecord::from_map(map),
            });
        }

        Ok(dataset)
    }

    fn push(&mut self, row: DatasetRow) {
        let position = self.rows.len();
        if let Some(ref id) = row.client_id {
            if self.index.contains_key(id) {
                self.duplicates += 1;
            } else {
                self.index.insert(id.clone(), position);
            }
        }
        self.rows.push(row);
    }

    /// First row with the given identifier
    pub fn get(&self, id: &ClientId) -> Option<&DatasetRow> {
        self.index.get(id).map(|&i| &self.rows[i])
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<DatasetRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows shadowed by an earlier row with the same id
    pub fn duplicate_count(&self) -> usize {
        self.duplicates
    }
}

/// Lazily loaded, process-wide dataset cache
pub struct DatasetCache {
    /// Location of the CSV file
    path: PathBuf,
    /// Loaded dataset, set at most once
    dataset: OnceCell<Dataset>,
    /// Number of load attempts that reached the filesystem
    loads: AtomicUsize,
}

impl DatasetCache {
    /// Create a cache for the file at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dataset: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the dataset has been loaded
    pub fn is_loaded(&self) -> bool {
        self.dataset.initialized()
    }

    /// How many times the file has been read
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Load the dataset now, returning its row count
    pub async fn warm(&self) -> Result<usize, DatasetError> {
        Ok(self.dataset().await?.len())
    }

    /// Look up a client's metrics.
    ///
    /// Returns `Ok(None)` when no row carries the identifier. The returned
    /// record is normalized.
    pub async fn lookup(&self, id: &ClientId) -> Result<Option<MetricsRecord>, DatasetError> {
        let dataset = self.dataset().await?;

        match dataset.get(id) {
            Some(row) => {
                debug!(client_id = %id, "Dataset hit");
                Ok(Some(row.metrics.normalize()))
            }
            None => {
                debug!(client_id = %id, "Dataset miss");
                Ok(None)
            }
        }
    }

    async fn dataset(&self) -> Result<&Dataset, DatasetError> {
        if let Some(dataset) = self.dataset.get() {
            return Ok(dataset);
        }
        self.dataset.get_or_try_init(|| self.load()).await
    }

    async fn load(&self) -> Result<Dataset, DatasetError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let path = self.path.display().to_string();

        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            warn!(path = %path, error = %e, "Dataset file could not be read");
            DatasetError::Unavailable {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?;

        let dataset = Dataset::from_reader(bytes.as_slice())?;

        if dataset.duplicate_count() > 0 {
            warn!(
                path = %path,
                duplicates = dataset.duplicate_count(),
                "Dataset contains duplicate client ids, first row wins"
            );
        }

        info!(
            path = %path,
            rows = dataset.len(),
            "Client dataset loaded"
        );

        Ok(dataset)
    }
}

impl std::fmt::Debug for DatasetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetCache")
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
