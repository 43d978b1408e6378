#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Read-only access to observation rows.
//!
//! The scoring engine only ever reads from an [`ObservationStore`]. Each call
//! to [`ObservationStore::load`] returns an immutable snapshot of the rows so
//! that a single scoring computation never sees the data change underneath
//! it.

pub mod csv_file;
pub mod parsing;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use flu_risk_observation_models::Observation;
use thiserror::Error;

/// Errors that can occur while reading observations.
#[derive(Debug, Error)]
pub enum ObservationError {
    /// Reading the underlying file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is missing from the CSV header row.
    #[error("Missing required column '{column}'")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },

    /// A row parsed but holds a value that cannot be interpreted.
    #[error("Invalid row at line {line}: {message}")]
    InvalidRow {
        /// 1-based line number in the source file.
        line: u64,
        /// Description of what went wrong.
        message: String,
    },
}

/// Source of observation rows.
///
/// Implementations must be `Send + Sync` so one store can back many
/// concurrent scoring requests.
pub trait ObservationStore: Send + Sync {
    /// Returns every row currently held by the store.
    ///
    /// # Errors
    ///
    /// Returns [`ObservationError`] if the backing data cannot be read.
    fn load(&self) -> Result<Arc<[Observation]>, ObservationError>;
}

/// A store holding a fixed set of rows in memory.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    rows: Arc<[Observation]>,
}

impl InMemoryStore {
    /// Creates a store over the given rows.
    #[must_use]
    pub fn new(rows: Vec<Observation>) -> Self {
        Self { rows: rows.into() }
    }

    /// Number of rows held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store holds no rows at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<Observation>> for InMemoryStore {
    fn from(rows: Vec<Observation>) -> Self {
        Self::new(rows)
    }
}

impl ObservationStore for InMemoryStore {
    fn load(&self) -> Result<Arc<[Observation]>, ObservationError> {
        Ok(Arc::clone(&self.rows))
    }
}

/// A store that re-reads a CSV file on every load, so edits to the file are
/// picked up without restarting the process.
#[derive(Debug, Clone)]
pub struct CsvFileStore {
    path: PathBuf,
}

impl CsvFileStore {
    /// Creates a store backed by the CSV file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ObservationStore for CsvFileStore {
    fn load(&self) -> Result<Arc<[Observation]>, ObservationError> {
        csv_file::load_csv_file(&self.path).map(Into::into)
    }
}
