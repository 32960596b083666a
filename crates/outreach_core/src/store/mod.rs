//! Record store contracts and flat-file persistence.
//!
//! # Responsibility
//! - Define the load/save contract the session depends on.
//! - Keep flat-file parsing and atomic replacement inside the store
//!   boundary.
//!
//! # Invariants
//! - A missing storage file loads as an empty, schema-conformant set.
//! - Saves never leave a partially written file in place.
//! - Save failures are returned to the caller, never swallowed.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use crate::model::record::RecordSet;

pub mod codec;
pub mod csv_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store error for file access and malformed persisted data.
#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Header lacks one or more schema columns.
    MissingColumns(Vec<String>),
    /// Persisted content cannot be decoded. `line` is 1-based.
    InvalidData { line: usize, message: String },
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to access `{}`: {source}", path.display())
            }
            Self::MissingColumns(columns) => {
                write!(f, "missing required columns: {}", columns.join(", "))
            }
            Self::InvalidData { line, message } => {
                write!(f, "invalid record data at line {line}: {message}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::MissingColumns(_) | Self::InvalidData { .. } => None,
        }
    }
}

/// Durable storage for one record set.
pub trait RecordStore {
    /// Loads the full record set from storage.
    fn load(&self) -> StoreResult<RecordSet>;
    /// Replaces stored content with `records`.
    fn save(&self, records: &RecordSet) -> StoreResult<()>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn load(&self) -> StoreResult<RecordSet> {
        (**self).load()
    }

    fn save(&self, records: &RecordSet) -> StoreResult<()> {
        (**self).save(records)
    }
}
