//! Error types for the core crate.

use crate::models::EntryId;
use std::path::PathBuf;
use thiserror::Error;

/// The whole import failed; nothing was loaded.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV output: {0}")]
    Flush(#[source] std::io::Error),
    #[error("CSV output is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no entry with id {0}")]
    UnknownEntry(EntryId),
    #[error("no group for domain {0:?}")]
    UnknownGroup(String),
}
