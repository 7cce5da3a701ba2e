//! Error taxonomy for the load pipeline.
//!
//! Errors are split by how far they reach:
//!
//! - [`ConvertError`] is fatal and ends the run before or while the
//!   destination is opened.
//! - [`DecodeError`] and [`LoadError`] belong to a single file. The
//!   orchestrator wraps them in [`FileError`], records the failure, and
//!   moves on to the next file.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Source directory {path:?} does not exist or is not a directory")]
    NotFound { path: PathBuf },
    #[error("Walking {path:?}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Opening database {path:?}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Reading {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Unknown encoding '{label}'")]
    Encoding { label: String },
    #[error("Input is not valid {encoding}")]
    InvalidBytes { encoding: &'static str },
    #[error("File has no header row")]
    MissingHeader,
    #[error("Record on line {line} has {found} field(s), header has {expected}")]
    MalformedRecord {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Executing SQL against table '{table}'")]
    Sql {
        table: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Row {row} for table '{table}' has {found} field(s), expected {expected}")]
    FieldCount {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Reading rows for table '{table}'")]
    Decode {
        table: String,
        #[source]
        source: DecodeError,
    },
}

impl LoadError {
    pub(crate) fn sql(table: &str) -> impl FnOnce(rusqlite::Error) -> LoadError + '_ {
        move |source| LoadError::Sql {
            table: table.to_string(),
            source,
        }
    }
}

/// Why a single file was skipped.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("Decoding failed")]
    Decode(#[from] DecodeError),
    #[error("Loading failed")]
    Load(#[from] LoadError),
    #[error("Table '{table}' was already loaded from {first:?}")]
    DuplicateTable { table: String, first: PathBuf },
}

impl FileError {
    /// Flattens the source chain into one line for log and report output.
    pub fn chain_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }
        message
    }
}
