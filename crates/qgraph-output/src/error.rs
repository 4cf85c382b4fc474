//! Error types for table export and import.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while writing or reading a table set.
#[derive(Debug, Error)]
pub enum ExportError {
    // === Export ===
    /// Output directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Staging directory could not be created inside the output directory.
    #[error("failed to create staging directory in {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A table could not be written.
    #[error("failed to write table {path}: {message}")]
    Write { path: PathBuf, message: String },

    /// A staged table could not be moved into place.
    #[error("failed to move {from} to {to}: {source}")]
    Commit {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A table path is taken by something other than a regular file.
    #[error("cannot replace {path}: not a regular file")]
    Occupied { path: PathBuf },

    // === Import ===
    /// A table of the set is missing.
    #[error("table not found: {path}")]
    MissingTable { path: PathBuf },

    /// A table could not be read as CSV.
    #[error("failed to read table {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// A required column is absent from the header row.
    #[error("column '{column}' not found in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// A cell does not parse as its column type.
    #[error("invalid value '{value}' for column '{column}' in {path} (line {line})")]
    InvalidValue {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
