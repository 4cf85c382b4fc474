//! Error types for normalization data loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading normalization tables.
///
/// Normalizing individual values never fails; only the externalized label
/// table can be malformed.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Label table file could not be opened.
    #[error("failed to read label table {path}: {source}")]
    LabelTableRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Label table is not valid CSV or misses a column.
    #[error("failed to parse label table {source_name}: {message}")]
    LabelTableParse { source_name: String, message: String },

    /// Row names a scope other than subject, chapter, subtopic or `*`.
    #[error("invalid scope '{scope}' in label table {source_name} (line {line})")]
    InvalidScope {
        source_name: String,
        line: u64,
        scope: String,
    },

    /// Row maps a variant to a blank canonical label.
    #[error("blank canonical label for '{variant}' in label table {source_name} (line {line})")]
    BlankCanonical {
        source_name: String,
        line: u64,
        variant: String,
    },
}

/// Result type for normalization operations.
pub type Result<T> = std::result::Result<T, NormalizeError>;
