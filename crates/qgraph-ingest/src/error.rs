//! Error types for question file ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while discovering, reading or chunking question files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not a directory.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or write an output file.
    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Temp file could not be renamed over its target.
    #[error("failed to move {temp_path} to {target_path}: {source}")]
    AtomicWrite {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === JSON Errors ===
    /// File is not valid JSON.
    #[error("failed to parse JSON {path}: {message}")]
    JsonParse { path: PathBuf, message: String },

    /// File is valid JSON but its top level is not an array.
    #[error("expected a top-level JSON array in {path}, found {found}")]
    NotAnArray { path: PathBuf, found: &'static str },

    /// Chunk size of zero.
    #[error("chunk size must be at least 1")]
    InvalidChunkSize,
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
