//! Question file ingestion.
//!
//! This crate finds scraped question files on disk and loads them into
//! [`QuestionRecord`](qgraph_model::QuestionRecord)s.
//!
//! # Features
//!
//! - **Discovery**: list `*.json` files, optionally filtered by a name suffix
//! - **Loading**: file-level JSON parsing with record-level decoding, so one
//!   bad record does not lose the rest of the file
//! - **Chunking**: split record arrays into fixed-size files for external
//!   cleaning passes, optionally reduced to the taxonomy fields
//! - **Writing**: atomic rewrite of a question file
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use qgraph_ingest::{list_json_files, read_question_file};
//!
//! for path in list_json_files(Path::new("fourth jsons"), Some("-data.json"))? {
//!     let loaded = read_question_file(&path)?;
//!     println!("{}: {} records", path.display(), loaded.records.len());
//! }
//! ```

mod chunk;
mod discovery;
mod error;
mod loader;

// === Error Types ===
pub use error::{IngestError, Result};

// === File Discovery ===
pub use discovery::list_json_files;

// === Loading ===
pub use loader::{
    DroppedField, LoadedFile, RejectedRecord, decode_record, read_json_array, read_question_file,
};

// === Chunking and Writing ===
pub use chunk::{
    ChunkFile, TAXONOMY_FIELDS, chunk_file_name, taxonomy_view, write_chunks, write_json_array,
};
