//! Splitting question arrays into fixed-size chunk files, and writing JSON
//! arrays back to disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{IngestError, Result};

/// One written chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFile {
    pub path: PathBuf,
    /// Index of the first element, relative to the input sequence.
    pub start: usize,
    pub len: usize,
}

/// Fields kept by [`taxonomy_view`]: the natural key, the text, and the
/// taxonomy labels a cleaning pass may rewrite.
pub const TAXONOMY_FIELDS: [&str; 7] = [
    "year",
    "paper_code",
    "question_no",
    "question_text",
    "subject",
    "chapter",
    "subtopic",
];

/// Reduces a raw record to [`TAXONOMY_FIELDS`]; absent fields become `null`.
/// Non-objects yield `None`.
pub fn taxonomy_view(item: &Value) -> Option<Value> {
    let object = item.as_object()?;
    let reduced: Map<String, Value> = TAXONOMY_FIELDS
        .iter()
        .map(|field| {
            let value = object.get(*field).cloned().unwrap_or(Value::Null);
            ((*field).to_string(), value)
        })
        .collect();
    Some(Value::Object(reduced))
}

/// File name of the `number`-th chunk (1-based), zero-padded to two digits.
pub fn chunk_file_name(number: usize) -> String {
    format!("chunk_{number:02}.json")
}

/// Writes `items` to `output_dir` as pretty-printed arrays of at most
/// `chunk_size` elements each. Elements are written exactly as read.
pub fn write_chunks(items: &[Value], chunk_size: usize, output_dir: &Path) -> Result<Vec<ChunkFile>> {
    if chunk_size == 0 {
        return Err(IngestError::InvalidChunkSize);
    }
    fs::create_dir_all(output_dir).map_err(|source| IngestError::FileWrite {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(items.len().div_ceil(chunk_size));
    for (position, chunk) in items.chunks(chunk_size).enumerate() {
        let path = output_dir.join(chunk_file_name(position + 1));
        write_json_array(&path, chunk)?;
        let start = position * chunk_size;
        info!(
            file = %path.display(),
            records = chunk.len(),
            first = start,
            last = start + chunk.len() - 1,
            "wrote chunk"
        );
        written.push(ChunkFile {
            path,
            start,
            len: chunk.len(),
        });
    }
    Ok(written)
}

/// Writes `items` as a pretty-printed JSON array.
///
/// The array goes to a sibling temp file first and is renamed over `path`
/// once synced, so readers never see a half-written file.
pub fn write_json_array(path: &Path, items: &[Value]) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");
    let write_error = |source: std::io::Error| IngestError::FileWrite {
        path: temp_path.clone(),
        source,
    };

    let file = File::create(&temp_path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, items)
        .map_err(|e| write_error(std::io::Error::other(e)))?;
    writer.write_all(b"\n").map_err(write_error)?;
    let file = writer
        .into_inner()
        .map_err(|e| write_error(e.into_error()))?;
    file.sync_all().map_err(write_error)?;

    fs::rename(&temp_path, path).map_err(|source| IngestError::AtomicWrite {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source,
    })?;
    debug!(file = %path.display(), records = items.len(), "wrote json array");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn splits_into_ceil_chunks() {
        let dir = TempDir::new().unwrap();
        let items: Vec<Value> = (0..5).map(|n| json!({ "question_no": n })).collect();
        let chunks = write_chunks(&items, 2, dir.path()).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].start, 4);
        assert_eq!(chunks[2].len, 1);
        assert!(chunks[0].path.ends_with("chunk_01.json"));

        let text = fs::read_to_string(&chunks[1].path).unwrap();
        let back: Vec<Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, items[2..4].to_vec());
    }

    #[test]
    fn keeps_non_ascii_text_unescaped() {
        let dir = TempDir::new().unwrap();
        let items = vec![json!({ "question_text": "ज्ञान" })];
        let chunks = write_chunks(&items, 10, dir.path()).unwrap();
        let text = fs::read_to_string(&chunks[0].path).unwrap();
        assert!(text.contains("ज्ञान"));
    }

    #[test]
    fn taxonomy_view_keeps_key_and_label_fields() {
        let item = json!({
            "year": 2014,
            "paper_code": "CS",
            "question_no": "Q.1",
            "subject": "OS",
            "options": ["a", "b"],
            "correct_answer": "A"
        });
        let reduced = taxonomy_view(&item).unwrap();
        let keys: Vec<&str> = reduced.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, TAXONOMY_FIELDS.to_vec());
        assert_eq!(reduced["chapter"], Value::Null);
        assert_eq!(reduced["subject"], json!("OS"));
        assert_eq!(taxonomy_view(&json!(42)), None);
    }

    #[test]
    fn json_array_write_replaces_file_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        write_json_array(&path, &[json!({ "question_no": "Q.1" })]).unwrap();

        let back: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, vec![json!({ "question_no": "Q.1" })]);
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["data.json"]);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = write_chunks(&[], 0, dir.path()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidChunkSize));
    }

    #[test]
    fn empty_input_writes_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(write_chunks(&[], 3, dir.path()).unwrap().is_empty());
    }
}
