//! JSON question file loading.
//!
//! A file must hold a top-level JSON array; anything else fails the whole
//! file. Elements are decoded one at a time: a non-object element is
//! reported and dropped without losing its siblings, and a field whose value
//! cannot be coerced is logged and left empty while the record is kept.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use qgraph_model::{FieldIssue, QuestionRecord};

use crate::error::{IngestError, Result};

/// An array element that could not be decoded as a question record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// Zero-based position in the file's array.
    pub index: usize,
    pub message: String,
}

/// A field of a kept record that was left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedField {
    /// Zero-based position in the file's array.
    pub index: usize,
    pub field: &'static str,
    pub message: String,
}

/// Records decoded from one file.
#[derive(Debug, Clone, Default)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub records: Vec<QuestionRecord>,
    pub rejected: Vec<RejectedRecord>,
    pub dropped_fields: Vec<DroppedField>,
}

impl LoadedFile {
    /// Number of array elements in the file, decoded or not.
    pub fn element_count(&self) -> usize {
        self.records.len() + self.rejected.len()
    }
}

/// Reads a file and returns the elements of its top-level array untouched.
pub fn read_json_array(path: &Path) -> Result<Vec<Value>> {
    let bytes = fs::read(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|e| IngestError::JsonParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    match value {
        Value::Array(items) => Ok(items),
        other => Err(IngestError::NotAnArray {
            path: path.to_path_buf(),
            found: json_kind(&other),
        }),
    }
}

/// Reads a question file, decoding every element independently.
pub fn read_question_file(path: &Path) -> Result<LoadedFile> {
    let items = read_json_array(path)?;
    let mut loaded = LoadedFile {
        path: path.to_path_buf(),
        ..LoadedFile::default()
    };

    for (index, item) in items.into_iter().enumerate() {
        match decode_record(item) {
            Ok((record, issues)) => {
                for FieldIssue { field, message } in issues {
                    warn!(file = %path.display(), index, field, %message, "dropped uncoercible field");
                    loaded.dropped_fields.push(DroppedField {
                        index,
                        field,
                        message,
                    });
                }
                loaded.records.push(record);
            }
            Err(message) => {
                warn!(file = %path.display(), index, %message, "rejected question record");
                loaded.rejected.push(RejectedRecord { index, message });
            }
        }
    }

    debug!(
        file = %path.display(),
        records = loaded.records.len(),
        rejected = loaded.rejected.len(),
        dropped_fields = loaded.dropped_fields.len(),
        "loaded question file"
    );
    Ok(loaded)
}

/// Decodes one array element along with the fields it had to leave empty.
/// Non-objects are rejected.
pub fn decode_record(
    item: Value,
) -> std::result::Result<(QuestionRecord, Vec<FieldIssue>), String> {
    let Value::Object(object) = &item else {
        return Err(format!("expected an object, found {}", json_kind(&item)));
    };
    let issues = QuestionRecord::field_issues(object);
    let record = serde_json::from_value(item).map_err(|e| e.to_string())?;
    Ok((record, issues))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn decodes_each_element_independently() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "q.json",
            r#"[
                {"paper_code": "CS", "question_no": "Q.1", "year": 2014},
                42,
                {"paper_code": "CS", "question_no": "Q.2", "year": {"bad": true}},
                {"paper_code": "CS", "question_no": 3, "extra": "ignored"}
            ]"#,
        );
        let loaded = read_question_file(&path).unwrap();
        assert_eq!(loaded.records.len(), 3);
        assert_eq!(loaded.element_count(), 4);
        assert_eq!(
            loaded.rejected.iter().map(|r| r.index).collect::<Vec<_>>(),
            vec![1]
        );
        assert_eq!(loaded.records[1].question_no.as_deref(), Some("Q.2"));
        assert_eq!(loaded.records[1].year, None);
        assert_eq!(loaded.records[2].question_no.as_deref(), Some("3"));
        assert_eq!(loaded.dropped_fields.len(), 1);
        assert_eq!(loaded.dropped_fields[0].index, 2);
        assert_eq!(loaded.dropped_fields[0].field, "year");
    }

    #[test]
    fn malformed_optional_fields_keep_the_record() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "loose.json",
            r#"[
                {"paper_code": "CS", "question_no": "Q.1", "year": "2014 (Set 1)"},
                {"paper_code": "CS", "question_no": "Q.2", "has_diagram": "maybe"},
                {"paper_code": "CS", "question_no": "Q.3", "marks": "2 marks"},
                {"paper_code": "CS", "question_no": "Q.4", "options": "A) x B) y"}
            ]"#,
        );
        let loaded = read_question_file(&path).unwrap();
        assert_eq!(loaded.records.len(), 4);
        assert!(loaded.rejected.is_empty());
        let fields: Vec<&str> = loaded.dropped_fields.iter().map(|d| d.field).collect();
        assert_eq!(fields, vec!["year", "has_diagram", "marks", "options"]);
        assert!(loaded.records[3].options.is_empty());
    }

    #[test]
    fn rejects_non_array_files() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "obj.json", r#"{"questions": []}"#);
        let err = read_question_file(&path).unwrap_err();
        assert!(matches!(err, IngestError::NotAnArray { found: "object", .. }));
    }

    #[test]
    fn reports_syntax_errors() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "broken.json", "[{\"paper_code\": ");
        let err = read_question_file(&path).unwrap_err();
        assert!(matches!(err, IngestError::JsonParse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let err = read_json_array(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, IngestError::FileRead { .. }));
    }

    #[test]
    fn empty_array_is_fine() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "empty.json", "[]");
        let loaded = read_question_file(&path).unwrap();
        assert_eq!(loaded.element_count(), 0);
    }
}
