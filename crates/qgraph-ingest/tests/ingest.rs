use std::fs;

use qgraph_ingest::{IngestError, list_json_files, read_json_array, read_question_file, write_chunks};
use tempfile::TempDir;

#[test]
fn loads_directory_in_name_order() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("b-data.json"),
        r#"[{"paper_code": "CS", "question_no": "Q.2", "subject": "Algorithms"}]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("a-data.json"),
        r#"[{"paper_code": "CS", "question_no": "Q.1", "marks": "2", "has_diagram": "yes"}]"#,
    )
    .unwrap();
    fs::write(dir.path().join("broken-data.json"), "not json").unwrap();

    let files = list_json_files(dir.path(), Some("-data.json")).unwrap();
    assert_eq!(files.len(), 3);

    let mut loaded = Vec::new();
    let mut failed = Vec::new();
    for path in &files {
        match read_question_file(path) {
            Ok(file) => loaded.push(file),
            Err(err) => failed.push(err),
        }
    }

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].records[0].marks, Some(2.0));
    assert_eq!(loaded[0].records[0].has_diagram, Some(true));
    assert_eq!(loaded[1].records[0].subject.as_deref(), Some("Algorithms"));
    assert!(matches!(failed.as_slice(), [IngestError::JsonParse { .. }]));
}

#[test]
fn chunks_preserve_unknown_fields() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("all.json");
    fs::write(
        &input,
        r#"[{"question_no": "Q.1", "image_url": "x.png"}, {"question_no": "Q.2"}, {"question_no": "Q.3"}]"#,
    )
    .unwrap();

    let items = read_json_array(&input).unwrap();
    let out = dir.path().join("llm_chunks");
    let chunks = write_chunks(&items, 2, &out).unwrap();
    assert_eq!(chunks.len(), 2);

    let first = read_json_array(&chunks[0].path).unwrap();
    assert_eq!(first[0]["image_url"], "x.png");
    assert_eq!(read_question_file(&chunks[1].path).unwrap().records.len(), 1);
}
