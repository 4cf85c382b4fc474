//! File discovery for question directories.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Lists JSON files in a directory.
///
/// Only regular files with a `.json` extension (case-insensitive) are kept.
/// When `suffix` is given, the file name must also end with it, e.g.
/// `-data.json`. Returns files sorted by filename.
pub fn list_json_files(dir: &Path, suffix: Option<&str>) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let suffix_matches = match suffix.filter(|s| !s.is_empty()) {
            Some(suffix) => path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(suffix)),
            None => true,
        };

        if is_json && suffix_matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in &["2014-data.json", "2000-data.json", "notes.txt", "raw.JSON"] {
            std::fs::write(dir.path().join(name), "[]").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.json")).unwrap();
        dir
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_list_json_files_sorted() {
        let dir = create_test_dir();
        let files = list_json_files(dir.path(), None).unwrap();
        assert_eq!(
            names(&files),
            vec!["2000-data.json", "2014-data.json", "raw.JSON"]
        );
    }

    #[test]
    fn test_list_json_files_with_suffix() {
        let dir = create_test_dir();
        let files = list_json_files(dir.path(), Some("-data.json")).unwrap();
        assert_eq!(names(&files), vec!["2000-data.json", "2014-data.json"]);
    }

    #[test]
    fn test_list_json_files_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(list_json_files(dir.path(), None).unwrap().is_empty());
    }

    #[test]
    fn test_list_json_files_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("fourth jsons");
        let err = list_json_files(&missing, None).unwrap_err();
        assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
    }
}
