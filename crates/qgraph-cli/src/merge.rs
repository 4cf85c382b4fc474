//! Writing cleaned taxonomy labels back into the question files.
//!
//! The counterpart of `split`: chunk files that came back from an external
//! cleaning pass are matched against the input records on
//! (year, paper code, canonical question number), and the matched records
//! take over the cleaned `question_no`, `subject`, `chapter` and `subtopic`.
//! Only files whose records actually changed are rewritten.

use std::collections::{BTreeMap, BTreeSet};
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, info, info_span, warn};

use qgraph_ingest::{list_json_files, read_json_array, write_json_array};
use qgraph_model::QuestionRecord;
use qgraph_normalize::canonical_question_no;

use crate::config::ExportConfig;
use crate::pipeline::{FileFailure, discover_inputs};

/// Fields a cleaned record overwrites in its source record.
pub const MERGED_FIELDS: [&str; 4] = ["question_no", "subject", "chapter", "subtopic"];

/// Chunk files are recognised by this name prefix.
const CHUNK_PREFIX: &str = "chunk";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct MergeKey {
    year: Option<i32>,
    paper_code: String,
    question_no: String,
}

impl MergeKey {
    fn of(object: &Map<String, Value>) -> Option<Self> {
        let record: QuestionRecord = serde_json::from_value(Value::Object(object.clone())).ok()?;
        Some(Self {
            year: record.year,
            paper_code: record.paper_code()?.to_string(),
            question_no: canonical_question_no(record.question_no()?)?,
        })
    }
}

/// A rewritten question file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedFile {
    pub path: PathBuf,
    pub questions_updated: usize,
}

/// Result of the merge command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub chunk_files: usize,
    /// Cleaned records carrying a usable key.
    pub cleaned_records: usize,
    /// Cleaned records without year, paper code or question number.
    pub unkeyed: usize,
    /// Input records a cleaned record was found for.
    pub matched: usize,
    /// Cleaned records no input record matched.
    pub unmatched: usize,
    pub files: Vec<MergedFile>,
    pub failures: Vec<FileFailure>,
}

impl MergeOutcome {
    pub fn questions_updated(&self) -> usize {
        self.files.iter().map(|f| f.questions_updated).sum()
    }
}

/// Applies the cleaned chunks in `chunks_dir` to the configured input files.
pub fn run_merge(config: &ExportConfig, chunks_dir: &Path) -> Result<MergeOutcome> {
    let span = info_span!("merge", chunks_dir = %chunks_dir.display());
    let _guard = span.enter();

    let mut outcome = MergeOutcome::default();
    let mut cleaned = load_cleaned(chunks_dir, &mut outcome)?;
    let mut used = BTreeSet::new();

    for path in discover_inputs(config)? {
        let mut items = match read_json_array(&path) {
            Ok(items) => items,
            Err(error) => {
                warn!(file = %path.display(), %error, "skipping unreadable file");
                outcome.failures.push(FileFailure {
                    path,
                    message: error.to_string(),
                });
                continue;
            }
        };

        let mut updated = 0usize;
        for item in &mut items {
            let Value::Object(object) = item else {
                continue;
            };
            let Some(key) = MergeKey::of(object) else {
                continue;
            };
            let Some(source) = cleaned.get(&key) else {
                continue;
            };
            outcome.matched += 1;
            used.insert(key);
            if apply_cleaned(object, source) {
                updated += 1;
            }
        }

        if updated == 0 {
            debug!(file = %path.display(), "no changes");
            continue;
        }
        write_json_array(&path, &items)
            .with_context(|| format!("rewrite {}", path.display()))?;
        info!(file = %path.display(), questions = updated, "updated file");
        outcome.files.push(MergedFile {
            path,
            questions_updated: updated,
        });
    }

    cleaned.retain(|key, _| !used.contains(key));
    outcome.unmatched = cleaned.len();
    for key in cleaned.keys() {
        debug!(
            year = ?key.year,
            paper_code = %key.paper_code,
            question_no = %key.question_no,
            "cleaned record matched no input record"
        );
    }
    info!(
        files = outcome.files.len(),
        questions = outcome.questions_updated(),
        unmatched = outcome.unmatched,
        "merge complete"
    );
    Ok(outcome)
}

/// Reads every chunk file; the first cleaned record for a key wins.
fn load_cleaned(
    chunks_dir: &Path,
    outcome: &mut MergeOutcome,
) -> Result<BTreeMap<MergeKey, Map<String, Value>>> {
    let chunk_paths: Vec<PathBuf> = list_json_files(chunks_dir, None)
        .with_context(|| format!("list chunk files in {}", chunks_dir.display()))?
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(CHUNK_PREFIX))
        })
        .collect();
    outcome.chunk_files = chunk_paths.len();

    let mut cleaned = BTreeMap::new();
    for path in chunk_paths {
        let items = match read_json_array(&path) {
            Ok(items) => items,
            Err(error) => {
                warn!(file = %path.display(), %error, "skipping unreadable chunk");
                outcome.failures.push(FileFailure {
                    path,
                    message: error.to_string(),
                });
                continue;
            }
        };
        for item in items {
            let Value::Object(object) = item else {
                outcome.unkeyed += 1;
                continue;
            };
            let Some(key) = MergeKey::of(&object) else {
                outcome.unkeyed += 1;
                continue;
            };
            outcome.cleaned_records += 1;
            match cleaned.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(object);
                }
                Entry::Occupied(slot) => {
                    warn!(
                        file = %path.display(),
                        question_no = %slot.key().question_no,
                        "duplicate cleaned record ignored"
                    );
                }
            }
        }
        debug!(file = %path.display(), "loaded chunk");
    }
    Ok(cleaned)
}

/// Copies the merged fields present in `source`; true when anything changed.
fn apply_cleaned(target: &mut Map<String, Value>, source: &Map<String, Value>) -> bool {
    let mut changed = false;
    for field in MERGED_FIELDS {
        let Some(value) = source.get(field) else {
            continue;
        };
        if target.get(field) != Some(value) {
            target.insert(field.to_string(), value.clone());
            changed = true;
        }
    }
    changed
}
