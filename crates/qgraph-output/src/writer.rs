//! Writing a graph snapshot as a Neo4j import table set.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use qgraph_model::{Edge, EdgeKind, GraphSnapshot, OptionEdge, TaxonomyNode};

use crate::error::{ExportError, Result};
use crate::schema::Table;

const STAGING_PREFIX: &str = ".qgraph-staging-";

/// One written table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: Table,
    pub path: PathBuf,
    /// Data rows, excluding the header.
    pub rows: usize,
}

/// Outcome of an export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub output_dir: PathBuf,
    pub tables: Vec<TableReport>,
}

impl ExportReport {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }

    pub fn rows(&self, table: Table) -> Option<usize> {
        self.tables.iter().find(|t| t.table == table).map(|t| t.rows)
    }
}

/// Writes every table of `snapshot` into `output_dir`.
///
/// Tables are first written into a staging directory inside `output_dir` and
/// moved into place only once all of them were written. Previous tables are
/// set aside while the new set is moved in and restored if any move fails,
/// so the directory holds either the old set or the new one. Empty
/// collections still produce a header-only file.
pub fn export(snapshot: &GraphSnapshot, output_dir: &Path) -> Result<ExportReport> {
    let span = info_span!("export", output_dir = %output_dir.display());
    let _guard = span.enter();
    let start = Instant::now();

    fs::create_dir_all(output_dir).map_err(|source| ExportError::CreateDirectory {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(output_dir)
        .map_err(|source| ExportError::Staging {
            path: output_dir.to_path_buf(),
            source,
        })?;

    let mut staged = Vec::with_capacity(Table::ALL.len());
    for table in Table::ALL {
        let path = staging.path().join(table.file_name());
        let rows = write_table(snapshot, table, &path)?;
        debug!(table = table.file_name(), rows, "staged table");
        staged.push((table, path, rows));
    }

    let tables = commit(staged, staging.path(), output_dir)?;
    let report = ExportReport {
        output_dir: output_dir.to_path_buf(),
        tables,
    };

    info!(
        tables = report.tables.len(),
        rows = report.total_rows(),
        duration_ms = start.elapsed().as_millis() as u64,
        "export complete"
    );
    Ok(report)
}

/// Moves the staged tables into `output_dir`, rolling back on failure.
fn commit(
    staged: Vec<(Table, PathBuf, usize)>,
    staging: &Path,
    output_dir: &Path,
) -> Result<Vec<TableReport>> {
    for (table, _, _) in &staged {
        let to = output_dir.join(table.file_name());
        if to.symlink_metadata().is_ok_and(|meta| !meta.is_file()) {
            return Err(ExportError::Occupied { path: to });
        }
    }

    let backup_dir = staging.join("previous");
    fs::create_dir(&backup_dir).map_err(|source| ExportError::Staging {
        path: staging.to_path_buf(),
        source,
    })?;

    let mut moved: Vec<Moved> = Vec::with_capacity(staged.len());
    let mut tables = Vec::with_capacity(staged.len());
    for (table, from, rows) in staged {
        let to = output_dir.join(table.file_name());
        let backup = backup_dir.join(table.file_name());
        let had_previous = to.exists();
        let step = move_into_place(&from, &to, &backup, had_previous);
        if let Err(error) = step {
            warn!(table = table.file_name(), %error, "commit failed, restoring previous tables");
            rollback(&moved);
            return Err(error);
        }
        moved.push(Moved {
            to: to.clone(),
            backup: had_previous.then_some(backup),
        });
        tables.push(TableReport {
            table,
            path: to,
            rows,
        });
    }
    Ok(tables)
}

struct Moved {
    to: PathBuf,
    /// Where the replaced table was set aside, if there was one.
    backup: Option<PathBuf>,
}

fn move_into_place(from: &Path, to: &Path, backup: &Path, had_previous: bool) -> Result<()> {
    let commit_error = |from: &Path, to: &Path, source: std::io::Error| ExportError::Commit {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    if had_previous {
        fs::rename(to, backup).map_err(|source| commit_error(to, backup, source))?;
    }
    if let Err(source) = fs::rename(from, to) {
        if had_previous && let Err(error) = fs::rename(backup, to) {
            warn!(path = %to.display(), %error, "could not restore previous table");
        }
        return Err(commit_error(from, to, source));
    }
    Ok(())
}

fn rollback(moved: &[Moved]) {
    for entry in moved.iter().rev() {
        let restored = match &entry.backup {
            Some(backup) => fs::rename(backup, &entry.to),
            None => fs::remove_file(&entry.to),
        };
        if let Err(error) = restored {
            warn!(path = %entry.to.display(), %error, "could not restore previous table");
        }
    }
}

fn write_table(snapshot: &GraphSnapshot, table: Table, path: &Path) -> Result<usize> {
    let write_error = |e: csv::Error| ExportError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(write_error)?;
    writer.write_record(table.headers()).map_err(write_error)?;

    let rows = table_rows(snapshot, table);
    for row in &rows {
        writer.write_record(row).map_err(write_error)?;
    }
    writer.flush().map_err(|e| ExportError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(rows.len())
}

/// Rendered data rows of one table, in output order.
pub fn table_rows(snapshot: &GraphSnapshot, table: Table) -> Vec<Vec<String>> {
    match table {
        Table::Questions => snapshot
            .questions
            .iter()
            .map(|q| {
                vec![
                    q.id.to_string(),
                    q.question_no.clone(),
                    q.question_text.clone(),
                    opt_cell(q.marks),
                    q.theoretical_practical.clone().unwrap_or_default(),
                    opt_cell(q.year),
                    q.paper_code.clone(),
                    q.provenance.clone().unwrap_or_default(),
                    opt_cell(q.confidence),
                    q.correct_answer.clone().unwrap_or_default(),
                    q.has_diagram.to_string(),
                ]
            })
            .collect(),
        Table::Subjects => taxonomy_rows(&snapshot.subjects),
        Table::Chapters => taxonomy_rows(&snapshot.chapters),
        Table::Subtopics => taxonomy_rows(&snapshot.subtopics),
        Table::Papers => snapshot
            .papers
            .iter()
            .map(|p| vec![p.id.to_string(), p.paper_code.clone(), opt_cell(p.year)])
            .collect(),
        Table::Options => snapshot
            .options
            .iter()
            .map(|o| vec![o.id.to_string(), o.text.clone(), o.option_index.to_string()])
            .collect(),
        Table::Edges(kind) => edge_rows(snapshot.edges(kind), kind),
        Table::QuestionOption => option_edge_rows(&snapshot.option_edges),
    }
}

fn taxonomy_rows(nodes: &[TaxonomyNode]) -> Vec<Vec<String>> {
    nodes
        .iter()
        .map(|n| vec![n.id.to_string(), n.name.clone()])
        .collect()
}

fn edge_rows<'a>(edges: impl Iterator<Item = &'a Edge>, kind: EdgeKind) -> Vec<Vec<String>> {
    let relation = kind.relation().to_string();
    let mut rows: Vec<Vec<String>> = edges
        .map(|e| vec![e.start.to_string(), e.end.to_string(), relation.clone()])
        .collect();
    rows.sort();
    rows
}

fn option_edge_rows(edges: &[OptionEdge]) -> Vec<Vec<String>> {
    let relation = Table::QuestionOption
        .relation()
        .map(|r| r.to_string())
        .unwrap_or_default();
    let mut rows: Vec<Vec<String>> = edges
        .iter()
        .map(|e| {
            vec![
                e.question.to_string(),
                e.option.to_string(),
                relation.clone(),
                e.is_correct.to_string(),
            ]
        })
        .collect();
    rows.sort();
    rows
}

/// Absent values are written as empty cells.
fn opt_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qgraph_model::{NodeId, OptionNode, PaperNode, QuestionNode};
    use std::collections::{BTreeMap, BTreeSet};
    use tempfile::TempDir;

    fn id(value: &str) -> NodeId {
        NodeId::new(value).unwrap()
    }

    fn snapshot() -> GraphSnapshot {
        let qid = id("Q-2014-CS-Q-1");
        let mut edges = BTreeMap::new();
        edges.insert(
            EdgeKind::QuestionPaper,
            BTreeSet::from([Edge::new(qid.clone(), id("P-2014-CS"))]),
        );
        GraphSnapshot {
            questions: vec![QuestionNode {
                id: qid.clone(),
                question_no: "Q.1".to_string(),
                question_text: "Pick one, \"carefully\"".to_string(),
                marks: Some(2.0),
                theoretical_practical: None,
                year: Some(2014),
                paper_code: "CS".to_string(),
                provenance: None,
                confidence: Some(0.75),
                correct_answer: Some("B".to_string()),
                has_diagram: false,
            }],
            papers: vec![PaperNode {
                id: id("P-2014-CS"),
                paper_code: "CS".to_string(),
                year: Some(2014),
            }],
            options: vec![OptionNode {
                id: id("Q-2014-CS-Q-1-OPT-1"),
                text: "x".to_string(),
                option_index: 1,
            }],
            option_edges: vec![OptionEdge {
                question: qid,
                option: id("Q-2014-CS-Q-1-OPT-1"),
                is_correct: true,
            }],
            edges,
            ..GraphSnapshot::default()
        }
    }

    #[test]
    fn question_rows_render_absent_values_as_empty() {
        let rows = table_rows(&snapshot(), Table::Questions);
        assert_eq!(
            rows[0],
            vec![
                "Q-2014-CS-Q-1",
                "Q.1",
                "Pick one, \"carefully\"",
                "2",
                "",
                "2014",
                "CS",
                "",
                "0.75",
                "B",
                "false"
            ]
        );
    }

    #[test]
    fn writes_every_table_with_headers() {
        let dir = TempDir::new().unwrap();
        let report = export(&snapshot(), dir.path()).unwrap();
        assert_eq!(report.tables.len(), Table::ALL.len());
        assert_eq!(report.rows(Table::Subjects), Some(0));
        assert_eq!(report.rows(Table::QuestionOption), Some(1));

        let subjects = fs::read_to_string(dir.path().join("subjects.csv")).unwrap();
        assert_eq!(subjects, "subjectId:ID(Subject),name\n");

        let option_edges = fs::read_to_string(dir.path().join("question_option.csv")).unwrap();
        assert_eq!(
            option_edges,
            ":START_ID(Question),:END_ID(Option),:TYPE,is_correct:Boolean\n\
             Q-2014-CS-Q-1,Q-2014-CS-Q-1-OPT-1,HAS_OPTION,true\n"
        );

        let questions = fs::read_to_string(dir.path().join("questions.csv")).unwrap();
        assert!(questions.contains("\"Pick one, \"\"carefully\"\"\""));
    }

    #[test]
    fn staging_directory_is_removed() {
        let dir = TempDir::new().unwrap();
        export(&snapshot(), dir.path()).unwrap();
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(STAGING_PREFIX))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn reexport_replaces_previous_tables() {
        let dir = TempDir::new().unwrap();
        export(&snapshot(), dir.path()).unwrap();
        export(&GraphSnapshot::default(), dir.path()).unwrap();
        let questions = fs::read_to_string(dir.path().join("questions.csv")).unwrap();
        assert_eq!(questions.lines().count(), 1);
    }

    #[test]
    fn blocked_destination_leaves_previous_tables_in_place() {
        let dir = TempDir::new().unwrap();
        export(&GraphSnapshot::default(), dir.path()).unwrap();
        let before = fs::read_to_string(dir.path().join("questions.csv")).unwrap();

        let blocked = dir.path().join(Table::QuestionOption.file_name());
        fs::remove_file(&blocked).unwrap();
        fs::create_dir(&blocked).unwrap();

        let err = export(&snapshot(), dir.path()).unwrap_err();
        assert!(matches!(err, ExportError::Occupied { .. }));
        let after = fs::read_to_string(dir.path().join("questions.csv")).unwrap();
        assert_eq!(before, after);
        assert!(blocked.is_dir());
    }

    #[test]
    fn rollback_restores_replaced_and_removes_new_tables() {
        let dir = TempDir::new().unwrap();
        let backup = dir.path().join("old.csv");
        let replaced = dir.path().join("replaced.csv");
        let added = dir.path().join("added.csv");
        fs::write(&backup, "old\n").unwrap();
        fs::write(&replaced, "new\n").unwrap();
        fs::write(&added, "new\n").unwrap();

        rollback(&[
            Moved {
                to: replaced.clone(),
                backup: Some(backup.clone()),
            },
            Moved {
                to: added.clone(),
                backup: None,
            },
        ]);

        assert_eq!(fs::read_to_string(&replaced).unwrap(), "old\n");
        assert!(!added.exists());
        assert!(!backup.exists());
    }

    #[test]
    fn edge_rows_are_sorted_by_start_then_end() {
        let option_edges = vec![
            OptionEdge {
                question: id("Q-B"),
                option: id("Q-B-OPT-1"),
                is_correct: false,
            },
            OptionEdge {
                question: id("Q-A"),
                option: id("Q-A-OPT-2"),
                is_correct: false,
            },
            OptionEdge {
                question: id("Q-A"),
                option: id("Q-A-OPT-1"),
                is_correct: true,
            },
        ];
        let snapshot = GraphSnapshot {
            option_edges,
            ..GraphSnapshot::default()
        };
        let ends: Vec<String> = table_rows(&snapshot, Table::QuestionOption)
            .into_iter()
            .map(|row| row[1].clone())
            .collect();
        assert_eq!(ends, vec!["Q-A-OPT-1", "Q-A-OPT-2", "Q-B-OPT-1"]);
    }
}
