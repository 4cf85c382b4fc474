//! Reading an exported table set back into a snapshot.
//!
//! Columns are located by header, so column order in the files does not
//! matter, and every cell is parsed according to the type its header
//! declares. Conflicts are not part of the table set and come back empty.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use qgraph_model::{
    Edge, EdgeKind, GraphSnapshot, NodeId, OptionEdge, OptionNode, PaperNode, QuestionNode,
    RelationType, TaxonomyNode,
};

use crate::error::{ExportError, Result};
use crate::schema::{Column, Table};

/// Reads every table of a set written by [`export`](crate::export).
pub fn import(source_dir: &Path) -> Result<GraphSnapshot> {
    let mut snapshot = GraphSnapshot {
        questions: read_table(source_dir, Table::Questions, |row| {
            Ok(QuestionNode {
                id: row.id(0)?,
                question_no: row.text(1),
                question_text: row.text(2),
                marks: row.parsed(3)?,
                theoretical_practical: row.opt_text(4),
                year: row.parsed(5)?,
                paper_code: row.text(6),
                provenance: row.opt_text(7),
                confidence: row.parsed(8)?,
                correct_answer: row.opt_text(9),
                has_diagram: row.boolean(10)?,
            })
        })?,
        subjects: read_taxonomy(source_dir, Table::Subjects)?,
        chapters: read_taxonomy(source_dir, Table::Chapters)?,
        subtopics: read_taxonomy(source_dir, Table::Subtopics)?,
        papers: read_table(source_dir, Table::Papers, |row| {
            Ok(PaperNode {
                id: row.id(0)?,
                paper_code: row.text(1),
                year: row.parsed(2)?,
            })
        })?,
        options: read_table(source_dir, Table::Options, |row| {
            Ok(OptionNode {
                id: row.id(0)?,
                text: row.text(1),
                option_index: row.required(2)?,
            })
        })?,
        ..GraphSnapshot::default()
    };

    for kind in EdgeKind::ALL {
        let edges = read_table(source_dir, Table::Edges(kind), |row| {
            row.relation(2, kind.relation())?;
            Ok(Edge::new(row.id(0)?, row.id(1)?))
        })?;
        snapshot
            .edges
            .insert(kind, edges.into_iter().collect::<BTreeSet<_>>());
    }

    let mut option_edges = read_table(source_dir, Table::QuestionOption, |row| {
        row.relation(2, RelationType::HasOption)?;
        Ok(OptionEdge {
            question: row.id(0)?,
            option: row.id(1)?,
            is_correct: row.boolean(3)?,
        })
    })?;
    // Files list option edges by id text; snapshots by question, then position.
    let positions: HashMap<&NodeId, u32> = snapshot
        .options
        .iter()
        .map(|o| (&o.id, o.option_index))
        .collect();
    option_edges.sort_by_key(|e| (e.question.clone(), positions.get(&e.option).copied()));
    snapshot.option_edges = option_edges;

    debug!(
        source = %source_dir.display(),
        questions = snapshot.questions.len(),
        options = snapshot.options.len(),
        "imported table set"
    );
    Ok(snapshot)
}

fn read_taxonomy(dir: &Path, table: Table) -> Result<Vec<TaxonomyNode>> {
    read_table(dir, table, |row| {
        Ok(TaxonomyNode {
            id: row.id(0)?,
            name: row.text(1),
        })
    })
}

fn read_table<T>(
    dir: &Path,
    table: Table,
    mut parse: impl FnMut(&Row<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let path = dir.join(table.file_name());
    if !path.is_file() {
        return Err(ExportError::MissingTable { path });
    }
    let read_error = |e: csv::Error| ExportError::Read {
        path: path.clone(),
        message: e.to_string(),
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&path)
        .map_err(read_error)?;

    let header_positions: HashMap<String, usize> = reader
        .headers()
        .map_err(read_error)?
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().to_string(), idx))
        .collect();
    let columns = table.columns();
    let mut positions = Vec::with_capacity(columns.len());
    for column in &columns {
        let header = column.header();
        match header_positions.get(&header) {
            Some(idx) => positions.push(*idx),
            None => {
                return Err(ExportError::MissingColumn {
                    path: path.clone(),
                    column: header,
                });
            }
        }
    }

    let mut items = Vec::new();
    for record in reader.records() {
        let record = record.map_err(read_error)?;
        let row = Row {
            path: &path,
            line: record.position().map_or(0, csv::Position::line),
            columns: &columns,
            positions: &positions,
            record: &record,
        };
        items.push(parse(&row)?);
    }
    Ok(items)
}

/// One data row, addressed by column position in the table schema.
struct Row<'a> {
    path: &'a PathBuf,
    line: u64,
    columns: &'a [Column],
    positions: &'a [usize],
    record: &'a csv::StringRecord,
}

impl Row<'_> {
    fn cell(&self, column: usize) -> &str {
        self.positions
            .get(column)
            .and_then(|idx| self.record.get(*idx))
            .unwrap_or_default()
    }

    fn invalid(&self, column: usize) -> ExportError {
        ExportError::InvalidValue {
            path: self.path.clone(),
            line: self.line,
            column: self.columns.get(column).map(Column::header).unwrap_or_default(),
            value: self.cell(column).to_string(),
        }
    }

    fn text(&self, column: usize) -> String {
        self.cell(column).to_string()
    }

    fn opt_text(&self, column: usize) -> Option<String> {
        Some(self.cell(column)).filter(|v| !v.is_empty()).map(str::to_string)
    }

    fn id(&self, column: usize) -> Result<NodeId> {
        NodeId::new(self.cell(column)).map_err(|_| self.invalid(column))
    }

    /// Typed optional cell; empty means absent.
    fn parsed<T: FromStr>(&self, column: usize) -> Result<Option<T>> {
        let value = self.cell(column).trim();
        if value.is_empty() {
            return Ok(None);
        }
        value.parse().map(Some).map_err(|_| self.invalid(column))
    }

    fn required<T: FromStr>(&self, column: usize) -> Result<T> {
        self.parsed(column)?.ok_or_else(|| self.invalid(column))
    }

    fn boolean(&self, column: usize) -> Result<bool> {
        match self.cell(column).trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            _ => Err(self.invalid(column)),
        }
    }

    fn relation(&self, column: usize, expected: RelationType) -> Result<()> {
        match self.cell(column).parse::<RelationType>() {
            Ok(found) if found == expected => Ok(()),
            _ => Err(self.invalid(column)),
        }
    }
}
