//! Pipeline stages: label loading, graph building, export and splitting.
//! Merging cleaned chunks back lives in [`crate::merge`].
//!
//! Each stage takes the [`ExportConfig`] explicitly. A file that cannot be
//! read or parsed is recorded as a [`FileFailure`] and the run continues with
//! the next file; a missing input directory or a failed export is fatal.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span, trace, warn};

use qgraph_graph::{BuildStats, GraphBuilder, IngestOutcome};
use qgraph_ingest::{
    list_json_files, read_json_array, read_question_file, taxonomy_view, write_chunks,
};
use qgraph_model::GraphSnapshot;
use qgraph_normalize::LabelTable;
use qgraph_output::{ExportReport, export};

use crate::config::ExportConfig;

/// A file that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Per-file counts from a graph build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    /// Array elements in the file.
    pub elements: usize,
    /// Elements that were not question objects.
    pub rejected: usize,
    /// Field values left empty because they could not be coerced.
    pub dropped_fields: usize,
    pub ingested: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

/// Everything a graph build produced.
#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    pub snapshot: GraphSnapshot,
    pub stats: BuildStats,
    pub files: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

impl BuildOutcome {
    pub fn files_processed(&self) -> usize {
        self.files.len()
    }

    pub fn rejected_records(&self) -> usize {
        self.files.iter().map(|f| f.rejected).sum()
    }

    pub fn dropped_fields(&self) -> usize {
        self.files.iter().map(|f| f.dropped_fields).sum()
    }

    pub fn records_read(&self) -> usize {
        self.files.iter().map(|f| f.elements).sum()
    }
}

/// Result of the export command.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub build: BuildOutcome,
    /// `None` on a dry run.
    pub report: Option<ExportReport>,
}

/// Result of the split command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitOutcome {
    pub output_dir: PathBuf,
    pub records: usize,
    pub chunks: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

/// Built-in label table with the configured user table layered on top.
pub fn load_labels(config: &ExportConfig) -> Result<LabelTable> {
    let mut labels = LabelTable::builtin().context("load built-in label table")?;
    if let Some(path) = &config.labels {
        let overlay = LabelTable::from_path(path)
            .with_context(|| format!("load label table {}", path.display()))?;
        debug!(path = %path.display(), rows = overlay.len(), "layered label table");
        labels.extend(overlay);
    }
    Ok(labels)
}

/// Question files of the input directory in processing order.
pub fn discover_inputs(config: &ExportConfig) -> Result<Vec<PathBuf>> {
    list_json_files(&config.input_dir, config.suffix())
        .with_context(|| format!("list input files in {}", config.input_dir.display()))
}

/// Reads every input file in name order and builds the graph.
pub fn build_graph(config: &ExportConfig, labels: LabelTable) -> Result<BuildOutcome> {
    let span = info_span!("build", input_dir = %config.input_dir.display());
    let _guard = span.enter();
    let start = Instant::now();

    let paths = discover_inputs(config)?;
    info!(files = paths.len(), "discovered input files");

    let mut builder = GraphBuilder::new(labels);
    let mut files = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();
    let mut records_since_progress = 0usize;

    for path in paths {
        let loaded = match read_question_file(&path) {
            Ok(loaded) => loaded,
            Err(error) => {
                warn!(file = %path.display(), %error, "skipping unreadable file");
                failures.push(FileFailure {
                    path,
                    message: error.to_string(),
                });
                continue;
            }
        };

        let mut report = FileReport {
            path: loaded.path.clone(),
            elements: loaded.element_count(),
            rejected: loaded.rejected.len(),
            dropped_fields: loaded.dropped_fields.len(),
            ..FileReport::default()
        };
        for record in &loaded.records {
            let outcome = builder.ingest(record);
            trace!(file = %path.display(), %outcome, "record");
            match outcome {
                IngestOutcome::Ingested(_) => report.ingested += 1,
                IngestOutcome::Duplicate(_) => report.duplicates += 1,
                IngestOutcome::Skipped(reason) => {
                    debug!(file = %path.display(), %reason, "skipped record");
                    report.skipped += 1;
                }
            }
            records_since_progress += 1;
            if records_since_progress >= config.batch_size {
                records_since_progress = 0;
                info!(
                    records = builder.stats().records_seen(),
                    questions = builder.question_count(),
                    "progress"
                );
            }
        }
        debug!(
            file = %path.display(),
            ingested = report.ingested,
            duplicates = report.duplicates,
            skipped = report.skipped,
            "processed file"
        );
        files.push(report);
    }

    let stats = builder.stats().clone();
    let snapshot = builder.finalize();
    info!(
        files = files.len(),
        failed = failures.len(),
        questions = snapshot.questions.len(),
        conflicts = snapshot.conflicts.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "graph built"
    );
    Ok(BuildOutcome {
        snapshot,
        stats,
        files,
        failures,
    })
}

/// Builds the graph and writes the table set, unless `dry_run` is set.
pub fn run_export(config: &ExportConfig, dry_run: bool) -> Result<ExportOutcome> {
    let labels = load_labels(config)?;
    let build = build_graph(config, labels)?;
    let report = if dry_run {
        info!("dry run, no tables written");
        None
    } else {
        let report = export(&build.snapshot, &config.output_dir)
            .with_context(|| format!("export tables to {}", config.output_dir.display()))?;
        Some(report)
    };
    Ok(ExportOutcome { build, report })
}

/// Concatenates the raw records of every input file and writes them out in
/// chunks of `chunk_size`.
///
/// Records are copied untouched unless `taxonomy_only` is set, in which case
/// each one is reduced to its key, text and taxonomy fields and non-object
/// elements are left out.
pub fn run_split(
    config: &ExportConfig,
    output_dir: &Path,
    chunk_size: usize,
    taxonomy_only: bool,
) -> Result<SplitOutcome> {
    let span = info_span!("split", output_dir = %output_dir.display(), chunk_size, taxonomy_only);
    let _guard = span.enter();

    let mut items = Vec::new();
    let mut failures = Vec::new();
    for path in discover_inputs(config)? {
        match read_json_array(&path) {
            Ok(values) => {
                debug!(file = %path.display(), records = values.len(), "read file");
                if taxonomy_only {
                    items.extend(values.iter().filter_map(taxonomy_view));
                } else {
                    items.extend(values);
                }
            }
            Err(error) => {
                warn!(file = %path.display(), %error, "skipping unreadable file");
                failures.push(FileFailure {
                    path,
                    message: error.to_string(),
                });
            }
        }
    }

    let chunks = write_chunks(&items, chunk_size, output_dir)
        .with_context(|| format!("write chunks to {}", output_dir.display()))?;
    info!(records = items.len(), chunks = chunks.len(), "split complete");
    Ok(SplitOutcome {
        output_dir: output_dir.to_path_buf(),
        records: items.len(),
        chunks: chunks.into_iter().map(|c| c.path).collect(),
        failures,
    })
}
