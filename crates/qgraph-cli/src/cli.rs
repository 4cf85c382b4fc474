//! CLI argument definitions for the question graph exporter.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use qgraph_cli::config::ConfigOverrides;

#[derive(Parser)]
#[command(
    name = "qgraph",
    version,
    about = "Exam question graph exporter - normalize scraped questions into Neo4j import tables",
    long_about = "Normalize scraped exam questions and export them as Neo4j bulk-import tables.\n\n\
                  Without a subcommand, runs `export` with the default directories\n\
                  (`fourth jsons` in, `neo4j_import` out)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the question graph and write the Neo4j import tables (default).
    Export(ExportArgs),

    /// Report field, question-number and label inconsistencies in the input.
    Analyze(InputArgs),

    /// Split the input records into fixed-size chunk files.
    Split(SplitArgs),

    /// Write cleaned labels from chunk files back into the input files.
    Merge(MergeArgs),

    /// Print the effective label table.
    Labels(InputArgs),
}

/// Where the input comes from and how labels are normalized.
#[derive(Args, Default)]
pub struct InputArgs {
    /// TOML config file; command-line flags take precedence over it.
    #[arg(long = "config", value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Directory with the question JSON files (default: `fourth jsons`).
    #[arg(long = "input-dir", value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Label table CSV (`scope,variant,canonical`) layered over the built-in one.
    #[arg(long = "labels", value_name = "CSV")]
    pub labels: Option<PathBuf>,

    /// Only read files whose name ends with this suffix, e.g. `-data.json`.
    #[arg(long = "file-suffix", value_name = "SUFFIX")]
    pub file_suffix: Option<String>,
}

impl InputArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input_dir: self.input_dir.clone(),
            labels: self.labels.clone(),
            file_suffix: self.file_suffix.clone(),
            ..ConfigOverrides::default()
        }
    }
}

#[derive(Args, Default)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Directory for the CSV tables (default: `neo4j_import`).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Records between progress log lines (default: 100).
    #[arg(long = "batch-size", value_name = "N")]
    pub batch_size: Option<usize>,

    /// Build the graph and print the summary without writing tables.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Exit non-zero when any input file could not be read.
    #[arg(long = "fail-on-file-errors")]
    pub fail_on_file_errors: bool,
}

#[derive(Args)]
pub struct SplitArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Directory for the chunk files.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "llm_chunks")]
    pub output_dir: PathBuf,

    /// Records per chunk (default: the configured batch size).
    #[arg(long = "chunk-size", value_name = "N")]
    pub chunk_size: Option<usize>,

    /// Keep only year, paper code, question number, text and taxonomy labels.
    #[arg(long = "taxonomy-only")]
    pub taxonomy_only: bool,
}

#[derive(Args)]
pub struct MergeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Directory with the cleaned `chunk*.json` files.
    #[arg(long = "chunks-dir", value_name = "DIR", default_value = "llm_chunks")]
    pub chunks_dir: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
