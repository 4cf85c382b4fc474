use anyhow::Result;
use tracing::info_span;

use qgraph_cli::analyze::{AnalysisReport, analyze_inputs};
use qgraph_cli::config::{ConfigOverrides, ExportConfig};
use qgraph_cli::merge::{MergeOutcome, run_merge};
use qgraph_cli::pipeline::{ExportOutcome, SplitOutcome, load_labels, run_export, run_split};
use qgraph_normalize::LabelTable;

use crate::cli::{ExportArgs, InputArgs, MergeArgs, SplitArgs};

pub fn run_export_command(args: &ExportArgs) -> Result<ExportOutcome> {
    let overrides = ConfigOverrides {
        output_dir: args.output_dir.clone(),
        batch_size: args.batch_size,
        ..args.input.overrides()
    };
    let config = ExportConfig::resolve(args.input.config.as_deref(), overrides)?;
    let span = info_span!(
        "export_command",
        input_dir = %config.input_dir.display(),
        output_dir = %config.output_dir.display(),
        dry_run = args.dry_run
    );
    let _guard = span.enter();
    run_export(&config, args.dry_run)
}

pub fn run_analyze_command(args: &InputArgs) -> Result<AnalysisReport> {
    let config = ExportConfig::resolve(args.config.as_deref(), args.overrides())?;
    let labels = load_labels(&config)?;
    analyze_inputs(&config, &labels)
}

pub fn run_split_command(args: &SplitArgs) -> Result<SplitOutcome> {
    let overrides = ConfigOverrides {
        batch_size: args.chunk_size,
        ..args.input.overrides()
    };
    let config = ExportConfig::resolve(args.input.config.as_deref(), overrides)?;
    run_split(&config, &args.output_dir, config.batch_size, args.taxonomy_only)
}

pub fn run_merge_command(args: &MergeArgs) -> Result<MergeOutcome> {
    let config = ExportConfig::resolve(args.input.config.as_deref(), args.input.overrides())?;
    run_merge(&config, &args.chunks_dir)
}

pub fn run_labels_command(args: &InputArgs) -> Result<LabelTable> {
    let config = ExportConfig::resolve(args.config.as_deref(), args.overrides())?;
    load_labels(&config)
}
