//! Question graph exporter CLI.

use clap::{ColorChoice, Parser};
use qgraph_cli::logging::{LogConfig, LogFormat, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, ExportArgs, LogFormatArg, LogLevelArg};
use crate::commands::{
    run_analyze_command, run_export_command, run_labels_command, run_merge_command,
    run_split_command,
};
use crate::summary::{
    print_analysis, print_export_summary, print_labels, print_merge_summary, print_split_summary,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let command = cli
        .command
        .unwrap_or_else(|| Command::Export(ExportArgs::default()));
    let exit_code = match command {
        Command::Export(args) => match run_export_command(&args) {
            Ok(outcome) => {
                print_export_summary(&outcome);
                if args.fail_on_file_errors && !outcome.build.failures.is_empty() {
                    1
                } else {
                    0
                }
            }
            Err(error) => report_error(&error),
        },
        Command::Analyze(args) => match run_analyze_command(&args) {
            Ok(report) => {
                print_analysis(&report);
                0
            }
            Err(error) => report_error(&error),
        },
        Command::Split(args) => match run_split_command(&args) {
            Ok(outcome) => {
                print_split_summary(&outcome);
                0
            }
            Err(error) => report_error(&error),
        },
        Command::Merge(args) => match run_merge_command(&args) {
            Ok(outcome) => {
                print_merge_summary(&outcome);
                0
            }
            Err(error) => report_error(&error),
        },
        Command::Labels(args) => match run_labels_command(&args) {
            Ok(labels) => {
                print_labels(&labels);
                0
            }
            Err(error) => report_error(&error),
        },
    };
    std::process::exit(exit_code);
}

fn report_error(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
