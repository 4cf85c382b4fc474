use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use qgraph_cli::analyze::{AnalysisReport, LabelUsage, QuestionNoFormat};
use qgraph_cli::merge::MergeOutcome;
use qgraph_cli::pipeline::{ExportOutcome, FileFailure, SplitOutcome};
use qgraph_model::NodeLabel;
use qgraph_normalize::LabelTable;
use qgraph_output::Table as OutputTable;

pub fn print_export_summary(outcome: &ExportOutcome) {
    let build = &outcome.build;
    match &outcome.report {
        Some(report) => println!("Output: {}", report.output_dir.display()),
        None => println!("Output: none (dry run)"),
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let stats = &build.stats;
    table.add_row(vec![Cell::new("Files processed"), Cell::new(build.files_processed())]);
    table.add_row(vec![
        Cell::new("Files failed"),
        count_cell(build.failures.len(), Color::Red),
    ]);
    table.add_row(vec![Cell::new("Records read"), Cell::new(build.records_read())]);
    table.add_row(vec![
        Cell::new("Records rejected"),
        count_cell(build.rejected_records(), Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Fields dropped"),
        count_cell(build.dropped_fields(), Color::Yellow),
    ]);
    table.add_row(vec![Cell::new("Questions ingested"), Cell::new(stats.ingested)]);
    table.add_row(vec![Cell::new("Duplicates"), dim_cell(stats.duplicates)]);
    for (reason, count) in &stats.skipped {
        table.add_row(vec![
            Cell::new(format!("Skipped ({reason})")),
            count_cell(*count, Color::Yellow),
        ]);
    }
    table.add_row(vec![Cell::new("Answers resolved"), Cell::new(stats.answers_resolved)]);
    table.add_row(vec![
        Cell::new("Answers unresolved"),
        count_cell(stats.answers_unresolved, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Taxonomy conflicts"),
        count_cell(build.snapshot.conflicts.len(), Color::Yellow),
    ]);
    println!("{table}");

    print_graph_table(outcome);
    print_conflicts(outcome);
    print_failures(&build.failures);
}

fn print_graph_table(outcome: &ExportOutcome) {
    let snapshot = &outcome.build.snapshot;
    let counts = snapshot.counts();
    let mut table = Table::new();
    table.set_header(vec![header_cell("Table"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for output in OutputTable::ALL {
        let rows = match output {
            OutputTable::Questions => counts.nodes.get(&NodeLabel::Question),
            OutputTable::Subjects => counts.nodes.get(&NodeLabel::Subject),
            OutputTable::Chapters => counts.nodes.get(&NodeLabel::Chapter),
            OutputTable::Subtopics => counts.nodes.get(&NodeLabel::Subtopic),
            OutputTable::Papers => counts.nodes.get(&NodeLabel::Paper),
            OutputTable::Options => counts.nodes.get(&NodeLabel::Option),
            OutputTable::Edges(kind) => counts.edges.get(&kind),
            OutputTable::QuestionOption => Some(&counts.option_edges),
        }
        .copied()
        .unwrap_or_default();
        let label = match output.relation() {
            Some(relation) => format!("{output} ({relation})"),
            None => output.to_string(),
        };
        table.add_row(vec![Cell::new(label), Cell::new(rows)]);
    }
    table.add_row(vec![
        Cell::new("Nodes")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(counts.total_nodes()).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Relationships")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(counts.total_edges()).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

fn print_conflicts(outcome: &ExportOutcome) {
    let conflicts = &outcome.build.snapshot.conflicts;
    if conflicts.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Node"),
        header_cell("Kept parent"),
        header_cell("Rejected parent"),
        header_cell("First rejected by"),
    ]);
    apply_table_style(&mut table);
    for conflict in conflicts {
        table.add_row(vec![
            Cell::new(&conflict.child),
            Cell::new(&conflict.kept_parent),
            Cell::new(&conflict.rejected_parent).fg(Color::Yellow),
            dim_cell(&conflict.question),
        ]);
    }
    println!();
    println!("Taxonomy conflicts:");
    println!("{table}");
}

fn print_failures(failures: &[FileFailure]) {
    if failures.is_empty() {
        return;
    }
    eprintln!("Errors:");
    for failure in failures {
        eprintln!("- {}: {}", failure.path.display(), failure.message);
    }
}

pub fn print_analysis(report: &AnalysisReport) {
    println!(
        "Analyzed {} files, {} records ({} non-object elements)",
        report.files.len(),
        report.records,
        report.non_objects
    );

    let mut fields = Table::new();
    fields.set_header(vec![header_cell("Field"), header_cell("Records")]);
    apply_table_style(&mut fields);
    align_column(&mut fields, 1, CellAlignment::Right);
    for (field, count) in &report.field_counts {
        let cell = if *count < report.records {
            Cell::new(count).fg(Color::Yellow)
        } else {
            Cell::new(count)
        };
        fields.add_row(vec![Cell::new(field), cell]);
    }
    println!("{fields}");

    if !report.field_differences.is_empty() {
        let reference = report.reference_file.as_deref().unwrap_or("-");
        println!();
        println!("Field sets differing from {reference}:");
        let mut table = Table::new();
        table.set_header(vec![header_cell("File"), header_cell("Missing"), header_cell("Extra")]);
        apply_table_style(&mut table);
        for diff in &report.field_differences {
            table.add_row(vec![
                Cell::new(&diff.file),
                list_cell(&diff.missing),
                list_cell(&diff.extra),
            ]);
        }
        println!("{table}");
    }

    let mut formats = Table::new();
    formats.set_header(vec![header_cell("Question number format"), header_cell("Records")]);
    apply_table_style(&mut formats);
    align_column(&mut formats, 1, CellAlignment::Right);
    for format in QuestionNoFormat::ALL {
        let count = report.question_no_formats.get(&format).copied().unwrap_or_default();
        formats.add_row(vec![Cell::new(format), Cell::new(count)]);
    }
    println!();
    println!("{formats}");
    for (file, used) in &report.mixed_format_files {
        let used: Vec<&str> = used.iter().copied().map(QuestionNoFormat::as_str).collect();
        println!("  mixed formats in {file}: {}", used.join(", "));
    }

    if !report.subtopic_issues.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![header_cell("File"), header_cell("Subtopic"), header_cell("Issue")]);
        apply_table_style(&mut table);
        for issue in &report.subtopic_issues {
            table.add_row(vec![
                Cell::new(&issue.file),
                Cell::new(&issue.subtopic),
                Cell::new(issue.kind).fg(Color::Yellow),
            ]);
        }
        println!();
        println!("Subtopic issues:");
        println!("{table}");
    }

    print_label_usage("Subjects", &report.subjects);
    print_label_usage("Chapters", &report.chapters);

    if !report.near_duplicates.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Scope"),
            header_cell("Label"),
            header_cell("Similar to"),
            header_cell("Similarity"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 3, CellAlignment::Right);
        for pair in &report.near_duplicates {
            table.add_row(vec![
                Cell::new(pair.scope),
                Cell::new(&pair.left),
                Cell::new(&pair.right),
                Cell::new(format!("{:.3}", pair.similarity)).fg(Color::Yellow),
            ]);
        }
        println!();
        println!("Possible duplicate labels not unified by the label table:");
        println!("{table}");
    }

    print_failures(&report.failures);
}

fn print_label_usage(title: &str, usages: &[LabelUsage]) {
    if usages.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Label"),
        header_cell("Canonical"),
        header_cell("Records"),
        header_cell("Files"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for usage in usages {
        let canonical = match &usage.canonical {
            Some(canonical) if *canonical == usage.raw => dim_cell(canonical),
            Some(canonical) => Cell::new(canonical).fg(Color::Green),
            None => dim_cell("(dropped)"),
        };
        table.add_row(vec![
            Cell::new(&usage.raw),
            canonical,
            Cell::new(usage.count),
            Cell::new(usage.files.len()),
        ]);
    }
    println!();
    println!("{title}:");
    println!("{table}");
}

pub fn print_labels(labels: &LabelTable) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Scope"), header_cell("Variant"), header_cell("Canonical")]);
    apply_table_style(&mut table);
    for entry in labels.entries() {
        table.add_row(vec![
            dim_cell(entry.scope),
            Cell::new(&entry.variant),
            Cell::new(&entry.canonical),
        ]);
    }
    println!("{table}");
    println!("{} rows", labels.len());
}

pub fn print_split_summary(outcome: &SplitOutcome) {
    println!(
        "Wrote {} records in {} chunks to {}",
        outcome.records,
        outcome.chunks.len(),
        outcome.output_dir.display()
    );
    print_failures(&outcome.failures);
}

pub fn print_merge_summary(outcome: &MergeOutcome) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Merge"), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Chunk files"), Cell::new(outcome.chunk_files)]);
    table.add_row(vec![Cell::new("Cleaned records"), Cell::new(outcome.cleaned_records)]);
    table.add_row(vec![
        Cell::new("Cleaned records without key"),
        count_cell(outcome.unkeyed, Color::Yellow),
    ]);
    table.add_row(vec![Cell::new("Questions matched"), Cell::new(outcome.matched)]);
    table.add_row(vec![
        Cell::new("Questions updated"),
        Cell::new(outcome.questions_updated()),
    ]);
    table.add_row(vec![
        Cell::new("Cleaned records unmatched"),
        count_cell(outcome.unmatched, Color::Yellow),
    ]);
    table.add_row(vec![Cell::new("Files updated"), Cell::new(outcome.files.len())]);
    println!("{table}");
    for file in &outcome.files {
        println!("  {}: {} questions", file.path.display(), file.questions_updated);
    }
    print_failures(&outcome.failures);
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn list_cell(values: &[String]) -> Cell {
    if values.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(values.join(", "))
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
