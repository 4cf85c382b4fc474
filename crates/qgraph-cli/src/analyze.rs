//! Consistency analysis of the raw question files.
//!
//! Works on the JSON as scraped, before any normalization, and reports what
//! the exporter would have to smooth over: uneven field sets, mixed
//! question-number formats, stray periods in subtopics, and taxonomy labels
//! that look alike but are not unified by the label table.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use anyhow::Result;
use rapidfuzz::distance::jaro_winkler;
use serde_json::{Map, Value};
use tracing::{debug, info_span, warn};

use qgraph_ingest::read_json_array;
use qgraph_normalize::{LabelScope, LabelTable, normalize_text};

use crate::config::ExportConfig;
use crate::pipeline::{FileFailure, discover_inputs};

/// Jaro-Winkler similarity at or above which two canonical labels are reported.
pub const NEAR_DUPLICATE_THRESHOLD: f64 = 0.92;

/// Shape of a raw `question_no` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuestionNoFormat {
    /// `Q.1`, `Q.1 (GA)`
    DotPrefixed,
    /// `Q1`
    Prefixed,
    /// `1`
    NumericOnly,
    /// `1 (GA)` and other annotated numbers without a prefix
    WithGa,
    Other,
}

impl QuestionNoFormat {
    pub const ALL: [QuestionNoFormat; 5] = [
        QuestionNoFormat::DotPrefixed,
        QuestionNoFormat::Prefixed,
        QuestionNoFormat::NumericOnly,
        QuestionNoFormat::WithGa,
        QuestionNoFormat::Other,
    ];

    /// First matching shape wins, so `Q.1 (GA)` counts as dot-prefixed.
    pub fn classify(raw: &str) -> Self {
        if raw.starts_with("Q.") {
            Self::DotPrefixed
        } else if raw.starts_with('Q') {
            Self::Prefixed
        } else if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
            Self::NumericOnly
        } else if raw.contains("(GA)") {
            Self::WithGa
        } else {
            Self::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DotPrefixed => "Q.1",
            Self::Prefixed => "Q1",
            Self::NumericOnly => "1",
            Self::WithGa => "with (GA)",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for QuestionNoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SubtopicIssueKind {
    LeadingPeriod,
    TrailingPeriod,
}

impl fmt::Display for SubtopicIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LeadingPeriod => "leading period",
            Self::TrailingPeriod => "trailing period",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtopicIssue {
    pub file: String,
    pub subtopic: String,
    pub kind: SubtopicIssueKind,
}

/// A file whose field set differs from the reference file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDifference {
    pub file: String,
    pub missing: Vec<String>,
    pub extra: Vec<String>,
}

/// One distinct raw label and what the label table turns it into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelUsage {
    pub raw: String,
    /// `None` when the label normalizes to nothing, e.g. `Question 12`.
    pub canonical: Option<String>,
    pub count: usize,
    pub files: BTreeSet<String>,
}

/// Two canonical labels that are probably the same thing.
#[derive(Debug, Clone, PartialEq)]
pub struct NearDuplicate {
    pub scope: LabelScope,
    pub left: String,
    pub right: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub files: Vec<String>,
    pub failures: Vec<FileFailure>,
    /// Array elements that were not objects.
    pub non_objects: usize,
    pub records: usize,
    pub field_counts: BTreeMap<String, usize>,
    /// File whose field set the others are compared with.
    pub reference_file: Option<String>,
    pub field_differences: Vec<FieldDifference>,
    pub question_no_formats: BTreeMap<QuestionNoFormat, usize>,
    /// Files using more than one question-number format.
    pub mixed_format_files: BTreeMap<String, BTreeSet<QuestionNoFormat>>,
    pub subtopic_issues: Vec<SubtopicIssue>,
    pub subjects: Vec<LabelUsage>,
    pub chapters: Vec<LabelUsage>,
    pub near_duplicates: Vec<NearDuplicate>,
}

impl AnalysisReport {
    pub fn has_findings(&self) -> bool {
        !self.field_differences.is_empty()
            || !self.mixed_format_files.is_empty()
            || !self.subtopic_issues.is_empty()
            || !self.near_duplicates.is_empty()
    }
}

/// Runs the analysis over every input file.
pub fn analyze_inputs(config: &ExportConfig, labels: &LabelTable) -> Result<AnalysisReport> {
    let span = info_span!("analyze", input_dir = %config.input_dir.display());
    let _guard = span.enter();

    let mut report = AnalysisReport::default();
    let mut field_sets: Vec<(String, BTreeSet<String>)> = Vec::new();
    let mut subjects = LabelCollector::default();
    let mut chapters = LabelCollector::default();

    for path in discover_inputs(config)? {
        let name = file_label(&path);
        let items = match read_json_array(&path) {
            Ok(items) => items,
            Err(error) => {
                warn!(file = %path.display(), %error, "skipping unreadable file");
                report.failures.push(FileFailure {
                    path,
                    message: error.to_string(),
                });
                continue;
            }
        };

        let mut fields = BTreeSet::new();
        let mut formats = BTreeSet::new();
        for item in &items {
            let Value::Object(object) = item else {
                report.non_objects += 1;
                continue;
            };
            report.records += 1;
            for key in object.keys() {
                fields.insert(key.clone());
                *report.field_counts.entry(key.clone()).or_default() += 1;
            }
            if let Some(raw) = text_field(object, "question_no") {
                let format = QuestionNoFormat::classify(&raw);
                *report.question_no_formats.entry(format).or_default() += 1;
                formats.insert(format);
            }
            if let Some(subtopic) = text_field(object, "subtopic") {
                for kind in subtopic_issues(&subtopic) {
                    report.subtopic_issues.push(SubtopicIssue {
                        file: name.clone(),
                        subtopic: subtopic.clone(),
                        kind,
                    });
                }
            }
            if let Some(subject) = text_field(object, "subject") {
                subjects.add(subject, &name);
            }
            if let Some(chapter) = text_field(object, "chapter") {
                chapters.add(chapter, &name);
            }
        }
        debug!(file = %path.display(), records = items.len(), "analyzed file");

        if formats.len() > 1 {
            report.mixed_format_files.insert(name.clone(), formats);
        }
        field_sets.push((name.clone(), fields));
        report.files.push(name);
    }

    if let Some((reference, reference_fields)) = field_sets.first() {
        report.reference_file = Some(reference.clone());
        report.field_differences = field_sets
            .iter()
            .skip(1)
            .filter_map(|(file, fields)| field_difference(file, reference_fields, fields))
            .collect();
    }

    report.subjects = subjects.finish(labels, LabelScope::Subject);
    report.chapters = chapters.finish(labels, LabelScope::Chapter);
    report.near_duplicates = near_duplicates(LabelScope::Subject, &report.subjects);
    report
        .near_duplicates
        .extend(near_duplicates(LabelScope::Chapter, &report.chapters));
    Ok(report)
}

#[derive(Default)]
struct LabelCollector {
    usages: BTreeMap<String, (usize, BTreeSet<String>)>,
}

impl LabelCollector {
    fn add(&mut self, raw: String, file: &str) {
        let (count, files) = self.usages.entry(raw).or_default();
        *count += 1;
        files.insert(file.to_string());
    }

    fn finish(self, labels: &LabelTable, scope: LabelScope) -> Vec<LabelUsage> {
        self.usages
            .into_iter()
            .map(|(raw, (count, files))| LabelUsage {
                canonical: labels.normalize_label(scope, &raw),
                raw,
                count,
                files,
            })
            .collect()
    }
}

/// Canonical labels whose normalized text is similar but not equal.
pub fn near_duplicates(scope: LabelScope, usages: &[LabelUsage]) -> Vec<NearDuplicate> {
    let canonical: BTreeSet<&str> = usages
        .iter()
        .filter_map(|usage| usage.canonical.as_deref())
        .collect();
    let keyed: Vec<(&str, String)> = canonical
        .into_iter()
        .map(|label| (label, normalize_text(label)))
        .collect();

    let mut pairs = Vec::new();
    for (i, (left, left_key)) in keyed.iter().enumerate() {
        for (right, right_key) in keyed.iter().skip(i + 1) {
            if left_key == right_key {
                continue;
            }
            let similarity = jaro_winkler::similarity(left_key.chars(), right_key.chars());
            if similarity >= NEAR_DUPLICATE_THRESHOLD {
                pairs.push(NearDuplicate {
                    scope,
                    left: (*left).to_string(),
                    right: (*right).to_string(),
                    similarity,
                });
            }
        }
    }
    pairs
}

fn subtopic_issues(subtopic: &str) -> Vec<SubtopicIssueKind> {
    let mut kinds = Vec::new();
    if subtopic.starts_with('.') {
        kinds.push(SubtopicIssueKind::LeadingPeriod);
    }
    if subtopic.ends_with('.') {
        kinds.push(SubtopicIssueKind::TrailingPeriod);
    }
    kinds
}

fn field_difference(
    file: &str,
    reference: &BTreeSet<String>,
    fields: &BTreeSet<String>,
) -> Option<FieldDifference> {
    let missing: Vec<String> = reference.difference(fields).cloned().collect();
    let extra: Vec<String> = fields.difference(reference).cloned().collect();
    if missing.is_empty() && extra.is_empty() {
        return None;
    }
    Some(FieldDifference {
        file: file.to_string(),
        missing,
        extra,
    })
}

/// Text of a field; numbers are rendered, `null` and other shapes are ignored.
fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_numbers_are_bucketed_in_order() {
        assert_eq!(QuestionNoFormat::classify("Q.12"), QuestionNoFormat::DotPrefixed);
        assert_eq!(QuestionNoFormat::classify("Q.1 (GA)"), QuestionNoFormat::DotPrefixed);
        assert_eq!(QuestionNoFormat::classify("Q7"), QuestionNoFormat::Prefixed);
        assert_eq!(QuestionNoFormat::classify("42"), QuestionNoFormat::NumericOnly);
        assert_eq!(QuestionNoFormat::classify("3 (GA)"), QuestionNoFormat::WithGa);
        assert_eq!(QuestionNoFormat::classify(""), QuestionNoFormat::Other);
        assert_eq!(QuestionNoFormat::classify("q.5"), QuestionNoFormat::Other);
    }

    #[test]
    fn subtopic_periods_are_flagged_on_both_ends() {
        assert_eq!(
            subtopic_issues(".Paging."),
            vec![SubtopicIssueKind::LeadingPeriod, SubtopicIssueKind::TrailingPeriod]
        );
        assert!(subtopic_issues("Paging").is_empty());
    }

    fn usage(raw: &str, canonical: &str) -> LabelUsage {
        LabelUsage {
            raw: raw.to_string(),
            canonical: Some(canonical.to_string()),
            count: 1,
            files: BTreeSet::new(),
        }
    }

    #[test]
    fn near_duplicates_skip_labels_already_unified() {
        let usages = vec![
            usage("Operating System", "Operating System"),
            usage("operating systems", "Operating System"),
            usage("Computer Network", "Computer Network"),
            usage("Computer Networks", "Computer Networks"),
            usage("Algorithms", "Algorithms"),
        ];
        let pairs = near_duplicates(LabelScope::Subject, &usages);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].left, "Computer Network");
        assert_eq!(pairs[0].right, "Computer Networks");
        assert!(pairs[0].similarity >= NEAR_DUPLICATE_THRESHOLD);
    }

    #[test]
    fn field_differences_list_missing_and_extra() {
        let reference: BTreeSet<String> = ["year", "subject"].map(String::from).into();
        let fields: BTreeSet<String> = ["year", "topic"].map(String::from).into();
        let diff = field_difference("b.json", &reference, &fields).unwrap();
        assert_eq!(diff.missing, vec!["subject"]);
        assert_eq!(diff.extra, vec!["topic"]);
        assert!(field_difference("c.json", &reference, &reference).is_none());
    }
}
