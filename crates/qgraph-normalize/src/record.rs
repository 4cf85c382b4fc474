//! Per-record cleanup.
//!
//! Turns a raw [`QuestionRecord`] into a [`CleanRecord`]: labels normalized,
//! title-derived attributes applied to absent fields, defaults filled, the
//! question number canonicalized and the correct options resolved.

use std::collections::BTreeSet;
use std::fmt;

use qgraph_model::QuestionRecord;

use crate::answer::{Resolution, resolve_answer_detailed};
use crate::label::{LabelScope, LabelTable};
use crate::text::{canonical_question_no, collapse_whitespace};
use crate::title::parse_title;

/// Subject used when a record has none.
pub const DEFAULT_SUBJECT: &str = "Unknown";

/// Why a record cannot become a question node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    MissingPaperCode,
    MissingQuestionNo,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingPaperCode => "missing paper_code",
            Self::MissingQuestionNo => "missing question_no",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record with every field normalized and defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub year: Option<i32>,
    pub paper_code: String,
    /// Canonical form, see [`canonical_question_no`].
    pub question_no: String,
    pub question_text: String,
    pub subject: String,
    pub chapter: String,
    pub subtopic: String,
    pub options: Vec<String>,
    pub correct_answer: Option<String>,
    pub resolution: Resolution,
    pub marks: Option<f64>,
    pub theoretical_practical: Option<String>,
    pub provenance: Option<String>,
    pub confidence: Option<f64>,
    pub has_diagram: bool,
}

impl CleanRecord {
    pub fn correct_indices(&self) -> &BTreeSet<usize> {
        &self.resolution.indices
    }
}

/// Cleans one record against a label table.
///
/// Fails only when the record lacks a paper code or question number, which
/// make up its natural key.
pub fn clean_record(
    record: &QuestionRecord,
    labels: &LabelTable,
) -> Result<CleanRecord, SkipReason> {
    let paper_code = record
        .paper_code()
        .map(collapse_whitespace)
        .ok_or(SkipReason::MissingPaperCode)?;
    let question_no = record
        .question_no()
        .and_then(canonical_question_no)
        .ok_or(SkipReason::MissingQuestionNo)?;

    let mut year = record.year;
    let mut subject = labels.normalize_opt(LabelScope::Subject, record.subject.as_deref());
    let mut chapter = labels.normalize_opt(LabelScope::Chapter, record.chapter.as_deref());
    let subtopic = labels.normalize_opt(LabelScope::Subtopic, record.subtopic.as_deref());

    if let Some(title) = record.title.as_deref() {
        let parsed = parse_title(title);
        year = year.or(parsed.year);
        if subject.is_none() {
            subject = labels.normalize_opt(LabelScope::Subject, parsed.subject.as_deref());
        }
        if chapter.is_none() {
            chapter = labels.normalize_opt(LabelScope::Chapter, parsed.chapter.as_deref());
        }
    }

    let subject = subject.unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
    let chapter = chapter.unwrap_or_else(|| subject.clone());
    let subtopic = subtopic.unwrap_or_else(|| chapter.clone());

    let options: Vec<String> = record
        .options
        .iter()
        .map(|option| option.trim().to_string())
        .collect();
    let correct_answer = trimmed(record.correct_answer.as_deref());
    let resolution = resolve_answer_detailed(&options, correct_answer.as_deref());

    Ok(CleanRecord {
        year,
        paper_code,
        question_no,
        question_text: record
            .question_text
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        subject,
        chapter,
        subtopic,
        options,
        correct_answer,
        resolution,
        marks: record.marks,
        theoretical_practical: trimmed(record.theoretical_practical.as_deref()),
        provenance: trimmed(record.provenance.as_deref()),
        confidence: record.confidence,
        has_diagram: record.has_diagram.unwrap_or(false),
    })
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
