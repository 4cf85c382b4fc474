//! Pipe-delimited page title parsing.
//!
//! Two title layouts exist in the scraped data:
//!
//! ```text
//! Legacy:   GATE | CS | 2000 | C Programming | Storage Classes | Question 11
//! WithSet:  GATE | CS | 2014 | Set 1 | COA | Control Unit | Question 55
//! ```
//!
//! The layout is detected from the field after the year, then subject and
//! chapter are read from the offsets that layout defines.

use std::sync::LazyLock;

use regex::Regex;

use crate::text::{collapse_whitespace, is_question_marker};

/// Field separator in page titles.
pub const TITLE_DELIMITER: char = '|';

const YEAR_FIELD: usize = 2;
const LAYOUT_FIELD: usize = 3;
const MIN_FIELDS: usize = 3;

static SET_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^set\s*-?\s*(\d+)$").expect("set marker regex"));

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)(\d{4})(?:\D|$)").expect("year regex"));

/// Title layout, selected by the presence of a `Set N` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleLayout {
    /// Older titles: exam, branch, year, subject, chapter, ...
    Legacy,
    /// Newer titles with a paper set: exam, branch, year, set, subject, chapter, ...
    WithSet { set: u32 },
}

impl TitleLayout {
    fn detect(fields: &[&str]) -> Self {
        fields
            .get(LAYOUT_FIELD)
            .and_then(|field| SET_MARKER.captures(field))
            .and_then(|caps| caps[1].parse().ok())
            .map_or(Self::Legacy, |set| Self::WithSet { set })
    }

    pub fn subject_field(self) -> usize {
        match self {
            Self::Legacy => 3,
            Self::WithSet { .. } => 4,
        }
    }

    pub fn chapter_field(self) -> usize {
        self.subject_field() + 1
    }
}

/// Attributes recovered from a title. All fields are absent for malformed input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTitle {
    pub year: Option<i32>,
    pub subject: Option<String>,
    pub chapter: Option<String>,
    pub layout: Option<TitleLayout>,
}

impl ParsedTitle {
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.subject.is_none() && self.chapter.is_none()
    }
}

/// Parses a pipe-delimited title.
///
/// Titles with fewer than three fields yield an all-absent result. Fields
/// that are blank or hold a `Question <digits>` marker are treated as absent.
pub fn parse_title(title: &str) -> ParsedTitle {
    let fields: Vec<&str> = title.split(TITLE_DELIMITER).map(str::trim).collect();
    if fields.len() < MIN_FIELDS {
        return ParsedTitle::default();
    }

    let layout = TitleLayout::detect(&fields);
    ParsedTitle {
        year: fields.get(YEAR_FIELD).and_then(|field| extract_year(field)),
        subject: label_field(&fields, layout.subject_field()),
        chapter: label_field(&fields, layout.chapter_field()),
        layout: Some(layout),
    }
}

/// First standalone four-digit run in the field.
fn extract_year(field: &str) -> Option<i32> {
    YEAR.captures(field).and_then(|caps| caps[1].parse().ok())
}

fn label_field(fields: &[&str], index: usize) -> Option<String> {
    let value = collapse_whitespace(fields.get(index)?);
    if value.is_empty() || is_question_marker(&value) {
        None
    } else {
        Some(value)
    }
}
