//! Correct-option resolution.
//!
//! Scraped answers arrive in many shapes: the full option text, `C`,
//! `Option C`, `3`, `A and C`, `AC`, `1 & 3`. [`resolve_answer`] maps them onto
//! zero-based option indices with a cascade of strategies; the first strategy
//! that yields an in-bounds index wins. An empty result means "unknown" and is
//! not an error.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::text::normalize_text;

static SINGLE_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:option\s*)?([a-z])$").expect("single letter regex"));

static SINGLE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:option\s*)?(\d+)$").expect("single number regex"));

/// Whole tokens made only of option letters: `C`, or run together as `AC`.
/// `AND` must not contribute an `A` and a `D`.
static LETTER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-D]{1,4})\b").expect("letter token regex"));

static NUMBER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+)\b").expect("number token regex"));

/// Strategy that produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnswerStrategy {
    ExactText,
    SingleLetter,
    SingleNumber,
    LetterList,
    NumberList,
}

impl AnswerStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExactText => "exact text",
            Self::SingleLetter => "single letter",
            Self::SingleNumber => "single number",
            Self::LetterList => "letter list",
            Self::NumberList => "number list",
        }
    }
}

impl fmt::Display for AnswerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of answer resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Zero-based indices of the correct options.
    pub indices: BTreeSet<usize>,
    /// Matching strategy, `None` when nothing matched.
    pub strategy: Option<AnswerStrategy>,
}

impl Resolution {
    fn matched(indices: BTreeSet<usize>, strategy: AnswerStrategy) -> Self {
        Self {
            indices,
            strategy: Some(strategy),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !self.indices.is_empty()
    }

    pub fn is_correct(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }
}

/// Zero-based indices of the options matching `correct_answer`.
pub fn resolve_answer(options: &[String], correct_answer: Option<&str>) -> BTreeSet<usize> {
    resolve_answer_detailed(options, correct_answer).indices
}

/// Like [`resolve_answer`], also reporting which strategy matched.
pub fn resolve_answer_detailed(options: &[String], correct_answer: Option<&str>) -> Resolution {
    let Some(answer) = correct_answer.map(str::trim).filter(|a| !a.is_empty()) else {
        return Resolution::default();
    };
    if options.is_empty() {
        return Resolution::default();
    }
    let count = options.len();

    let normalized_answer = normalize_text(answer);
    let exact: BTreeSet<usize> = options
        .iter()
        .enumerate()
        .filter(|(_, option)| normalize_text(option) == normalized_answer)
        .map(|(idx, _)| idx)
        .collect();
    if !exact.is_empty() {
        return Resolution::matched(exact, AnswerStrategy::ExactText);
    }

    if let Some(caps) = SINGLE_LETTER.captures(answer) {
        if let Some(idx) = caps[1].chars().next().and_then(letter_index).filter(|idx| *idx < count) {
            return Resolution::matched(BTreeSet::from([idx]), AnswerStrategy::SingleLetter);
        }
    }

    if let Some(caps) = SINGLE_NUMBER.captures(answer) {
        if let Some(idx) = number_index(&caps[1], count) {
            return Resolution::matched(BTreeSet::from([idx]), AnswerStrategy::SingleNumber);
        }
    }

    let upper = answer.to_uppercase();
    let letters: BTreeSet<usize> = LETTER_TOKEN
        .captures_iter(&upper)
        .flat_map(|caps| caps[1].chars().filter_map(letter_index).collect::<Vec<_>>())
        .filter(|idx| *idx < count)
        .collect();
    if !letters.is_empty() {
        return Resolution::matched(letters, AnswerStrategy::LetterList);
    }

    let numbers: BTreeSet<usize> = NUMBER_TOKEN
        .captures_iter(answer)
        .filter_map(|caps| number_index(&caps[1], count))
        .collect();
    if !numbers.is_empty() {
        return Resolution::matched(numbers, AnswerStrategy::NumberList);
    }

    Resolution::default()
}

fn letter_index(letter: char) -> Option<usize> {
    let ch = letter.to_ascii_uppercase();
    ch.is_ascii_uppercase().then(|| usize::from(ch as u8 - b'A'))
}

/// 1-based option number to a zero-based index, rejecting 0 and out-of-range values.
fn number_index(digits: &str, count: usize) -> Option<usize> {
    let number: usize = digits.parse().ok()?;
    (1..=count).contains(&number).then(|| number - 1)
}
