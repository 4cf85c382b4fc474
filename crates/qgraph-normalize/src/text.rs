//! Low-level text canonicalization shared by every normalizer.

use std::sync::LazyLock;

use regex::Regex;

use qgraph_model::UNSPECIFIED;

/// `Question 12` and friends: a question number captured where a label was expected.
static QUESTION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^question\s*\d+$").expect("question marker regex"));

/// `Q.1`, `Q1`, `Question 7`, `q 12 (GA)`: prefix, number, trailing annotation.
static QUESTION_NO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^q(?:uestion)?\s*\.?\s*(\d+)\s*(.*)$").expect("question number regex")
});

/// Trims and collapses internal whitespace runs to a single space.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Comparison form: collapsed whitespace, case-folded.
pub fn normalize_text(value: &str) -> String {
    collapse_whitespace(value).to_lowercase()
}

/// Lookup key keeping alphanumerics and the symbols that tell `C`, `C++`
/// and `C#` apart, case-folded.
pub fn compact_key(value: &str) -> String {
    value
        .chars()
        .filter(|ch| ch.is_alphanumeric() || matches!(ch, '+' | '#'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Returns an identifier-safe slug.
///
/// Every maximal run of non-alphanumeric characters becomes one `-`, and
/// leading or trailing separators are dropped. A value with no alphanumerics
/// at all becomes [`UNSPECIFIED`], so the result is never empty.
pub fn slugify(value: &str, prefix: &str, upper: bool) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_separator = false;
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(if upper { ch.to_ascii_uppercase() } else { ch });
        } else {
            pending_separator = true;
        }
    }
    if slug.is_empty() {
        slug.push_str(UNSPECIFIED);
    }
    if prefix.is_empty() {
        slug
    } else {
        format!("{prefix}{slug}")
    }
}

/// True when the value is a stray `Question <digits>` marker.
pub fn is_question_marker(value: &str) -> bool {
    QUESTION_MARKER.is_match(value.trim())
}

/// Upper-cases the first letter of every word and keeps the rest as written,
/// so acronyms like `COA` survive.
pub fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cleans a free-text taxonomy label for display.
///
/// Trims whitespace and stray leading/trailing periods and collapses internal
/// whitespace. Blank values and question-number markers yield `None`.
pub fn clean_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim_matches(|ch: char| ch.is_whitespace() || ch == '.');
    let collapsed = collapse_whitespace(trimmed);
    if collapsed.is_empty() || is_question_marker(&collapsed) {
        return None;
    }
    Some(collapsed)
}

/// Canonical question number used in natural keys.
///
/// `Q.1`, `Q1`, `q 1` and `1` all become `Q.1`; a trailing annotation is kept
/// (`Q.1 (GA)`). Anything else passes through whitespace-collapsed. Blank
/// input yields `None`.
pub fn canonical_question_no(raw: &str) -> Option<String> {
    let collapsed = collapse_whitespace(raw);
    if collapsed.is_empty() {
        return None;
    }
    if collapsed.chars().all(|ch| ch.is_ascii_digit()) {
        return Some(format!("Q.{}", strip_leading_zeros(&collapsed)));
    }
    if let Some(caps) = QUESTION_NO.captures(&collapsed) {
        let number = strip_leading_zeros(&caps[1]);
        let rest = caps[2].trim();
        return Some(if rest.is_empty() {
            format!("Q.{number}")
        } else {
            format!("Q.{number} {rest}")
        });
    }
    Some(collapsed)
}

fn strip_leading_zeros(digits: &str) -> &str {
    let stripped = digits.trim_start_matches('0');
    if stripped.is_empty() { "0" } else { stripped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(collapse_whitespace("  a \t b\n\nc  "), "a b c");
        assert_eq!(normalize_text("  Operating   SYSTEM "), "operating system");
    }

    #[test]
    fn compact_key_keeps_language_symbols() {
        assert_eq!(compact_key("ER-Model"), compact_key("er model"));
        assert_eq!(compact_key("C++"), "c++");
        assert_eq!(compact_key("C #"), "c#");
        assert_ne!(compact_key("C++"), compact_key("C"));
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Control Unit / ALU ", "CH-", true), "CH-CONTROL-UNIT-ALU");
        assert_eq!(slugify("Q-2014-CS 1-Q.1 (GA)", "", true), "Q-2014-CS-1-Q-1-GA");
        assert_eq!(slugify("mixed Case", "", false), "mixed-Case");
    }

    #[test]
    fn slugify_uses_sentinel_for_empty_results() {
        assert_eq!(slugify("", "", true), "UNSPECIFIED");
        assert_eq!(slugify(" -- ", "SUB-", true), "SUB-UNSPECIFIED");
        assert_eq!(slugify("ज्ञान", "ST-", true), "ST-UNSPECIFIED");
    }

    #[test]
    fn question_markers_are_detected() {
        assert!(is_question_marker("Question 55"));
        assert!(is_question_marker(" question12 "));
        assert!(!is_question_marker("Question Bank"));
        assert!(!is_question_marker("Questions 5 and 6"));
    }

    #[test]
    fn title_case_preserves_acronyms() {
        assert_eq!(title_case("operating system"), "Operating System");
        assert_eq!(title_case("COA"), "COA");
        assert_eq!(title_case("tCP and uDP"), "TCP And UDP");
    }

    #[test]
    fn clean_label_trims_periods_and_markers() {
        assert_eq!(clean_label(" .Paging. "), Some("Paging".to_string()));
        assert_eq!(clean_label("Question 11"), None);
        assert_eq!(clean_label("   "), None);
        assert_eq!(clean_label("Storage   Classes"), Some("Storage Classes".to_string()));
    }

    #[test]
    fn canonical_question_numbers() {
        assert_eq!(canonical_question_no("Q.1").as_deref(), Some("Q.1"));
        assert_eq!(canonical_question_no("Q1").as_deref(), Some("Q.1"));
        assert_eq!(canonical_question_no("q 01").as_deref(), Some("Q.1"));
        assert_eq!(canonical_question_no("12").as_deref(), Some("Q.12"));
        assert_eq!(canonical_question_no("Question 7").as_deref(), Some("Q.7"));
        assert_eq!(canonical_question_no("Q.1 (GA)").as_deref(), Some("Q.1 (GA)"));
        assert_eq!(canonical_question_no("Q.1(GA)").as_deref(), Some("Q.1 (GA)"));
        assert_eq!(
            canonical_question_no("Match  the following").as_deref(),
            Some("Match the following")
        );
        assert_eq!(canonical_question_no("  "), None);
    }
}
