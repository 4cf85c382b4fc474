//! Input question records as emitted by the scraping stage.
//!
//! Decoding is forgiving at the field level: numbers that arrive as strings,
//! question numbers that arrive as integers, and `null` option lists are all
//! accepted. A value that cannot be coerced at all (`"2014 (Set 1)"` for a
//! year) decodes as absent and is reported by [`QuestionRecord::field_issues`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One scraped question.
///
/// `paper_code` and `question_no` are identifying fields; they decode as
/// optional so that a record missing them can be skipped by the graph
/// builder instead of failing the whole file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionRecord {
    #[serde(deserialize_with = "lenient::opt_int", skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub paper_code: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub question_no: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub subtopic: Option<String>,
    #[serde(deserialize_with = "lenient::text_list", skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(deserialize_with = "lenient::opt_float", skip_serializing_if = "Option::is_none")]
    pub marks: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub theoretical_practical: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub provenance: Option<String>,
    #[serde(deserialize_with = "lenient::opt_float", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_bool", skip_serializing_if = "Option::is_none")]
    pub has_diagram: Option<bool>,
    /// Raw pipe-delimited page title, present for some scrape eras.
    #[serde(deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl QuestionRecord {
    /// Trimmed paper code, `None` when absent or blank.
    pub fn paper_code(&self) -> Option<&str> {
        non_blank(self.paper_code.as_deref())
    }

    /// Trimmed question number, `None` when absent or blank.
    pub fn question_no(&self) -> Option<&str> {
        non_blank(self.question_no.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A field whose value could not be coerced to its type.
///
/// The field decodes as absent (or as an empty option list); the rest of the
/// record is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Text,
    Int,
    Float,
    Bool,
    List,
}

const TYPED_FIELDS: [(&str, FieldKind); 15] = [
    ("year", FieldKind::Int),
    ("paper_code", FieldKind::Text),
    ("question_no", FieldKind::Text),
    ("question_text", FieldKind::Text),
    ("subject", FieldKind::Text),
    ("chapter", FieldKind::Text),
    ("subtopic", FieldKind::Text),
    ("options", FieldKind::List),
    ("correct_answer", FieldKind::Text),
    ("marks", FieldKind::Float),
    ("theoretical_practical", FieldKind::Text),
    ("provenance", FieldKind::Text),
    ("confidence", FieldKind::Float),
    ("has_diagram", FieldKind::Bool),
    ("title", FieldKind::Text),
];

impl FieldKind {
    fn check(self, value: &Value) -> Result<(), String> {
        match self {
            Self::Text => lenient::text(value).map(drop),
            Self::Int => lenient::int(value).map(drop),
            Self::Float => lenient::float(value).map(drop),
            Self::Bool => lenient::boolean(value).map(drop),
            Self::List => lenient::list(value).map(drop),
        }
    }
}

impl QuestionRecord {
    /// Fields of a raw record object that decode as absent because their
    /// values cannot be coerced.
    pub fn field_issues(object: &Map<String, Value>) -> Vec<FieldIssue> {
        TYPED_FIELDS
            .iter()
            .filter_map(|(field, kind)| {
                let value = object.get(*field)?;
                kind.check(value).err().map(|message| FieldIssue {
                    field: *field,
                    message,
                })
            })
            .collect()
    }
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn text(value: &Value) -> Result<Option<String>, String> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            other => Err(format!("expected text, found {other}")),
        }
    }

    pub fn int(value: &Value) -> Result<Option<i32>, String> {
        match value {
            Value::Null => Ok(None),
            Value::Number(n) => match n.as_i64() {
                Some(v) => i32::try_from(v).map(Some).map_err(|_| format!("integer out of range: {v}")),
                None => n
                    .as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| Some(f as i32))
                    .ok_or_else(|| format!("expected integer, found {n}")),
            },
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => s
                .trim()
                .parse::<i32>()
                .map(Some)
                .map_err(|_| format!("expected integer, found \"{s}\"")),
            other => Err(format!("expected integer, found {other}")),
        }
    }

    pub fn float(value: &Value) -> Result<Option<f64>, String> {
        match value {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(n.as_f64()),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| format!("expected number, found \"{s}\"")),
            other => Err(format!("expected number, found {other}")),
        }
    }

    pub fn boolean(value: &Value) -> Result<Option<bool>, String> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(*b)),
            Value::Number(n) => Ok(n.as_i64().map(|v| v != 0)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "" => Ok(None),
                "true" | "yes" | "y" | "1" => Ok(Some(true)),
                "false" | "no" | "n" | "0" => Ok(Some(false)),
                _ => Err(format!("expected boolean, found \"{s}\"")),
            },
            other => Err(format!("expected boolean, found {other}")),
        }
    }

    pub fn list(value: &Value) -> Result<Vec<String>, String> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => Ok(items
                .iter()
                .map(|item| match item {
                    Value::Null => String::new(),
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()),
            other => Err(format!("expected a list, found {other}")),
        }
    }

    // Deserializers fall back to an absent value; `field_issues` reports why.

    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(text(&Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn opt_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
        Ok(int(&Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn opt_float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(float(&Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn opt_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(boolean(&Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn text_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(list(&Value::deserialize(d)?).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_record() {
        let json = r#"{
            "year": 2014,
            "paper_code": "CS1",
            "question_no": "Q.1",
            "question_text": "Which is true?",
            "subject": "Operating System",
            "options": ["A", "B"],
            "correct_answer": "A",
            "marks": 2,
            "confidence": 0.9,
            "has_diagram": false,
            "unexpected_field": {"nested": true}
        }"#;
        let record: QuestionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.year, Some(2014));
        assert_eq!(record.paper_code(), Some("CS1"));
        assert_eq!(record.options, vec!["A", "B"]);
        assert_eq!(record.marks, Some(2.0));
        assert_eq!(record.has_diagram, Some(false));
        assert_eq!(record.chapter, None);
    }

    #[test]
    fn coerces_loosely_typed_fields() {
        let json = r#"{
            "year": "2003",
            "paper_code": "CS",
            "question_no": 12,
            "options": null,
            "marks": "1.5",
            "has_diagram": "yes"
        }"#;
        let record: QuestionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.year, Some(2003));
        assert_eq!(record.question_no(), Some("12"));
        assert!(record.options.is_empty());
        assert_eq!(record.marks, Some(1.5));
        assert_eq!(record.has_diagram, Some(true));
    }

    #[test]
    fn blank_identifiers_read_as_absent() {
        let record: QuestionRecord =
            serde_json::from_str(r#"{"paper_code": "  ", "question_no": ""}"#).unwrap();
        assert_eq!(record.paper_code(), None);
        assert_eq!(record.question_no(), None);
    }

    #[test]
    fn uncoercible_fields_decode_as_absent() {
        let json = r#"{
            "year": "2014 (Set 1)",
            "paper_code": "CS",
            "question_no": "Q.4",
            "has_diagram": "maybe",
            "marks": "2 marks",
            "options": "A) x B) y",
            "subject": {"name": "OS"}
        }"#;
        let record: QuestionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.year, None);
        assert_eq!(record.has_diagram, None);
        assert_eq!(record.marks, None);
        assert!(record.options.is_empty());
        assert_eq!(record.subject, None);
        assert_eq!(record.question_no(), Some("Q.4"));

        let object: Map<String, Value> = serde_json::from_str(json).unwrap();
        let fields: Vec<&str> = QuestionRecord::field_issues(&object)
            .iter()
            .map(|issue| issue.field)
            .collect();
        assert_eq!(fields, vec!["year", "subject", "options", "marks", "has_diagram"]);
    }

    #[test]
    fn coercible_fields_raise_no_issues() {
        let object: Map<String, Value> =
            serde_json::from_str(r#"{"year": "2003", "marks": 1, "options": null, "extra": []}"#)
                .unwrap();
        assert!(QuestionRecord::field_issues(&object).is_empty());
    }

    #[test]
    fn stringifies_non_text_options() {
        let record: QuestionRecord =
            serde_json::from_str(r#"{"options": ["x", 42, true, null]}"#).unwrap();
        assert_eq!(record.options, vec!["x", "42", "true", ""]);
    }
}
