//! Deterministic node identifiers.
//!
//! Every identifier is a pure function of its natural key, so rebuilding the
//! graph from the same input always yields the same ids.

use qgraph_model::{NodeId, NodeLabel};

use crate::text::slugify;

/// Identifier prefix for taxonomy and paper nodes.
pub fn id_prefix(label: NodeLabel) -> &'static str {
    match label {
        NodeLabel::Subject => "SUB-",
        NodeLabel::Chapter => "CH-",
        NodeLabel::Subtopic => "ST-",
        NodeLabel::Paper => "P-",
        NodeLabel::Question => "Q-",
        NodeLabel::Option => "OPT-",
    }
}

/// Slugs `name` under the prefix of `label`.
pub fn normalize_id(label: NodeLabel, name: &str) -> NodeId {
    NodeId::from_slug(slugify(name, id_prefix(label), true))
}

pub fn subject_id(name: &str) -> NodeId {
    taxonomy_id(NodeLabel::Subject, name)
}

pub fn chapter_id(name: &str) -> NodeId {
    taxonomy_id(NodeLabel::Chapter, name)
}

pub fn subtopic_id(name: &str) -> NodeId {
    taxonomy_id(NodeLabel::Subtopic, name)
}

/// Taxonomy names spell out `+` and `#` so that `C++` and `C#` keep distinct ids.
fn taxonomy_id(label: NodeLabel, name: &str) -> NodeId {
    if !name.contains(['+', '#']) {
        return normalize_id(label, name);
    }
    let spelled = name.replace('+', " plus ").replace('#', " sharp ");
    normalize_id(label, &spelled)
}

/// `P-<YEAR>-<CODE>`, or `P-<CODE>` when the year is unknown.
pub fn paper_id(year: Option<i32>, paper_code: &str) -> NodeId {
    normalize_id(NodeLabel::Paper, &join_key(year, &[paper_code]))
}

/// `Q-<YEAR>-<CODE>-<NO>`; the year segment is omitted when unknown.
pub fn question_id(year: Option<i32>, paper_code: &str, question_no: &str) -> NodeId {
    normalize_id(NodeLabel::Question, &join_key(year, &[paper_code, question_no]))
}

/// `<QUESTION_ID>-OPT-<n>` for the zero-based option position `index`.
pub fn option_id(question: &NodeId, index: usize) -> NodeId {
    NodeId::from_slug(format!("{question}-OPT-{}", index + 1))
}

fn join_key(year: Option<i32>, parts: &[&str]) -> String {
    let mut key = year.map(|year| year.to_string()).unwrap_or_default();
    for part in parts {
        if !key.is_empty() {
            key.push('-');
        }
        key.push_str(part);
    }
    key
}
