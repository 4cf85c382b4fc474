//! Graph node, edge, and snapshot types.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ModelError, NodeId};

/// Node labels of the target graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeLabel {
    Question,
    Subject,
    Chapter,
    Subtopic,
    Paper,
    Option,
}

impl NodeLabel {
    pub const ALL: [NodeLabel; 6] = [
        NodeLabel::Question,
        NodeLabel::Subject,
        NodeLabel::Chapter,
        NodeLabel::Subtopic,
        NodeLabel::Paper,
        NodeLabel::Option,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Question => "Question",
            Self::Subject => "Subject",
            Self::Chapter => "Chapter",
            Self::Subtopic => "Subtopic",
            Self::Paper => "Paper",
            Self::Option => "Option",
        }
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeLabel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownLabel(s.to_string()))
    }
}

/// Relationship types written to the `:TYPE` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RelationType {
    BelongsTo,
    IsInChapter,
    HasSubtopic,
    AskedIn,
    HasOption,
}

impl RelationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BelongsTo => "BELONGS_TO",
            Self::IsInChapter => "IS_IN_CHAPTER",
            Self::HasSubtopic => "HAS_SUBTOPIC",
            Self::AskedIn => "ASKED_IN",
            Self::HasOption => "HAS_OPTION",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "BELONGS_TO" => Ok(Self::BelongsTo),
            "IS_IN_CHAPTER" => Ok(Self::IsInChapter),
            "HAS_SUBTOPIC" => Ok(Self::HasSubtopic),
            "ASKED_IN" => Ok(Self::AskedIn),
            "HAS_OPTION" => Ok(Self::HasOption),
            other => Err(ModelError::UnknownRelation(other.to_string())),
        }
    }
}

/// The plain (attribute-free) edge collections of the graph.
///
/// Question-to-option edges carry an attribute and are stored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    QuestionSubject,
    QuestionChapter,
    QuestionSubtopic,
    ChapterSubject,
    SubtopicChapter,
    QuestionPaper,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 6] = [
        EdgeKind::QuestionSubject,
        EdgeKind::QuestionChapter,
        EdgeKind::QuestionSubtopic,
        EdgeKind::ChapterSubject,
        EdgeKind::SubtopicChapter,
        EdgeKind::QuestionPaper,
    ];

    pub fn start(self) -> NodeLabel {
        match self {
            Self::QuestionSubject
            | Self::QuestionChapter
            | Self::QuestionSubtopic
            | Self::QuestionPaper => NodeLabel::Question,
            Self::ChapterSubject => NodeLabel::Chapter,
            Self::SubtopicChapter => NodeLabel::Subtopic,
        }
    }

    pub fn end(self) -> NodeLabel {
        match self {
            Self::QuestionSubject | Self::ChapterSubject => NodeLabel::Subject,
            Self::QuestionChapter | Self::SubtopicChapter => NodeLabel::Chapter,
            Self::QuestionSubtopic => NodeLabel::Subtopic,
            Self::QuestionPaper => NodeLabel::Paper,
        }
    }

    pub fn relation(self) -> RelationType {
        match self {
            Self::QuestionSubject | Self::ChapterSubject | Self::SubtopicChapter => {
                RelationType::BelongsTo
            }
            Self::QuestionChapter => RelationType::IsInChapter,
            Self::QuestionSubtopic => RelationType::HasSubtopic,
            Self::QuestionPaper => RelationType::AskedIn,
        }
    }
}

/// Subject, chapter, and subtopic nodes share one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyNode {
    pub id: NodeId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperNode {
    pub id: NodeId,
    pub paper_code: String,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionNode {
    pub id: NodeId,
    pub question_no: String,
    pub question_text: String,
    pub marks: Option<f64>,
    pub theoretical_practical: Option<String>,
    pub year: Option<i32>,
    pub paper_code: String,
    pub provenance: Option<String>,
    pub confidence: Option<f64>,
    pub correct_answer: Option<String>,
    pub has_diagram: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionNode {
    pub id: NodeId,
    pub text: String,
    /// 1-based position within the owning question.
    pub option_index: u32,
}

/// A directed edge between two nodes. Ordering is (start, end).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub start: NodeId,
    pub end: NodeId,
}

impl Edge {
    pub fn new(start: NodeId, end: NodeId) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OptionEdge {
    pub question: NodeId,
    pub option: NodeId,
    pub is_correct: bool,
}

/// Which parent association a conflict concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConflictKind {
    /// A chapter was seen under a second subject.
    ChapterSubject,
    /// A subtopic was seen under a second chapter.
    SubtopicChapter,
}

/// A parent association that was rejected because an earlier record already
/// attached the child elsewhere. The first-seen parent is kept.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaxonomyConflict {
    pub kind: ConflictKind,
    pub child: NodeId,
    pub kept_parent: NodeId,
    pub rejected_parent: NodeId,
    pub question: NodeId,
}

/// Read-only result of a graph build.
///
/// Node collections are ordered by id; edges are ordered by (start, end).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub questions: Vec<QuestionNode>,
    pub subjects: Vec<TaxonomyNode>,
    pub chapters: Vec<TaxonomyNode>,
    pub subtopics: Vec<TaxonomyNode>,
    pub papers: Vec<PaperNode>,
    pub options: Vec<OptionNode>,
    pub edges: BTreeMap<EdgeKind, BTreeSet<Edge>>,
    pub option_edges: Vec<OptionEdge>,
    pub conflicts: Vec<TaxonomyConflict>,
}

impl GraphSnapshot {
    /// Edges of one plain edge collection, sorted by (start, end).
    pub fn edges(&self, kind: EdgeKind) -> impl Iterator<Item = &Edge> {
        self.edges.get(&kind).into_iter().flatten()
    }

    pub fn edge_count(&self, kind: EdgeKind) -> usize {
        self.edges.get(&kind).map_or(0, BTreeSet::len)
    }

    pub fn node_count(&self, label: NodeLabel) -> usize {
        match label {
            NodeLabel::Question => self.questions.len(),
            NodeLabel::Subject => self.subjects.len(),
            NodeLabel::Chapter => self.chapters.len(),
            NodeLabel::Subtopic => self.subtopics.len(),
            NodeLabel::Paper => self.papers.len(),
            NodeLabel::Option => self.options.len(),
        }
    }

    /// Node and edge counts, used for summaries and round-trip comparison.
    pub fn counts(&self) -> GraphCounts {
        GraphCounts {
            nodes: NodeLabel::ALL
                .into_iter()
                .map(|label| (label, self.node_count(label)))
                .collect(),
            edges: EdgeKind::ALL
                .into_iter()
                .map(|kind| (kind, self.edge_count(kind)))
                .collect(),
            option_edges: self.option_edges.len(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphCounts {
    pub nodes: BTreeMap<NodeLabel, usize>,
    pub edges: BTreeMap<EdgeKind, usize>,
    pub option_edges: usize,
}

impl GraphCounts {
    pub fn total_nodes(&self) -> usize {
        self.nodes.values().sum()
    }

    pub fn total_edges(&self) -> usize {
        self.edges.values().sum::<usize>() + self.option_edges
    }
}
