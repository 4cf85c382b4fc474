//! Table set layout and Neo4j bulk-import headers.
//!
//! Header cells follow the `neo4j-admin import` convention: `<name>:ID(<Label>)`
//! for node keys, `:START_ID(<Label>)` / `:END_ID(<Label>)` / `:TYPE` for
//! relationships, and a `:Int`, `:Float` or `:Boolean` suffix for typed
//! properties. Untyped properties are strings.

use std::fmt;

use qgraph_model::{EdgeKind, NodeLabel, RelationType};

/// How a column is declared and parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Id(NodeLabel),
    StartId(NodeLabel),
    EndId(NodeLabel),
    Type,
    Text,
    Int,
    Float,
    Boolean,
}

/// One column of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }

    /// Header cell for this column.
    pub fn header(&self) -> String {
        match self.kind {
            ColumnKind::Id(label) => format!("{}:ID({label})", self.name),
            ColumnKind::StartId(label) => format!(":START_ID({label})"),
            ColumnKind::EndId(label) => format!(":END_ID({label})"),
            ColumnKind::Type => ":TYPE".to_string(),
            ColumnKind::Text => self.name.to_string(),
            ColumnKind::Int => format!("{}:Int", self.name),
            ColumnKind::Float => format!("{}:Float", self.name),
            ColumnKind::Boolean => format!("{}:Boolean", self.name),
        }
    }
}

const QUESTION_COLUMNS: &[Column] = &[
    Column::new("questionId", ColumnKind::Id(NodeLabel::Question)),
    Column::new("question_no", ColumnKind::Text),
    Column::new("question_text", ColumnKind::Text),
    Column::new("marks", ColumnKind::Float),
    Column::new("theoretical_practical", ColumnKind::Text),
    Column::new("year", ColumnKind::Int),
    Column::new("paper_code", ColumnKind::Text),
    Column::new("provenance", ColumnKind::Text),
    Column::new("confidence", ColumnKind::Float),
    Column::new("correct_answer", ColumnKind::Text),
    Column::new("has_diagram", ColumnKind::Boolean),
];

const SUBJECT_COLUMNS: &[Column] = &[
    Column::new("subjectId", ColumnKind::Id(NodeLabel::Subject)),
    Column::new("name", ColumnKind::Text),
];

const CHAPTER_COLUMNS: &[Column] = &[
    Column::new("chapterId", ColumnKind::Id(NodeLabel::Chapter)),
    Column::new("name", ColumnKind::Text),
];

const SUBTOPIC_COLUMNS: &[Column] = &[
    Column::new("subtopicId", ColumnKind::Id(NodeLabel::Subtopic)),
    Column::new("name", ColumnKind::Text),
];

const PAPER_COLUMNS: &[Column] = &[
    Column::new("paperId", ColumnKind::Id(NodeLabel::Paper)),
    Column::new("paper_code", ColumnKind::Text),
    Column::new("year", ColumnKind::Int),
];

const OPTION_COLUMNS: &[Column] = &[
    Column::new("optionId", ColumnKind::Id(NodeLabel::Option)),
    Column::new("text", ColumnKind::Text),
    Column::new("option_index", ColumnKind::Int),
];

const QUESTION_OPTION_COLUMNS: &[Column] = &[
    Column::new("", ColumnKind::StartId(NodeLabel::Question)),
    Column::new("", ColumnKind::EndId(NodeLabel::Option)),
    Column::new("", ColumnKind::Type),
    Column::new("is_correct", ColumnKind::Boolean),
];

/// Every file of an exported table set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    Questions,
    Subjects,
    Chapters,
    Subtopics,
    Papers,
    Options,
    Edges(EdgeKind),
    QuestionOption,
}

impl Table {
    pub const ALL: [Table; 13] = [
        Table::Questions,
        Table::Subjects,
        Table::Chapters,
        Table::Subtopics,
        Table::Papers,
        Table::Options,
        Table::Edges(EdgeKind::QuestionSubject),
        Table::Edges(EdgeKind::QuestionChapter),
        Table::Edges(EdgeKind::QuestionSubtopic),
        Table::Edges(EdgeKind::ChapterSubject),
        Table::Edges(EdgeKind::SubtopicChapter),
        Table::Edges(EdgeKind::QuestionPaper),
        Table::QuestionOption,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Questions => "questions.csv",
            Self::Subjects => "subjects.csv",
            Self::Chapters => "chapters.csv",
            Self::Subtopics => "subtopics.csv",
            Self::Papers => "papers.csv",
            Self::Options => "options.csv",
            Self::Edges(EdgeKind::QuestionSubject) => "question_subject.csv",
            Self::Edges(EdgeKind::QuestionChapter) => "question_chapter.csv",
            Self::Edges(EdgeKind::QuestionSubtopic) => "question_subtopic.csv",
            Self::Edges(EdgeKind::ChapterSubject) => "chapter_subject.csv",
            Self::Edges(EdgeKind::SubtopicChapter) => "subtopic_chapter.csv",
            Self::Edges(EdgeKind::QuestionPaper) => "question_paper.csv",
            Self::QuestionOption => "question_option.csv",
        }
    }

    /// Relationship type written in the `:TYPE` column, for edge tables.
    pub fn relation(self) -> Option<RelationType> {
        match self {
            Self::Edges(kind) => Some(kind.relation()),
            Self::QuestionOption => Some(RelationType::HasOption),
            _ => None,
        }
    }

    pub fn columns(self) -> Vec<Column> {
        match self {
            Self::Questions => QUESTION_COLUMNS.to_vec(),
            Self::Subjects => SUBJECT_COLUMNS.to_vec(),
            Self::Chapters => CHAPTER_COLUMNS.to_vec(),
            Self::Subtopics => SUBTOPIC_COLUMNS.to_vec(),
            Self::Papers => PAPER_COLUMNS.to_vec(),
            Self::Options => OPTION_COLUMNS.to_vec(),
            Self::Edges(kind) => vec![
                Column::new("", ColumnKind::StartId(kind.start())),
                Column::new("", ColumnKind::EndId(kind.end())),
                Column::new("", ColumnKind::Type),
            ],
            Self::QuestionOption => QUESTION_OPTION_COLUMNS.to_vec(),
        }
    }

    pub fn headers(self) -> Vec<String> {
        self.columns().iter().map(Column::header).collect()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}
