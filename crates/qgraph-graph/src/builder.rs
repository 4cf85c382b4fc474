//! Cross-record deduplication.
//!
//! [`GraphBuilder`] accumulates question records into deduplicated node sets.
//! Node identity is a pure function of the natural key, so feeding the same
//! record twice, or the same corpus in two runs, converges on one node.
//! Taxonomy parents are first-seen: once a chapter is attached to a subject
//! it stays there, and later disagreements are kept as
//! [`TaxonomyConflict`]s.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::{debug, warn};

use qgraph_model::{
    ConflictKind, Edge, EdgeKind, GraphSnapshot, NodeId, OptionEdge, OptionNode, PaperNode,
    QuestionNode, QuestionRecord, TaxonomyConflict, TaxonomyNode,
};
use qgraph_normalize::{
    CleanRecord, LabelTable, SkipReason, chapter_id, clean_record, option_id, paper_id,
    question_id, subject_id, subtopic_id,
};

use crate::stats::BuildStats;

/// Result of feeding one record to the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A new question node was created.
    Ingested(NodeId),
    /// The question key was already present; nothing was added.
    Duplicate(NodeId),
    /// The record could not be keyed.
    Skipped(SkipReason),
}

impl fmt::Display for IngestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingested(id) => write!(f, "ingested {id}"),
            Self::Duplicate(id) => write!(f, "duplicate {id}"),
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
        }
    }
}

/// Where a question hangs in the graph.
#[derive(Debug, Clone)]
struct QuestionLinks {
    subject: NodeId,
    chapter: NodeId,
    subtopic: NodeId,
    paper: NodeId,
}

#[derive(Debug, Clone)]
struct QuestionEntry {
    node: QuestionNode,
    links: QuestionLinks,
    options: Vec<(OptionNode, bool)>,
}

/// First-seen parent of a taxonomy node and the question that established it.
#[derive(Debug, Clone)]
struct ParentLink {
    parent: NodeId,
    question: NodeId,
}

/// Accumulates records into a deduplicated graph.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    labels: LabelTable,
    questions: BTreeMap<NodeId, QuestionEntry>,
    subjects: BTreeMap<NodeId, String>,
    chapters: BTreeMap<NodeId, String>,
    subtopics: BTreeMap<NodeId, String>,
    papers: BTreeMap<NodeId, PaperNode>,
    chapter_subject: BTreeMap<NodeId, ParentLink>,
    subtopic_chapter: BTreeMap<NodeId, ParentLink>,
    conflicts: Vec<TaxonomyConflict>,
    reported: BTreeSet<(ConflictKind, NodeId, NodeId)>,
    stats: BuildStats,
}

impl GraphBuilder {
    pub fn new(labels: LabelTable) -> Self {
        Self {
            labels,
            ..Self::default()
        }
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Feeds one record into the graph.
    pub fn ingest(&mut self, record: &QuestionRecord) -> IngestOutcome {
        let clean = match clean_record(record, &self.labels) {
            Ok(clean) => clean,
            Err(reason) => {
                debug!(
                    paper_code = record.paper_code.as_deref().unwrap_or_default(),
                    question_no = record.question_no.as_deref().unwrap_or_default(),
                    %reason,
                    "skipping question record"
                );
                self.stats.record_skip(reason);
                return IngestOutcome::Skipped(reason);
            }
        };

        let qid = question_id(clean.year, &clean.paper_code, &clean.question_no);
        if self.questions.contains_key(&qid) {
            debug!(question = %qid, "duplicate question key");
            self.stats.duplicates += 1;
            return IngestOutcome::Duplicate(qid);
        }

        let entry = self.entry_for(&qid, clean);
        if !entry.options.is_empty() {
            if entry.options.iter().any(|(_, correct)| *correct) {
                self.stats.answers_resolved += 1;
            } else {
                self.stats.answers_unresolved += 1;
            }
        }
        self.stats.ingested += 1;
        self.questions.insert(qid.clone(), entry);
        IngestOutcome::Ingested(qid)
    }

    /// Feeds a batch of records, returning how many created new questions.
    pub fn ingest_all<'a>(&mut self, records: impl IntoIterator<Item = &'a QuestionRecord>) -> usize {
        records
            .into_iter()
            .filter(|record| matches!(self.ingest(record), IngestOutcome::Ingested(_)))
            .count()
    }

    fn entry_for(&mut self, qid: &NodeId, clean: CleanRecord) -> QuestionEntry {
        let subject = subject_id(&clean.subject);
        let chapter = chapter_id(&clean.chapter);
        let subtopic = subtopic_id(&clean.subtopic);
        let paper = paper_id(clean.year, &clean.paper_code);

        self.subjects.entry(subject.clone()).or_insert(clean.subject);
        self.chapters.entry(chapter.clone()).or_insert(clean.chapter);
        self.subtopics.entry(subtopic.clone()).or_insert(clean.subtopic);
        self.papers.entry(paper.clone()).or_insert_with(|| PaperNode {
            id: paper.clone(),
            paper_code: clean.paper_code.clone(),
            year: clean.year,
        });

        self.attach(ConflictKind::ChapterSubject, &chapter, &subject, qid);
        self.attach(ConflictKind::SubtopicChapter, &subtopic, &chapter, qid);

        let options = clean
            .options
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let node = OptionNode {
                    id: option_id(qid, index),
                    text: text.clone(),
                    option_index: u32::try_from(index + 1).unwrap_or(u32::MAX),
                };
                (node, clean.resolution.is_correct(index))
            })
            .collect();

        QuestionEntry {
            node: QuestionNode {
                id: qid.clone(),
                question_no: clean.question_no,
                question_text: clean.question_text,
                marks: clean.marks,
                theoretical_practical: clean.theoretical_practical,
                year: clean.year,
                paper_code: clean.paper_code,
                provenance: clean.provenance,
                confidence: clean.confidence,
                correct_answer: clean.correct_answer,
                has_diagram: clean.has_diagram,
            },
            links: QuestionLinks {
                subject,
                chapter,
                subtopic,
                paper,
            },
            options,
        }
    }

    /// Records `child -> parent` unless the child already has a parent.
    fn attach(&mut self, kind: ConflictKind, child: &NodeId, parent: &NodeId, question: &NodeId) {
        let links = match kind {
            ConflictKind::ChapterSubject => &mut self.chapter_subject,
            ConflictKind::SubtopicChapter => &mut self.subtopic_chapter,
        };
        let Some(existing) = links.get(child) else {
            links.insert(
                child.clone(),
                ParentLink {
                    parent: parent.clone(),
                    question: question.clone(),
                },
            );
            return;
        };
        if existing.parent == *parent {
            return;
        }
        let conflict = TaxonomyConflict {
            kind,
            child: child.clone(),
            kept_parent: existing.parent.clone(),
            rejected_parent: parent.clone(),
            question: question.clone(),
        };
        self.report(conflict);
    }

    fn report(&mut self, conflict: TaxonomyConflict) {
        let key = (
            conflict.kind,
            conflict.child.clone(),
            conflict.rejected_parent.clone(),
        );
        if !self.reported.insert(key) {
            return;
        }
        warn!(
            kind = ?conflict.kind,
            child = %conflict.child,
            kept = %conflict.kept_parent,
            rejected = %conflict.rejected_parent,
            question = %conflict.question,
            "conflicting taxonomy parent, keeping first association"
        );
        self.conflicts.push(conflict);
    }

    /// Folds another builder into this one.
    ///
    /// Identifiers are deterministic, so nodes reconcile by id. On any
    /// disagreement this builder wins: existing questions are kept (the
    /// other's copies count as duplicates), existing node names are kept,
    /// and conflicting parents are reported as in [`GraphBuilder::ingest`].
    pub fn merge(&mut self, other: GraphBuilder) {
        let GraphBuilder {
            questions,
            subjects,
            chapters,
            subtopics,
            papers,
            chapter_subject,
            subtopic_chapter,
            conflicts,
            stats,
            ..
        } = other;

        let mut stats = stats;
        for (qid, entry) in questions {
            if self.questions.contains_key(&qid) {
                stats.ingested -= 1;
                stats.duplicates += 1;
                if !entry.options.is_empty() {
                    if entry.options.iter().any(|(_, correct)| *correct) {
                        stats.answers_resolved -= 1;
                    } else {
                        stats.answers_unresolved -= 1;
                    }
                }
                continue;
            }
            self.questions.insert(qid, entry);
        }

        for (id, name) in subjects {
            self.subjects.entry(id).or_insert(name);
        }
        for (id, name) in chapters {
            self.chapters.entry(id).or_insert(name);
        }
        for (id, name) in subtopics {
            self.subtopics.entry(id).or_insert(name);
        }
        for (id, paper) in papers {
            self.papers.entry(id).or_insert(paper);
        }

        for (child, link) in chapter_subject {
            self.attach(ConflictKind::ChapterSubject, &child, &link.parent, &link.question);
        }
        for (child, link) in subtopic_chapter {
            self.attach(ConflictKind::SubtopicChapter, &child, &link.parent, &link.question);
        }
        for conflict in conflicts {
            self.report(conflict);
        }

        self.stats += &stats;
    }

    /// Produces the immutable graph.
    ///
    /// Node collections come out ordered by id. Options are ordered by
    /// question id and then position, so `-OPT-10` follows `-OPT-9`.
    pub fn finalize(self) -> GraphSnapshot {
        let mut snapshot = GraphSnapshot {
            subjects: taxonomy_nodes(self.subjects),
            chapters: taxonomy_nodes(self.chapters),
            subtopics: taxonomy_nodes(self.subtopics),
            papers: self.papers.into_values().collect(),
            conflicts: self.conflicts,
            ..GraphSnapshot::default()
        };

        let mut edges: BTreeMap<EdgeKind, BTreeSet<Edge>> =
            EdgeKind::ALL.into_iter().map(|kind| (kind, BTreeSet::new())).collect();
        let mut add = |kind: EdgeKind, start: &NodeId, end: &NodeId| {
            edges
                .entry(kind)
                .or_default()
                .insert(Edge::new(start.clone(), end.clone()));
        };

        for (child, link) in &self.chapter_subject {
            add(EdgeKind::ChapterSubject, child, &link.parent);
        }
        for (child, link) in &self.subtopic_chapter {
            add(EdgeKind::SubtopicChapter, child, &link.parent);
        }

        for (qid, entry) in self.questions {
            add(EdgeKind::QuestionSubject, &qid, &entry.links.subject);
            add(EdgeKind::QuestionChapter, &qid, &entry.links.chapter);
            add(EdgeKind::QuestionSubtopic, &qid, &entry.links.subtopic);
            add(EdgeKind::QuestionPaper, &qid, &entry.links.paper);
            for (option, is_correct) in entry.options {
                snapshot.option_edges.push(OptionEdge {
                    question: qid.clone(),
                    option: option.id.clone(),
                    is_correct,
                });
                snapshot.options.push(option);
            }
            snapshot.questions.push(entry.node);
        }

        snapshot.edges = edges;
        snapshot
    }
}

fn taxonomy_nodes(nodes: BTreeMap<NodeId, String>) -> Vec<TaxonomyNode> {
    nodes
        .into_iter()
        .map(|(id, name)| TaxonomyNode { id, name })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qgraph_model::NodeLabel;

    fn record(paper: &str, no: &str, subject: Option<&str>, chapter: Option<&str>) -> QuestionRecord {
        QuestionRecord {
            year: Some(2014),
            paper_code: Some(paper.to_string()),
            question_no: Some(no.to_string()),
            question_text: Some(format!("question {no}")),
            subject: subject.map(str::to_string),
            chapter: chapter.map(str::to_string),
            ..QuestionRecord::default()
        }
    }

    fn ids<'a>(edges: impl Iterator<Item = &'a Edge>) -> Vec<(String, String)> {
        edges
            .map(|e| (e.start.to_string(), e.end.to_string()))
            .collect()
    }

    #[test]
    fn repeated_key_is_a_duplicate() {
        let mut builder = GraphBuilder::new(LabelTable::empty());
        let mut rec = record("CS", "Q.1", Some("Algorithms"), None);
        rec.options = vec!["1".into(), "2".into()];

        let first = builder.ingest(&rec);
        let second = builder.ingest(&rec);
        assert!(matches!(first, IngestOutcome::Ingested(_)));
        assert!(matches!(second, IngestOutcome::Duplicate(ref id) if id.as_str() == "Q-2014-CS-Q-1"));

        let snapshot = builder.finalize();
        assert_eq!(snapshot.questions.len(), 1);
        assert_eq!(snapshot.options.len(), 2);
        assert_eq!(snapshot.option_edges.len(), 2);
        assert_eq!(snapshot.edge_count(EdgeKind::QuestionSubject), 1);
    }

    #[test]
    fn question_number_spellings_share_a_key() {
        let mut builder = GraphBuilder::new(LabelTable::empty());
        builder.ingest(&record("CS", "Q.1", None, None));
        assert!(matches!(
            builder.ingest(&record("CS", "Q1", None, None)),
            IngestOutcome::Duplicate(_)
        ));
        assert!(matches!(
            builder.ingest(&record("CS", "Q.1 (GA)", None, None)),
            IngestOutcome::Ingested(_)
        ));
        assert_eq!(builder.stats().duplicates, 1);
    }

    #[test]
    fn defaults_cascade_to_unknown() {
        let mut builder = GraphBuilder::new(LabelTable::empty());
        builder.ingest(&record("CS", "Q.1", None, None));
        let snapshot = builder.finalize();

        assert_eq!(snapshot.subjects[0].name, "Unknown");
        assert_eq!(snapshot.chapters[0].name, "Unknown");
        assert_eq!(snapshot.subtopics[0].name, "Unknown");
        assert_eq!(
            ids(snapshot.edges(EdgeKind::ChapterSubject)),
            vec![("CH-UNKNOWN".to_string(), "SUB-UNKNOWN".to_string())]
        );
        assert_eq!(
            ids(snapshot.edges(EdgeKind::SubtopicChapter)),
            vec![("ST-UNKNOWN".to_string(), "CH-UNKNOWN".to_string())]
        );
    }

    #[test]
    fn every_question_has_one_edge_per_parent() {
        let mut builder = GraphBuilder::new(LabelTable::empty());
        for no in ["Q.1", "Q.2", "Q.3"] {
            builder.ingest(&record("CS", no, Some("Databases"), Some("SQL")));
        }
        let snapshot = builder.finalize();
        for kind in [
            EdgeKind::QuestionSubject,
            EdgeKind::QuestionChapter,
            EdgeKind::QuestionSubtopic,
            EdgeKind::QuestionPaper,
        ] {
            assert_eq!(snapshot.edge_count(kind), 3, "{kind:?}");
        }
        assert_eq!(snapshot.node_count(NodeLabel::Paper), 1);
        assert_eq!(snapshot.edge_count(EdgeKind::ChapterSubject), 1);
    }

    #[test]
    fn first_seen_parent_wins_and_conflict_is_reported() {
        let mut builder = GraphBuilder::new(LabelTable::empty());
        builder.ingest(&record("CS", "Q.1", Some("Databases"), Some("Trees")));
        builder.ingest(&record("CS", "Q.2", Some("Data Structures"), Some("Trees")));
        builder.ingest(&record("CS", "Q.3", Some("Data Structures"), Some("Trees")));
        let snapshot = builder.finalize();

        assert_eq!(
            ids(snapshot.edges(EdgeKind::ChapterSubject)),
            vec![("CH-TREES".to_string(), "SUB-DATABASES".to_string())]
        );
        assert_eq!(snapshot.conflicts.len(), 1);
        let conflict = &snapshot.conflicts[0];
        assert_eq!(conflict.kind, ConflictKind::ChapterSubject);
        assert_eq!(conflict.kept_parent.as_str(), "SUB-DATABASES");
        assert_eq!(conflict.rejected_parent.as_str(), "SUB-DATA-STRUCTURES");
        assert_eq!(conflict.question.as_str(), "Q-2014-CS-Q-2");
        // Question edges still follow the record.
        assert!(
            ids(snapshot.edges(EdgeKind::QuestionSubject))
                .contains(&("Q-2014-CS-Q-2".to_string(), "SUB-DATA-STRUCTURES".to_string()))
        );
    }

    #[test]
    fn options_keep_order_and_correctness() {
        let mut builder = GraphBuilder::new(LabelTable::empty());
        let mut rec = record("CS", "Q.1", None, None);
        rec.options = (1..=10).map(|n| format!("choice {n}")).collect();
        rec.correct_answer = Some("10".to_string());
        builder.ingest(&rec);
        let snapshot = builder.finalize();

        let indices: Vec<u32> = snapshot.options.iter().map(|o| o.option_index).collect();
        assert_eq!(indices, (1..=10).collect::<Vec<_>>());
        assert_eq!(snapshot.options[9].id.as_str(), "Q-2014-CS-Q-1-OPT-10");
        let correct: Vec<bool> = snapshot.option_edges.iter().map(|e| e.is_correct).collect();
        assert_eq!(correct.iter().filter(|c| **c).count(), 1);
        assert!(correct[9]);
    }

    #[test]
    fn skipped_records_are_counted() {
        let mut builder = GraphBuilder::new(LabelTable::empty());
        let mut rec = record("CS", "Q.1", None, None);
        rec.paper_code = None;
        assert_eq!(
            builder.ingest(&rec),
            IngestOutcome::Skipped(SkipReason::MissingPaperCode)
        );
        assert_eq!(builder.stats().skipped_total(), 1);
        assert_eq!(builder.finalize().questions.len(), 0);
    }

    #[test]
    fn answer_resolution_is_tallied() {
        let mut builder = GraphBuilder::new(LabelTable::empty());
        let mut resolved = record("CS", "Q.1", None, None);
        resolved.options = vec!["a".into(), "b".into()];
        resolved.correct_answer = Some("B".into());
        let mut unresolved = record("CS", "Q.2", None, None);
        unresolved.options = vec!["a".into(), "b".into()];
        unresolved.correct_answer = Some("none".into());
        let no_options = record("CS", "Q.3", None, None);

        assert_eq!(builder.ingest_all([&resolved, &unresolved, &no_options]), 3);
        assert_eq!(builder.stats().answers_resolved, 1);
        assert_eq!(builder.stats().answers_unresolved, 1);
    }

    #[test]
    fn merge_reconciles_by_id() {
        let mut left = GraphBuilder::new(LabelTable::empty());
        left.ingest(&record("CS", "Q.1", Some("Databases"), Some("Trees")));

        let mut right = GraphBuilder::new(LabelTable::empty());
        right.ingest(&record("CS", "Q.1", Some("Databases"), Some("Trees")));
        right.ingest(&record("CS", "Q.2", Some("Data Structures"), Some("Trees")));

        left.merge(right);
        assert_eq!(left.stats().ingested, 2);
        assert_eq!(left.stats().duplicates, 1);

        let snapshot = left.finalize();
        assert_eq!(snapshot.questions.len(), 2);
        assert_eq!(snapshot.subjects.len(), 2);
        assert_eq!(snapshot.edge_count(EdgeKind::ChapterSubject), 1);
        assert_eq!(snapshot.conflicts.len(), 1);
    }

    #[test]
    fn merge_matches_sequential_ingest() {
        let records = [
            record("CS", "Q.1", Some("Algorithms"), Some("Sorting")),
            record("CS", "Q.2", Some("Algorithms"), Some("Graphs")),
            record("IT", "Q.1", Some("Databases"), None),
        ];

        let mut sequential = GraphBuilder::new(LabelTable::empty());
        sequential.ingest_all(&records);

        let mut left = GraphBuilder::new(LabelTable::empty());
        left.ingest_all(&records[..1]);
        let mut right = GraphBuilder::new(LabelTable::empty());
        right.ingest_all(&records[1..]);
        left.merge(right);

        assert_eq!(left.finalize(), sequential.finalize());
    }
}
