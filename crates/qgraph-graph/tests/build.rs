use qgraph_graph::{GraphBuilder, IngestOutcome};
use qgraph_model::{EdgeKind, NodeLabel, QuestionRecord};
use qgraph_normalize::LabelTable;

fn records(json: &str) -> Vec<QuestionRecord> {
    serde_json::from_str(json).unwrap()
}

#[test]
fn subject_spelling_variants_collapse() {
    let first_file = records(
        r#"[{"year": 2012, "paper_code": "CS", "question_no": "Q.1",
             "subject": "Operating System", "chapter": "Deadlocks",
             "options": ["Mutex", "Semaphore"], "correct_answer": "Semaphore"}]"#,
    );
    let second_file = records(
        r#"[{"year": 2013, "paper_code": "CS", "question_no": "Q.4",
             "subject": "Operating Systems", "chapter": "Deadlock"}]"#,
    );

    let mut builder = GraphBuilder::new(LabelTable::builtin().unwrap());
    builder.ingest_all(first_file.iter().chain(&second_file));
    let snapshot = builder.finalize();

    assert_eq!(snapshot.node_count(NodeLabel::Subject), 1);
    assert_eq!(snapshot.subjects[0].id.as_str(), "SUB-OPERATING-SYSTEM");
    assert_eq!(snapshot.subjects[0].name, "Operating System");
    assert_eq!(snapshot.node_count(NodeLabel::Chapter), 1);
    assert_eq!(snapshot.node_count(NodeLabel::Paper), 2);
    assert_eq!(snapshot.edge_count(EdgeKind::QuestionSubject), 2);
    assert!(snapshot.conflicts.is_empty());
    assert!(snapshot.option_edges[1].is_correct);
}

#[test]
fn rebuilding_is_idempotent() {
    let input = records(
        r#"[
            {"year": 2014, "paper_code": "CS", "question_no": "Q.1", "subject": "DBMS", "chapter": "SQL"},
            {"year": 2014, "paper_code": "CS", "question_no": "Q.2", "title": "GATE | CS | 2014 | Set 1 | COA | Cache | Question 2"},
            {"paper_code": "", "question_no": "Q.3"}
        ]"#,
    );

    let build = || {
        let mut builder = GraphBuilder::new(LabelTable::builtin().unwrap());
        let outcomes: Vec<IngestOutcome> = input.iter().map(|r| builder.ingest(r)).collect();
        (outcomes, builder.finalize())
    };

    let (outcomes, first) = build();
    let (_, second) = build();
    assert_eq!(first, second);
    assert!(matches!(outcomes[2], IngestOutcome::Skipped(_)));

    let names: Vec<&str> = first.subjects.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Computer Organization and Architecture", "Databases"]
    );
    assert_eq!(first.chapters.iter().find(|c| c.id.as_str() == "CH-CACHE-MEMORY").map(|c| c.name.as_str()), Some("Cache Memory"));
}
