//! End-to-end build pipeline: corpus → extraction → graph → storage

mod common;

use common::{finance_corpus, P1_EXTRACTION, P2_EXTRACTION};
use scholia::{
    ControlledVocabulary, EntityExtractionClient, GraphBuilder, GraphStore, KnowledgeGraph,
    NodeId, NodeKind, NoopSleeper, OpenStore, PaperState, RetryPolicy, ScriptedOracle,
    SqliteStore,
};
use std::collections::BTreeSet;
use std::sync::Arc;

fn builder_for(oracle: ScriptedOracle) -> GraphBuilder {
    let client =
        EntityExtractionClient::new(Arc::new(oracle)).with_sleeper(Arc::new(NoopSleeper));
    GraphBuilder::new(client)
}

fn scripted_corpus_oracle() -> ScriptedOracle {
    // p3 has no abstract, so only two extraction calls happen
    ScriptedOracle::new()
        .with_response(P1_EXTRACTION)
        .with_response(P2_EXTRACTION)
}

fn node_ids(graph: &KnowledgeGraph) -> BTreeSet<String> {
    graph.nodes().map(|n| n.id.as_str().to_string()).collect()
}

// --- Scenario: the corpus builds the expected typed graph ---

#[tokio::test]
async fn corpus_builds_expected_graph() {
    let mut builder = builder_for(scripted_corpus_oracle());
    let mut graph = KnowledgeGraph::new();
    let report = builder.build(&finance_corpus(), &mut graph).await;

    // p1, p2, A. Smith, B. Jones, GARCH, LSTM, volatility modeling, hedging
    // (p3 and C. Zhao contribute nothing; datasets are never materialized)
    assert_eq!(graph.node_count(), 8);
    assert!(graph.contains(&NodeId::paper("p1")));
    assert!(graph.contains(&NodeId::paper("p2")));
    assert!(!graph.contains(&NodeId::paper("p3")));
    assert!(!graph.contains(&NodeId::entity(NodeKind::Author, "C. Zhao")));

    // 3 authored_by + 2 uses_methodology + 3 has_topic
    assert_eq!(graph.edge_count(), 8);

    // shared author and shared topic each collapse to one node
    let smith = NodeId::entity(NodeKind::Author, "A. Smith");
    assert_eq!(graph.neighbors(&smith).len(), 2);
    let volatility = NodeId::entity(NodeKind::Topic, "volatility modeling");
    assert_eq!(graph.neighbors(&volatility).len(), 2);

    assert_eq!(report.enriched(), 2);
    assert_eq!(report.skipped_no_abstract(), 1);
    assert!(report.is_complete());
}

// --- Scenario: replaying the build yields an isomorphic graph ---

#[tokio::test]
async fn replayed_build_is_isomorphic() {
    let records = finance_corpus();

    let mut graph = KnowledgeGraph::new();
    let mut builder = builder_for(scripted_corpus_oracle());
    builder.build(&records, &mut graph).await;
    let first_ids = node_ids(&graph);
    let first_edges = graph.edge_count();

    // replay appends onto the same graph with a fresh oracle script
    let mut builder = builder_for(scripted_corpus_oracle());
    builder.build(&records, &mut graph).await;

    assert_eq!(node_ids(&graph), first_ids);
    assert_eq!(graph.edge_count(), first_edges);
}

// --- Scenario: vocabulary grows monotonically through the build ---

#[tokio::test]
async fn vocabulary_grows_and_survives_failures() {
    // p1 succeeds, p2's oracle calls all fail
    let oracle = ScriptedOracle::new()
        .with_response(P1_EXTRACTION)
        .with_failure("boom")
        .with_failure("boom")
        .with_failure("boom");
    let mut builder = builder_for(oracle);

    let mut graph = KnowledgeGraph::new();
    let report = builder.build(&finance_corpus(), &mut graph).await;

    assert_eq!(builder.vocabulary().len(), 1);
    assert!(builder.vocabulary().contains("volatility modeling"));
    assert_eq!(report.enriched(), 1);
    assert_eq!(report.extraction_skipped(), 1);

    // the failed paper still carries its metadata
    assert!(graph.contains(&NodeId::paper("p2")));
    assert!(graph.contains(&NodeId::entity(NodeKind::Author, "A. Smith")));
    assert!(!graph.contains(&NodeId::entity(NodeKind::Methodology, "LSTM")));
}

// --- Scenario: a seeded vocabulary renders deterministically ---

#[tokio::test]
async fn seeded_vocabulary_prompt_is_stable() {
    let vocabulary = ControlledVocabulary::seeded(["risk management", "Option Pricing"]);
    let snapshot = vocabulary.prompt_snapshot();
    assert_eq!(snapshot, r#""Option Pricing", "risk management""#);

    let mut builder = builder_for(ScriptedOracle::new().with_default(P1_EXTRACTION))
        .with_vocabulary(vocabulary);
    let mut graph = KnowledgeGraph::new();
    builder.build(&finance_corpus()[..1], &mut graph).await;

    // seeded topics stay admitted; the new one is added
    assert_eq!(builder.vocabulary().len(), 3);
}

// --- Scenario: exhausted retries terminate the paper, not the build ---

#[tokio::test]
async fn exhausted_retries_record_the_reason() {
    let oracle = ScriptedOracle::failing();
    let client = EntityExtractionClient::new(Arc::new(oracle))
        .with_policy(RetryPolicy::default().with_max_attempts(2))
        .with_sleeper(Arc::new(NoopSleeper));
    let mut builder = GraphBuilder::new(client);

    let mut graph = KnowledgeGraph::new();
    let report = builder.build(&finance_corpus()[..1], &mut graph).await;

    match &report.outcomes[0].state {
        PaperState::ExtractionSkipped { reason } => {
            assert!(reason.contains("2 attempts"), "reason was: {reason}");
        }
        other => panic!("expected ExtractionSkipped, got {other:?}"),
    }
}

// --- Scenario: the built graph round-trips through sqlite ---

#[tokio::test]
async fn built_graph_round_trips_through_storage() {
    let mut builder = builder_for(scripted_corpus_oracle());
    let mut graph = KnowledgeGraph::new();
    builder.build(&finance_corpus(), &mut graph).await;

    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("graph.db")).unwrap();
    store.save_graph(&graph).unwrap();

    let loaded = store.load_graph().unwrap();
    assert_eq!(node_ids(&loaded), node_ids(&graph));
    assert_eq!(loaded.edge_count(), graph.edge_count());

    // labels survive with display casing intact
    let garch = NodeId::entity(NodeKind::Methodology, "GARCH");
    assert_eq!(loaded.get(&garch).map(|n| n.label.as_str()), Some("GARCH"));
}

// --- Scenario: control characters in oracle output never reach the store ---

#[tokio::test]
async fn extracted_labels_are_sanitized_before_identity() {
    let oracle = ScriptedOracle::new()
        .with_response(r#"{"methodologies": ["GA\u0000RCH"], "topics": []}"#)
        .with_response(r#"{"methodologies": ["garch"], "topics": []}"#);
    let mut builder = builder_for(oracle);

    let mut graph = KnowledgeGraph::new();
    builder.build(&finance_corpus()[..2], &mut graph).await;

    // the stripped-control-char label and the clean one are one node
    let garch = NodeId::entity(NodeKind::Methodology, "GARCH");
    assert!(graph.contains(&garch));
    assert_eq!(
        graph
            .nodes()
            .filter(|n| n.kind == NodeKind::Methodology)
            .count(),
        1
    );
}
