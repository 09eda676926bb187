//! Graph construction — a single pass over the corpus
//!
//! Each paper walks `Pending → MetadataAdded → ExtractionAttempted →
//! {Enriched | ExtractionSkipped}`; a paper without an abstract terminates
//! immediately as `SkippedNoAbstract` and contributes nothing to the
//! graph. A failed extraction never aborts the build — the paper keeps its
//! metadata nodes and is recorded as skipped.
//!
//! Extraction calls run strictly sequentially: each call consumes a
//! vocabulary snapshot the previous paper may have grown, a read-after-
//! write dependency. A concurrent variant would hand every in-flight call
//! a snapshot taken at submission and apply additions under a single
//! writer in completion order, tolerating the staleness window where a
//! later-submitted call misses a topic an earlier-submitted, slower call
//! admits. Not built here.
//!
//! Because node and edge identity are canonical keys, replaying the whole
//! pass over the same records is idempotent — an interrupted build is
//! restarted from scratch, not resumed.

pub mod corpus;

use crate::extract::{ControlledVocabulary, EntityExtractionClient};
use crate::graph::{KnowledgeGraph, Node, NodeId, NodeKind, Relation};
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

pub use corpus::{load_metadata_dir, CorpusError, PaperRecord};

/// Where a paper is in the build state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaperState {
    Pending,
    MetadataAdded,
    ExtractionAttempted,
    /// Terminal: methodology/topic entities were added.
    Enriched,
    /// Terminal: extraction failed or timed out; metadata nodes remain.
    ExtractionSkipped { reason: String },
    /// Terminal: no abstract, so the paper contributes no graph content.
    SkippedNoAbstract,
}

impl PaperState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaperState::Enriched
                | PaperState::ExtractionSkipped { .. }
                | PaperState::SkippedNoAbstract
        )
    }
}

/// Terminal state of one paper after the pass.
#[derive(Debug, Clone)]
pub struct PaperOutcome {
    pub paper_id: String,
    pub state: PaperState,
}

/// Summary of one build run.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<PaperOutcome>,
    pub node_count: usize,
    pub edge_count: usize,
}

impl BuildReport {
    pub fn enriched(&self) -> usize {
        self.count(|s| matches!(s, PaperState::Enriched))
    }

    pub fn extraction_skipped(&self) -> usize {
        self.count(|s| matches!(s, PaperState::ExtractionSkipped { .. }))
    }

    pub fn skipped_no_abstract(&self) -> usize {
        self.count(|s| matches!(s, PaperState::SkippedNoAbstract))
    }

    fn count(&self, pred: impl Fn(&PaperState) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.state)).count()
    }

    /// True once every paper reached a terminal state.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|o| o.state.is_terminal())
    }
}

/// Builds the knowledge graph from paper records and extracted entities.
///
/// Owns the controlled vocabulary for the lifetime of the build — the
/// single ownership point through which topics are admitted.
pub struct GraphBuilder {
    client: EntityExtractionClient,
    vocabulary: ControlledVocabulary,
    paper_timeout: Duration,
}

impl GraphBuilder {
    pub fn new(client: EntityExtractionClient) -> Self {
        Self {
            client,
            vocabulary: ControlledVocabulary::new(),
            paper_timeout: Duration::from_secs(120),
        }
    }

    /// Seed the vocabulary, e.g. from a previous build or a test fixture.
    pub fn with_vocabulary(mut self, vocabulary: ControlledVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Hard ceiling per paper, separate from the per-call retry budget,
    /// so one stuck paper cannot stall the whole build.
    pub fn with_paper_timeout(mut self, timeout: Duration) -> Self {
        self.paper_timeout = timeout;
        self
    }

    pub fn vocabulary(&self) -> &ControlledVocabulary {
        &self.vocabulary
    }

    /// Run the single pass over `records`, appending into `graph`.
    pub async fn build(
        &mut self,
        records: &[PaperRecord],
        graph: &mut KnowledgeGraph,
    ) -> BuildReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!(%run_id, papers = records.len(), "starting graph build");

        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            let state = self.process_paper(record, graph).await;
            tracing::debug!(paper = %record.id, ?state, "paper reached terminal state");
            outcomes.push(PaperOutcome {
                paper_id: record.id.clone(),
                state,
            });
        }

        let report = BuildReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            outcomes,
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
        };
        tracing::info!(
            %run_id,
            nodes = report.node_count,
            edges = report.edge_count,
            enriched = report.enriched(),
            skipped = report.extraction_skipped(),
            no_abstract = report.skipped_no_abstract(),
            "graph build complete"
        );
        report
    }

    async fn process_paper(
        &mut self,
        record: &PaperRecord,
        graph: &mut KnowledgeGraph,
    ) -> PaperState {
        let mut state = PaperState::Pending;
        tracing::trace!(paper = %record.id, ?state, "entering build pass");

        // A paper without an abstract cannot be enriched and is not useful
        // to the graph structure: skip it entirely, no nodes.
        if record.abstract_text.trim().is_empty() {
            tracing::debug!(paper = %record.id, "empty abstract, skipping paper entirely");
            return PaperState::SkippedNoAbstract;
        }

        let paper_id = graph.merge_node(Node::paper(&record.id, &record.title));
        for author in &record.authors {
            let node = Node::entity(NodeKind::Author, author);
            if node.label.is_empty() {
                continue;
            }
            let author_id = graph.merge_node(node);
            graph.add_edge(paper_id.clone(), author_id, Relation::AuthoredBy);
        }
        state = PaperState::MetadataAdded;
        tracing::trace!(paper = %record.id, ?state, "metadata committed");

        state = PaperState::ExtractionAttempted;
        tracing::trace!(paper = %record.id, ?state, "calling extraction oracle");
        let extraction = tokio::time::timeout(
            self.paper_timeout,
            self.client.extract(&record.abstract_text, &self.vocabulary),
        )
        .await;

        match extraction {
            Err(_elapsed) => {
                tracing::warn!(
                    paper = %record.id,
                    timeout_secs = self.paper_timeout.as_secs(),
                    "per-paper ceiling reached, skipping entity extraction"
                );
                PaperState::ExtractionSkipped {
                    reason: format!(
                        "per-paper ceiling of {}s reached",
                        self.paper_timeout.as_secs()
                    ),
                }
            }
            Ok(Err(error)) => {
                tracing::warn!(paper = %record.id, %error, "skipping entity extraction");
                PaperState::ExtractionSkipped {
                    reason: error.to_string(),
                }
            }
            Ok(Ok(entities)) => {
                self.enrich(&paper_id, &entities.methodologies, &entities.topics, graph);
                // `datasets` are parsed but deliberately not materialized
                // as nodes; see DESIGN.md.
                PaperState::Enriched
            }
        }
    }

    fn enrich(
        &mut self,
        paper_id: &NodeId,
        methodologies: &[String],
        topics: &[String],
        graph: &mut KnowledgeGraph,
    ) {
        for methodology in methodologies {
            let node = Node::entity(NodeKind::Methodology, methodology);
            if node.label.is_empty() {
                continue;
            }
            let id = graph.merge_node(node);
            graph.add_edge(paper_id.clone(), id, Relation::UsesMethodology);
        }
        for topic in topics {
            let node = Node::entity(NodeKind::Topic, topic);
            if node.label.is_empty() {
                continue;
            }
            let id = graph.merge_node(node);
            graph.add_edge(paper_id.clone(), id, Relation::HasTopic);
            // visible to the very next extraction call
            self.vocabulary.admit(topic);
        }
    }
}
