//! Question answering — route, retrieve, synthesize
//!
//! A [`QaSession`] serves questions against a finished graph and index.
//! Everything it holds is read-only, so concurrent sessions over the same
//! build are safe; per question, the router call and the chosen
//! retriever's calls run sequentially.

mod router;
mod retriever;
mod synthesize;

pub use retriever::{GraphRetriever, VectorRetriever, COULD_NOT_IDENTIFY, NO_ENTITIES};
pub use router::{QueryRouter, Strategy};
pub use synthesize::AnswerSynthesizer;

use crate::graph::KnowledgeGraph;
use crate::index::{ChunkTable, Embedder, IndexError, VectorIndex};
use crate::oracle::{Oracle, OracleError};
use std::sync::Arc;
use uuid::Uuid;

/// Default neighbor count for vector retrieval.
pub const DEFAULT_K: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum QaError {
    #[error("could not synthesize an answer: {0}")]
    Synthesis(#[from] OracleError),
    #[error("vector retrieval failed: {0}")]
    Retrieval(#[from] IndexError),
}

/// A fully synthesized answer plus the path that produced it.
#[derive(Debug, Clone)]
pub struct Answer {
    pub strategy: Strategy,
    pub context: String,
    pub text: String,
}

/// One QA session over a built knowledge base.
pub struct QaSession {
    id: Uuid,
    router: QueryRouter,
    vector: VectorRetriever,
    graph: GraphRetriever,
    synthesizer: AnswerSynthesizer,
    k: usize,
}

impl QaSession {
    pub fn new(
        oracle: Arc<dyn Oracle>,
        graph: Arc<KnowledgeGraph>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        chunks: Arc<ChunkTable>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            router: QueryRouter::new(oracle.clone()),
            vector: VectorRetriever::new(embedder, index, chunks),
            graph: GraphRetriever::new(oracle.clone(), graph),
            synthesizer: AnswerSynthesizer::new(oracle),
            k: DEFAULT_K,
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Answer one question: route, retrieve with the chosen strategy,
    /// synthesize from whatever context came back (empty included).
    pub async fn answer(&self, question: &str) -> Result<Answer, QaError> {
        let strategy = self.router.route(question).await;
        tracing::info!(session = %self.id, ?strategy, "routing decision");

        let context = match strategy {
            Strategy::VectorSearch => self.vector.search(question, self.k)?,
            Strategy::GraphSearch => self.graph.search(question).await,
        };
        if context.is_empty() {
            tracing::debug!(session = %self.id, "retrieval produced no context");
        }

        let text = self.synthesizer.synthesize(&context, question).await?;
        Ok(Answer {
            strategy,
            context,
            text,
        })
    }
}
