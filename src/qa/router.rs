//! Query routing — one oracle call picks the retrieval strategy

use crate::oracle::Oracle;
use crate::prompts;
use std::sync::Arc;

/// The two retrieval strategies a question can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Broad, semantic retrieval over embedded text chunks
    VectorSearch,
    /// Relational retrieval over the knowledge graph
    GraphSearch,
}

/// Classifies a question into one of the two strategies.
pub struct QueryRouter {
    oracle: Arc<dyn Oracle>,
}

impl QueryRouter {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    /// GraphSearch only when the raw response contains the graph token;
    /// anything else — an unrecognized answer or an oracle failure —
    /// falls back to VectorSearch, which degrades to "no relevant text
    /// found" instead of failing outright.
    pub async fn route(&self, question: &str) -> Strategy {
        match self.oracle.complete(&prompts::router_prompt(question)).await {
            Ok(raw) if raw.contains(prompts::GRAPH_SEARCH_TOKEN) => Strategy::GraphSearch,
            Ok(raw) => {
                tracing::debug!(response = %raw.trim(), "router chose vector search");
                Strategy::VectorSearch
            }
            Err(error) => {
                tracing::warn!(%error, "routing call failed, defaulting to vector search");
                Strategy::VectorSearch
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::ScriptedOracle;

    #[tokio::test]
    async fn graph_token_routes_to_graph_search() {
        let router = QueryRouter::new(Arc::new(
            ScriptedOracle::new().with_response("graph_search"),
        ));
        assert_eq!(router.route("Who used GARCH?").await, Strategy::GraphSearch);
    }

    #[tokio::test]
    async fn token_buried_in_prose_still_counts() {
        let router = QueryRouter::new(Arc::new(
            ScriptedOracle::new().with_response("I would use \"graph_search\" for this."),
        ));
        assert_eq!(router.route("q").await, Strategy::GraphSearch);
    }

    #[tokio::test]
    async fn unrecognized_token_falls_back_to_vector_search() {
        let router = QueryRouter::new(Arc::new(
            ScriptedOracle::new().with_response("hybrid_search"),
        ));
        assert_eq!(router.route("q").await, Strategy::VectorSearch);
    }

    #[tokio::test]
    async fn oracle_failure_falls_back_to_vector_search() {
        let router = QueryRouter::new(Arc::new(ScriptedOracle::failing()));
        assert_eq!(router.route("q").await, Strategy::VectorSearch);
    }
}
