//! The two retrieval strategies — each produces a textual context blob

use crate::graph::KnowledgeGraph;
use crate::index::{ChunkTable, Embedder, IndexError, VectorIndex, NO_MATCH};
use crate::oracle::{extract_json_array, Oracle};
use crate::prompts;
use std::sync::Arc;

/// Fixed reply when the mention-extraction response cannot be parsed.
pub const COULD_NOT_IDENTIFY: &str =
    "Could not identify specific entities in the question for graph search.";
/// Fixed reply when the oracle returns an empty mention list.
pub const NO_ENTITIES: &str =
    "No specific entities found in the question to search the graph.";

/// Semantic retrieval: embed the question, pull the k nearest chunks.
pub struct VectorRetriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    chunks: Arc<ChunkTable>,
}

impl VectorRetriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        chunks: Arc<ChunkTable>,
    ) -> Self {
        Self {
            embedder,
            index,
            chunks,
        }
    }

    /// An empty result is "no information available", not an error — the
    /// caller passes the empty context through to synthesis.
    pub fn search(&self, question: &str, k: usize) -> Result<String, IndexError> {
        let query = self
            .embedder
            .embed_batch(&[question])?
            .into_iter()
            .next()
            .ok_or_else(|| IndexError::Embedding("embedder returned no vectors".to_string()))?;

        let neighbors = self.index.search(&query, k);
        let mut snippets = Vec::new();
        for (id, _score) in neighbors {
            if id == NO_MATCH {
                continue;
            }
            if let Some(chunk) = self.chunks.get(id) {
                snippets.push(format!(
                    "From paper {} ({}):\n...{}...",
                    chunk.paper_id, chunk.chunk_id, chunk.text
                ));
            }
        }
        tracing::debug!(matches = snippets.len(), k, "vector search complete");
        Ok(snippets.join("\n\n"))
    }
}

/// Structural retrieval: extract entity mentions from the question, match
/// them against node labels, expand one hop.
pub struct GraphRetriever {
    oracle: Arc<dyn Oracle>,
    graph: Arc<KnowledgeGraph>,
}

impl GraphRetriever {
    pub fn new(oracle: Arc<dyn Oracle>, graph: Arc<KnowledgeGraph>) -> Self {
        Self { oracle, graph }
    }

    pub async fn search(&self, question: &str) -> String {
        let raw = match self
            .oracle
            .complete(&prompts::question_entity_prompt(question))
            .await
        {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(%error, "mention extraction failed");
                return COULD_NOT_IDENTIFY.to_string();
            }
        };

        let mentions = match parse_mentions(&raw) {
            Some(mentions) => mentions,
            None => {
                tracing::warn!("mention extraction response was not a JSON list");
                return COULD_NOT_IDENTIFY.to_string();
            }
        };
        if mentions.is_empty() {
            return NO_ENTITIES.to_string();
        }
        tracing::debug!(?mentions, "searching graph for mentions");

        let mut lines = Vec::new();
        for mention in &mentions {
            for node in self.graph.find_by_label(mention) {
                lines.push(format!("Found Node: {} (Type: {})", node.label, node.kind));
                for neighbor in self.graph.neighbors(&node.id) {
                    lines.push(format!(
                        "  - Is connected to: {} (Type: {})",
                        neighbor.label, neighbor.kind
                    ));
                }
            }
        }

        if lines.is_empty() {
            format!(
                "Could not find any information about {} in the knowledge graph.",
                mentions.join(", ")
            )
        } else {
            lines.join("\n")
        }
    }
}

/// Parse the mention list, keeping only string elements.
fn parse_mentions(raw: &str) -> Option<Vec<String>> {
    let value = extract_json_array(raw)?;
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
    )
}
