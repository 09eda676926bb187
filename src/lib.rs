//! Scholia: research-paper knowledge graph with hybrid question answering
//!
//! Builds a typed graph of papers, authors, methodologies, and topics by
//! running an extraction oracle over paper abstracts, then answers
//! natural-language questions by routing each one to semantic (vector) or
//! structural (graph) retrieval and synthesizing an answer from the
//! retrieved context.
//!
//! # Core Concepts
//!
//! - **Canonical identity**: entity nodes are keyed by their sanitized,
//!   case-folded label, so independent extraction calls self-deduplicate
//! - **Controlled vocabulary**: admitted topic labels are fed back into
//!   every later extraction call, biasing the oracle toward reuse
//! - **Hybrid retrieval**: a router sends each question to vector or
//!   graph search, with vector search as the safe fallback
//!
//! # Example
//!
//! ```
//! use scholia::KnowledgeGraph;
//!
//! let graph = KnowledgeGraph::new();
//! assert_eq!(graph.node_count(), 0);
//! ```

pub mod build;
pub mod extract;
pub mod graph;
pub mod index;
pub mod oracle;
pub mod prompts;
pub mod qa;
pub mod storage;

pub use build::{
    load_metadata_dir, BuildReport, CorpusError, GraphBuilder, PaperOutcome, PaperRecord,
    PaperState,
};
pub use extract::{
    ControlledVocabulary, EntityExtractionClient, ExtractedEntities, ExtractionExhausted,
    NoopSleeper, RetryPolicy, Sleeper, TokioSleeper,
};
pub use graph::{canonical_key, sanitize, Edge, KnowledgeGraph, Node, NodeId, NodeKind, Relation};
pub use index::{
    chunk_text, ChunkRecord, ChunkTable, Embedder, FlatIndex, IndexError, VectorIndex, NO_MATCH,
};
#[cfg(feature = "embeddings")]
pub use index::FastEmbedEmbedder;
pub use oracle::{HttpOracle, Oracle, OracleConfig, OracleError, ScriptedOracle};
pub use qa::{
    Answer, AnswerSynthesizer, GraphRetriever, QaError, QaSession, QueryRouter, Strategy,
    VectorRetriever,
};
pub use storage::{GraphStore, OpenStore, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
