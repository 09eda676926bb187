//! Storage trait definitions

use crate::graph::KnowledgeGraph;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during graph persistence
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Unknown node kind in store: {0}")]
    UnknownKind(String),

    #[error("Unknown relation in store: {0}")]
    UnknownRelation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for graph storage backends
///
/// The graph is persisted whole at the end of a build and loaded whole at
/// QA start; there is no partial-graph persistence mid-build.
/// Implementations must be thread-safe (Send + Sync).
pub trait GraphStore: Send + Sync {
    /// Persist the full node/edge set, replacing any prior contents.
    fn save_graph(&self, graph: &KnowledgeGraph) -> StorageResult<()>;

    /// Load the full node/edge set.
    fn load_graph(&self) -> StorageResult<KnowledgeGraph>;

    /// Number of stored nodes.
    fn node_count(&self) -> StorageResult<usize>;

    /// Number of stored edges.
    fn edge_count(&self) -> StorageResult<usize>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: GraphStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
