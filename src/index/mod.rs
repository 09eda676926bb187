//! Embedding and vector-index seams
//!
//! The embedding model and the index byte-format are external concerns.
//! This module fixes the contracts the QA path relies on: dense integer
//! ids shared between the index and the chunk metadata table, k-nearest
//! search by Euclidean distance, and the sentinel id `-1` for empty
//! result slots.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sentinel id the index returns for a result slot with no match.
pub const NO_MATCH: i64 = -1;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("embedding failed: {0}")]
    Embedding(String),
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Trait for embedding text into vectors.
///
/// fastembed in production (behind the `embeddings` feature), deterministic
/// mocks in tests.
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per text.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, IndexError>;
}

/// Add-with-id insertion and k-nearest-neighbor search.
///
/// `search` always returns exactly `k` slots; slots beyond the number of
/// stored vectors carry [`NO_MATCH`]. Callers skip those.
pub trait VectorIndex: Send + Sync {
    fn add(&mut self, id: i64, vector: Vec<f32>) -> Result<(), IndexError>;
    fn search(&self, query: &[f32], k: usize) -> Vec<(i64, f32)>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Brute-force Euclidean index.
///
/// Linear scan per query — adequate at corpus scale; the trait is the seam
/// for swapping in an ANN backend later.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FlatIndex {
    dimension: Option<usize>,
    entries: Vec<(i64, Vec<f32>)>,
}

impl FlatIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), IndexError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

impl VectorIndex for FlatIndex {
    fn add(&mut self, id: i64, vector: Vec<f32>) -> Result<(), IndexError> {
        match self.dimension {
            None => self.dimension = Some(vector.len()),
            Some(expected) if expected != vector.len() => {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    got: vector.len(),
                })
            }
            Some(_) => {}
        }
        self.entries.push((id, vector));
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Vec<(i64, f32)> {
        let mut scored: Vec<(i64, f32)> = self
            .entries
            .iter()
            .map(|(id, v)| (*id, squared_euclidean(query, v)))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);
        while scored.len() < k {
            scored.push((NO_MATCH, f32::INFINITY));
        }
        scored
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

/// One indexed chunk of paper text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub paper_id: String,
    pub chunk_id: String,
    pub text: String,
}

/// Side metadata table keyed by the same dense integer ids as the index:
/// a chunk's id is its position in the table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkTable {
    chunks: Vec<ChunkRecord>,
}

impl ChunkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk, returning the id the index should store it under.
    pub fn push(
        &mut self,
        paper_id: impl Into<String>,
        chunk_id: impl Into<String>,
        text: impl Into<String>,
    ) -> i64 {
        let id = self.chunks.len() as i64;
        self.chunks.push(ChunkRecord {
            paper_id: paper_id.into(),
            chunk_id: chunk_id.into(),
            text: text.into(),
        });
        id
    }

    /// Look up a chunk by index id. Negative ids (the sentinel included)
    /// and out-of-range ids return None.
    pub fn get(&self, id: i64) -> Option<&ChunkRecord> {
        usize::try_from(id).ok().and_then(|i| self.chunks.get(i))
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), IndexError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

/// Split text into overlapping whitespace-token chunks.
///
/// `overlap` must be smaller than `chunk_size`; it is clamped otherwise.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() || chunk_size == 0 {
        return Vec::new();
    }
    let overlap = overlap.min(chunk_size - 1);
    let stride = chunk_size - overlap;

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < tokens.len() {
        let end = (start + chunk_size).min(tokens.len());
        chunks.push(tokens[start..end].join(" "));
        if end == tokens.len() {
            break;
        }
        start += stride;
    }
    chunks
}

// ---------------------------------------------------------------------------
// FastEmbedEmbedder — production embedder behind `embeddings` feature
// ---------------------------------------------------------------------------

#[cfg(feature = "embeddings")]
mod fastembed_impl {
    use super::{Embedder, IndexError};
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use std::sync::Mutex;

    /// Production embedder backed by fastembed (ONNX Runtime).
    ///
    /// Wraps `fastembed::TextEmbedding` in a `Mutex` because its `embed`
    /// method requires `&mut self`, while the `Embedder` trait uses `&self`.
    pub struct FastEmbedEmbedder {
        model: Mutex<TextEmbedding>,
    }

    impl FastEmbedEmbedder {
        pub fn new(model: EmbeddingModel) -> Result<Self, IndexError> {
            let options = InitOptions::new(model).with_show_download_progress(false);
            let embedding = TextEmbedding::try_new(options)
                .map_err(|e| IndexError::Embedding(e.to_string()))?;
            Ok(Self {
                model: Mutex::new(embedding),
            })
        }

        /// Default model (all-MiniLM-L6-v2).
        pub fn default_model() -> Result<Self, IndexError> {
            Self::new(EmbeddingModel::AllMiniLML6V2)
        }
    }

    impl Embedder for FastEmbedEmbedder {
        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, IndexError> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let mut model = self.model.lock().unwrap();
            model
                .embed(texts.to_vec(), None)
                .map_err(|e| IndexError::Embedding(e.to_string()))
        }
    }
}

#[cfg(feature = "embeddings")]
pub use fastembed_impl::FastEmbedEmbedder;
