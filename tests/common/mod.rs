//! Shared fixtures for integration tests
#![allow(dead_code)]

use scholia::{Embedder, IndexError, PaperRecord};

/// Deterministic embedder: folds bytes into a small fixed-dimension
/// vector. No semantic meaning — tests only need stability and a
/// consistent dimension.
pub struct HashEmbedder {
    pub dimension: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self { dimension: 8 }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimension];
        for (i, byte) in text.bytes().enumerate() {
            v[i % self.dimension] += byte as f32 / 255.0;
        }
        v
    }
}

impl Embedder for HashEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, IndexError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// A small quantitative-finance corpus: two extractable papers and one
/// without an abstract.
pub fn finance_corpus() -> Vec<PaperRecord> {
    vec![
        PaperRecord::new(
            "p1",
            "Volatility Forecasting with GARCH",
            vec!["A. Smith".to_string(), "B. Jones".to_string()],
            "We apply GARCH to model volatility in equity markets.",
        ),
        PaperRecord::new(
            "p2",
            "Deep Hedging",
            vec!["A. Smith".to_string()],
            "We train an LSTM for hedging under transaction costs.",
        ),
        PaperRecord::new("p3", "Abstract Withdrawn", vec!["C. Zhao".to_string()], ""),
    ]
}

/// Extraction responses matching [`finance_corpus`], in corpus order.
pub const P1_EXTRACTION: &str =
    r#"{"methodologies": ["GARCH"], "datasets": [], "topics": ["volatility modeling"]}"#;
pub const P2_EXTRACTION: &str = r#"{"methodologies": ["LSTM"], "datasets": ["S&P 500 historical data"], "topics": ["volatility modeling", "hedging"]}"#;
