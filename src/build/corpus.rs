//! Corpus loading — paper metadata records from a directory of JSON files

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One research paper's metadata, as produced by the acquisition stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    #[serde(rename = "paper_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
}

impl PaperRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        authors: Vec<String>,
        abstract_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors,
            abstract_text: abstract_text.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Load every `.json` metadata file under `dir`, sorted by filename so the
/// enumeration order — and therefore the build — is deterministic.
pub fn load_metadata_dir(dir: impl AsRef<Path>) -> Result<Vec<PaperRecord>, CorpusError> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    paths.sort();

    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        let contents = std::fs::read_to_string(&path)?;
        let record = serde_json::from_str(&contents)
            .map_err(|source| CorpusError::Parse { path: path.clone(), source })?;
        records.push(record);
    }
    Ok(records)
}
