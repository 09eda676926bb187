//! Scholia CLI — build the knowledge graph, inspect it, ask questions.
//!
//! Usage:
//!   scholia build --metadata-dir metadata [--data-dir path]
//!   scholia ask "Which authors have published papers on GARCH models?"
//!   scholia inspect

use clap::{Parser, Subcommand};
use scholia::{
    load_metadata_dir, EntityExtractionClient, GraphBuilder, GraphStore, HttpOracle,
    KnowledgeGraph, OpenStore, Oracle, OracleConfig, SqliteStore,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "scholia",
    version,
    about = "Research-paper knowledge graph with hybrid graph/vector question answering"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the knowledge graph (and vector index) from paper metadata
    Build {
        /// Directory of paper metadata JSON files
        #[arg(long)]
        metadata_dir: PathBuf,
        /// Data directory for the graph database and index files
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Oracle endpoint (OpenAI-compatible chat completions)
        #[arg(long)]
        endpoint: Option<String>,
        /// Oracle model name
        #[arg(long)]
        model: Option<String>,
    },
    /// Ask a question against the built graph and index
    Ask {
        /// The question to answer
        question: String,
        /// Data directory holding the graph database and index files
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Neighbors to retrieve on the vector path
        #[arg(short, long, default_value_t = 5)]
        k: usize,
        /// Oracle endpoint (OpenAI-compatible chat completions)
        #[arg(long)]
        endpoint: Option<String>,
        /// Oracle model name
        #[arg(long)]
        model: Option<String>,
    },
    /// Show node/edge counts for the stored graph
    Inspect {
        /// Data directory holding the graph database
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

/// Default data directory (~/.local/share/scholia)
fn default_data_dir() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("scholia")
}

fn resolve_data_dir(data_dir: Option<PathBuf>) -> PathBuf {
    let dir = data_dir.unwrap_or_else(default_data_dir);
    std::fs::create_dir_all(&dir).ok();
    dir
}

/// API key from the environment, falling back to an `api.key` file in the
/// working directory. Local endpoints typically need neither.
fn load_api_key() -> Option<String> {
    if let Ok(key) = std::env::var("SCHOLIA_API_KEY") {
        if !key.trim().is_empty() {
            return Some(key.trim().to_string());
        }
    }
    std::fs::read_to_string("api.key")
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

fn oracle_config(endpoint: Option<String>, model: Option<String>) -> OracleConfig {
    let mut config = OracleConfig::default();
    if let Some(endpoint) = endpoint.or_else(|| std::env::var("SCHOLIA_ENDPOINT").ok()) {
        config = config.with_endpoint(endpoint);
    }
    if let Some(model) = model.or_else(|| std::env::var("SCHOLIA_MODEL").ok()) {
        config = config.with_model(model);
    }
    if let Some(key) = load_api_key() {
        config = config.with_api_key(key);
    }
    config
}

fn open_oracle(endpoint: Option<String>, model: Option<String>) -> Result<Arc<dyn Oracle>, String> {
    let oracle = HttpOracle::new(oracle_config(endpoint, model))
        .map_err(|e| format!("Failed to create oracle client: {e}"))?;
    Ok(Arc::new(oracle))
}

async fn cmd_build(
    metadata_dir: PathBuf,
    data_dir: Option<PathBuf>,
    endpoint: Option<String>,
    model: Option<String>,
) -> i32 {
    let data_dir = resolve_data_dir(data_dir);

    let records = match load_metadata_dir(&metadata_dir) {
        Ok(records) if records.is_empty() => {
            eprintln!(
                "Error: no metadata files found in {}",
                metadata_dir.display()
            );
            return 1;
        }
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    println!("Found {} paper records.", records.len());

    let oracle = match open_oracle(endpoint, model) {
        Ok(oracle) => oracle,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let client = EntityExtractionClient::new(oracle);
    let mut builder = GraphBuilder::new(client);
    let mut graph = KnowledgeGraph::new();
    let report = builder.build(&records, &mut graph).await;

    println!(
        "Build {} complete: {} nodes, {} edges ({} enriched, {} extraction skipped, {} without abstract).",
        report.run_id,
        report.node_count,
        report.edge_count,
        report.enriched(),
        report.extraction_skipped(),
        report.skipped_no_abstract()
    );

    let db_path = data_dir.join("graph.db");
    let store = match SqliteStore::open(&db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: failed to open database: {e}");
            return 1;
        }
    };
    if let Err(e) = store.save_graph(&graph) {
        eprintln!("Error: failed to save graph: {e}");
        return 1;
    }
    println!("Graph saved to {}", db_path.display());

    build_vector_index(&records, &data_dir)
}

/// Chunk abstracts, embed them, and persist the index + chunk table.
#[cfg(feature = "embeddings")]
fn build_vector_index(records: &[scholia::PaperRecord], data_dir: &std::path::Path) -> i32 {
    use scholia::{chunk_text, ChunkTable, Embedder, FastEmbedEmbedder, FlatIndex, VectorIndex};

    const CHUNK_SIZE: usize = 512;
    const CHUNK_OVERLAP: usize = 64;

    let embedder = match FastEmbedEmbedder::default_model() {
        Ok(embedder) => embedder,
        Err(e) => {
            eprintln!("Error: failed to load embedding model: {e}");
            return 1;
        }
    };

    let mut chunks = ChunkTable::new();
    let mut texts = Vec::new();
    for record in records {
        if record.abstract_text.trim().is_empty() {
            continue;
        }
        for (i, chunk) in chunk_text(&record.abstract_text, CHUNK_SIZE, CHUNK_OVERLAP)
            .into_iter()
            .enumerate()
        {
            chunks.push(record.id.as_str(), format!("{}_chunk_{}", record.id, i), chunk.as_str());
            texts.push(chunk);
        }
    }

    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let vectors = match embedder.embed_batch(&refs) {
        Ok(vectors) => vectors,
        Err(e) => {
            eprintln!("Error: embedding failed: {e}");
            return 1;
        }
    };

    let mut index = FlatIndex::new();
    for (i, vector) in vectors.into_iter().enumerate() {
        if let Err(e) = index.add(i as i64, vector) {
            eprintln!("Error: {e}");
            return 1;
        }
    }

    let index_path = data_dir.join("vectors.json");
    let chunks_path = data_dir.join("chunks.json");
    if let Err(e) = index
        .save(&index_path)
        .and_then(|_| chunks.save(&chunks_path))
    {
        eprintln!("Error: failed to save vector index: {e}");
        return 1;
    }
    println!(
        "Indexed {} chunks; vector index saved to {}",
        index.len(),
        index_path.display()
    );
    0
}

#[cfg(not(feature = "embeddings"))]
fn build_vector_index(_records: &[scholia::PaperRecord], _data_dir: &std::path::Path) -> i32 {
    eprintln!(
        "Warning: built without the `embeddings` feature; vector index skipped. \
         Questions routed to vector search will find no context."
    );
    0
}

#[cfg(feature = "embeddings")]
async fn cmd_ask(
    question: String,
    data_dir: Option<PathBuf>,
    k: usize,
    endpoint: Option<String>,
    model: Option<String>,
) -> i32 {
    use scholia::{ChunkTable, FastEmbedEmbedder, FlatIndex, QaSession};

    let data_dir = resolve_data_dir(data_dir);

    let store = match SqliteStore::open(data_dir.join("graph.db")) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: failed to open database: {e}");
            return 1;
        }
    };
    let graph = match store.load_graph() {
        Ok(graph) => Arc::new(graph),
        Err(e) => {
            eprintln!("Error: failed to load graph: {e}");
            return 1;
        }
    };

    // a missing index is an empty one: vector search degrades to
    // "no information available"
    let index = FlatIndex::load(data_dir.join("vectors.json")).unwrap_or_default();
    let chunks = ChunkTable::load(data_dir.join("chunks.json")).unwrap_or_default();

    let oracle = match open_oracle(endpoint, model) {
        Ok(oracle) => oracle,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    let embedder = match FastEmbedEmbedder::default_model() {
        Ok(embedder) => Arc::new(embedder),
        Err(e) => {
            eprintln!("Error: failed to load embedding model: {e}");
            return 1;
        }
    };

    let session = QaSession::new(oracle, graph, embedder, Arc::new(index), Arc::new(chunks))
        .with_k(k);

    match session.answer(&question).await {
        Ok(answer) => {
            println!("Routing decision: {:?}", answer.strategy);
            println!("\n{}", answer.text);
            0
        }
        Err(e) => {
            println!("I'm sorry, I could not find an answer: {e}");
            1
        }
    }
}

#[cfg(not(feature = "embeddings"))]
async fn cmd_ask(
    _question: String,
    _data_dir: Option<PathBuf>,
    _k: usize,
    _endpoint: Option<String>,
    _model: Option<String>,
) -> i32 {
    eprintln!(
        "Error: `ask` needs the vector retrieval path; rebuild with `--features embeddings`."
    );
    1
}

fn cmd_inspect(data_dir: Option<PathBuf>) -> i32 {
    let data_dir = resolve_data_dir(data_dir);
    let store = match SqliteStore::open(data_dir.join("graph.db")) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: failed to open database: {e}");
            return 1;
        }
    };
    let graph = match store.load_graph() {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Error: failed to load graph: {e}");
            return 1;
        }
    };

    println!("Nodes: {}", graph.node_count());
    println!("Edges: {}", graph.edge_count());
    for kind in [
        scholia::NodeKind::Paper,
        scholia::NodeKind::Author,
        scholia::NodeKind::Methodology,
        scholia::NodeKind::Topic,
    ] {
        let count = graph.nodes().filter(|n| n.kind == kind).count();
        println!("  {:<12} {}", kind.as_str(), count);
    }
    0
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("SCHOLIA_LOG").unwrap_or_else(|_| "scholia=info".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Build {
            metadata_dir,
            data_dir,
            endpoint,
            model,
        } => cmd_build(metadata_dir, data_dir, endpoint, model).await,
        Commands::Ask {
            question,
            data_dir,
            k,
            endpoint,
            model,
        } => cmd_ask(question, data_dir, k, endpoint, model).await,
        Commands::Inspect { data_dir } => cmd_inspect(data_dir),
    };
    std::process::exit(code);
}
