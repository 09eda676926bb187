//! Fixed prompt templates for the oracle's roles
//!
//! Wording is part of the wire contract: the router's decision tokens and
//! the extraction output keys are matched literally elsewhere. Keep edits
//! in sync with their call sites.

/// Literal token the router looks for in the raw routing response.
pub const GRAPH_SEARCH_TOKEN: &str = "graph_search";
/// The other routing token, used in the instruction text only — anything
/// that is not a graph-search answer falls back to vector search.
pub const VECTOR_SEARCH_TOKEN: &str = "vector_search";

/// Entity-extraction prompt over a paper abstract, biased toward reusing
/// the controlled vocabulary rendered in `existing_topics`.
pub fn extraction_prompt(abstract_text: &str, existing_topics: &str) -> String {
    format!(
        r#"You are an expert AI assistant specializing in quantitative finance and academic research.
Your task is to extract specific entities from the abstract of a research paper, to create a knowledge graph.
Based on the provided abstract, identify and list the following:
1.  **Methodologies and Models**: Any specific models, algorithms, or techniques mentioned (e.g., GARCH, LSTM, Reinforcement Learning, Monte Carlo Simulation).
2.  **Datasets**: Any specific datasets used or mentioned (e.g., "S&P 500 historical data", "CRSP database"). If none are mentioned, return an empty list.
3.  **Research Topics**: The key topics or subdomains of the paper (e.g., "algorithmic trading", "risk management", "option pricing").

To ensure consistency, here is a list of topics already present in the knowledge graph. If the abstract discusses one of these topics, please use the existing name. If a new topic is discussed, feel free to add it.
**Existing Topics:**
---
{existing_topics}
---

Return the result as a single, clean and valid JSON object with the keys "methodologies", "datasets", and "topics".

**Abstract:**
---
{abstract_text}
---

**JSON Output:**"#
    )
}

/// Routing prompt: pick one of the two retrieval strategies.
pub fn router_prompt(question: &str) -> String {
    format!(
        r#"Based on the user's question, decide the best way to answer it using the available tools.
You have two tools:
1. "{VECTOR_SEARCH_TOKEN}": Searches over vector embeddings of text chunks. Good for general questions about concepts, summaries, or "what is" style questions. Use this for broad, semantic searches.
2. "{GRAPH_SEARCH_TOKEN}": Searches over a structured knowledge graph. Good for specific questions about relationships between entities like authors, papers, topics, or methodologies. Use this for "who worked on X", "what methods are used for Y", "list papers by Z" style questions.

User question: "{question}"

Which tool is most appropriate? Respond with only "{VECTOR_SEARCH_TOKEN}" or "{GRAPH_SEARCH_TOKEN}"."#
    )
}

/// Mention-extraction prompt for graph search.
pub fn question_entity_prompt(question: &str) -> String {
    format!(
        "From the following question, extract the key entities (like author names, \
         paper titles, methodologies, or topics). Return them as a JSON list of strings. \
         Question: {question}"
    )
}

/// Final synthesis prompt: answer from the retrieved context only.
pub fn synthesis_prompt(context: &str, question: &str) -> String {
    format!(
        r#"Based on the following context, please provide a comprehensive answer to the user's question.
If the context is empty or not relevant, say that you could not find a specific answer in the knowledge base.

Context:
---
{context}
---

User Question: {question}

Answer:"#
    )
}
