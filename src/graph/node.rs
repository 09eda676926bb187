//! Node representation in the knowledge graph

use super::sanitize::{canonical_key, sanitize};
use serde::{Deserialize, Serialize};

/// Kind of entity a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Paper,
    Author,
    Methodology,
    Topic,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Paper => "paper",
            NodeKind::Author => "author",
            NodeKind::Methodology => "methodology",
            NodeKind::Topic => "topic",
        }
    }

    /// Parse the stored wire name back into a kind.
    pub fn parse(s: &str) -> Option<NodeKind> {
        match s {
            "paper" => Some(NodeKind::Paper),
            "author" => Some(NodeKind::Author),
            "methodology" => Some(NodeKind::Methodology),
            "topic" => Some(NodeKind::Topic),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unique identifier for a node: a kind-prefixed canonical key.
///
/// Papers keep their external id verbatim (`paper:<id>`); authors,
/// methodologies, and topics use the canonicalized label as the key, so
/// two extractions of the same label collapse to one node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Identity key for a paper — the sanitized external id.
    pub fn paper(external_id: &str) -> Self {
        Self(format!("paper:{}", sanitize(external_id).trim()))
    }

    /// Identity key for an extracted entity — the canonicalized label.
    pub fn entity(kind: NodeKind, label: &str) -> Self {
        Self(format!("{}:{}", kind.as_str(), canonical_key(label)))
    }

    /// Rehydrate an id from its stored string form.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identity key (see [`NodeId`])
    pub id: NodeId,
    /// Sanitized display text: the paper title, or the entity label as
    /// first extracted
    pub label: String,
    /// Entity kind
    pub kind: NodeKind,
}

impl Node {
    /// Paper node — identified by external id, labeled with the title.
    pub fn paper(external_id: &str, title: &str) -> Self {
        Self {
            id: NodeId::paper(external_id),
            label: sanitize(title).trim().to_string(),
            kind: NodeKind::Paper,
        }
    }

    /// Entity node (author, methodology, topic) — identified by its
    /// canonicalized label, displaying the sanitized original form.
    pub fn entity(kind: NodeKind, label: &str) -> Self {
        Self {
            id: NodeId::entity(kind, label),
            label: sanitize(label).trim().to_string(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_identity_folds_case() {
        let a = Node::entity(NodeKind::Methodology, "GARCH");
        let b = Node::entity(NodeKind::Methodology, "garch");
        assert_eq!(a.id, b.id);
        assert_eq!(a.id.as_str(), "methodology:garch");
    }

    #[test]
    fn entity_display_label_keeps_original_case() {
        let node = Node::entity(NodeKind::Topic, " Volatility Modeling ");
        assert_eq!(node.label, "Volatility Modeling");
        assert_eq!(node.id.as_str(), "topic:volatility modeling");
    }

    #[test]
    fn paper_id_preserves_external_id_case() {
        let node = Node::paper("arXiv-2101.00001v2", "A Title");
        assert_eq!(node.id.as_str(), "paper:arXiv-2101.00001v2");
    }

    #[test]
    fn same_label_different_kinds_are_distinct_nodes() {
        let m = NodeId::entity(NodeKind::Methodology, "transfer entropy");
        let t = NodeId::entity(NodeKind::Topic, "transfer entropy");
        assert_ne!(m, t);
    }

    #[test]
    fn kind_round_trips_through_wire_name() {
        for kind in [
            NodeKind::Paper,
            NodeKind::Author,
            NodeKind::Methodology,
            NodeKind::Topic,
        ] {
            assert_eq!(NodeKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(NodeKind::parse("concept"), None);
    }
}
