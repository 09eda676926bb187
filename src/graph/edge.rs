//! Edge representation — undirected, one edge per endpoint pair and relation

use super::node::NodeId;
use serde::{Deserialize, Serialize};

/// Relationship between a paper and a connected entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    AuthoredBy,
    UsesMethodology,
    HasTopic,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::AuthoredBy => "authored_by",
            Relation::UsesMethodology => "uses_methodology",
            Relation::HasTopic => "has_topic",
        }
    }

    /// Parse the stored wire name back into a relation.
    pub fn parse(s: &str) -> Option<Relation> {
        match s {
            "authored_by" => Some(Relation::AuthoredBy),
            "uses_methodology" => Some(Relation::UsesMethodology),
            "has_topic" => Some(Relation::HasTopic),
            _ => None,
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An undirected edge between two nodes.
///
/// `new` orders the endpoints so the unordered pair has a single canonical
/// representation; equality and hashing then give set-based deduplication
/// for free.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    pub relation: Relation,
}

impl Edge {
    pub fn new(a: NodeId, b: NodeId, relation: Relation) -> Self {
        if a <= b {
            Self { a, b, relation }
        } else {
            Self { a: b, b: a, relation }
        }
    }

    /// The endpoint that is not `id`, if `id` is an endpoint at all.
    pub fn other(&self, id: &NodeId) -> Option<&NodeId> {
        if &self.a == id {
            Some(&self.b)
        } else if &self.b == id {
            Some(&self.a)
        } else {
            None
        }
    }

    /// True if `id` is either endpoint.
    pub fn touches(&self, id: &NodeId) -> bool {
        &self.a == id || &self.b == id
    }
}
