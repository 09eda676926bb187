//! The knowledge graph container
//!
//! Append-only while a build runs, read-only at query time. Node identity
//! is the canonical label key, so re-adding the same entity merges instead
//! of duplicating; edges live in a set keyed by the unordered endpoint
//! pair plus relation, so replaying a build cannot create parallel edges.

use super::edge::{Edge, Relation};
use super::node::{Node, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{hash_map::Entry, HashMap, HashSet};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    nodes: HashMap<NodeId, Node>,
    edges: HashSet<Edge>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or merge a node, returning its id.
    ///
    /// Entity nodes keep their first-seen display label; a paper re-added
    /// under the same id takes the incoming label (a paper id is visited
    /// at most once per build, so this is the title refresh on rebuild).
    pub fn merge_node(&mut self, node: Node) -> NodeId {
        let id = node.id.clone();
        match self.nodes.entry(id.clone()) {
            Entry::Occupied(mut existing) => {
                if node.kind == super::node::NodeKind::Paper {
                    existing.get_mut().label = node.label;
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(node);
            }
        }
        id
    }

    /// Add an edge between two nodes. Returns false if the same
    /// (pair, relation) edge already exists.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, relation: Relation) -> bool {
        self.edges.insert(Edge::new(a, b, relation))
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// One-hop neighbors of a node, ordered by id for stable output.
    pub fn neighbors(&self, id: &NodeId) -> Vec<&Node> {
        let mut out: Vec<&Node> = self
            .edges
            .iter()
            .filter_map(|e| e.other(id))
            .filter_map(|other| self.nodes.get(other))
            .collect();
        out.sort_by(|x, y| x.id.cmp(&y.id));
        out
    }

    /// Case-insensitive substring match of `needle` against every node
    /// label, ordered by id. A linear scan: fine below tens of thousands
    /// of nodes, revisit with a label index beyond that.
    pub fn find_by_label(&self, needle: &str) -> Vec<&Node> {
        let needle = needle.to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let mut out: Vec<&Node> = self
            .nodes
            .values()
            .filter(|n| n.label.to_lowercase().contains(&needle))
            .collect();
        out.sort_by(|x, y| x.id.cmp(&y.id));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;

    #[test]
    fn merge_node_deduplicates_entities() {
        let mut g = KnowledgeGraph::new();
        g.merge_node(Node::entity(NodeKind::Methodology, "GARCH"));
        g.merge_node(Node::entity(NodeKind::Methodology, "garch"));
        assert_eq!(g.node_count(), 1);
        // first-seen display label wins
        let id = NodeId::entity(NodeKind::Methodology, "garch");
        assert_eq!(g.get(&id).map(|n| n.label.as_str()), Some("GARCH"));
    }

    #[test]
    fn paper_remerge_refreshes_title() {
        let mut g = KnowledgeGraph::new();
        g.merge_node(Node::paper("p1", "Old Title"));
        g.merge_node(Node::paper("p1", "New Title"));
        assert_eq!(g.node_count(), 1);
        let id = NodeId::paper("p1");
        assert_eq!(g.get(&id).map(|n| n.label.as_str()), Some("New Title"));
    }

    #[test]
    fn repeated_edges_collapse() {
        let mut g = KnowledgeGraph::new();
        let p = g.merge_node(Node::paper("p1", "T"));
        let m = g.merge_node(Node::entity(NodeKind::Methodology, "LSTM"));
        assert!(g.add_edge(p.clone(), m.clone(), Relation::UsesMethodology));
        assert!(!g.add_edge(m, p, Relation::UsesMethodology));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn shared_entity_connects_to_both_papers() {
        let mut g = KnowledgeGraph::new();
        let p1 = g.merge_node(Node::paper("p1", "First"));
        let p2 = g.merge_node(Node::paper("p2", "Second"));
        let m = g.merge_node(Node::entity(NodeKind::Methodology, "GARCH"));
        g.add_edge(p1, m.clone(), Relation::UsesMethodology);
        g.add_edge(p2, m.clone(), Relation::UsesMethodology);

        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.neighbors(&m).len(), 2);
    }

    #[test]
    fn find_by_label_is_case_insensitive_substring() {
        let mut g = KnowledgeGraph::new();
        g.merge_node(Node::entity(NodeKind::Topic, "Volatility Modeling"));
        g.merge_node(Node::entity(NodeKind::Topic, "Option Pricing"));

        let hits = g.find_by_label("volatility");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].label, "Volatility Modeling");

        assert!(g.find_by_label("garch").is_empty());
        assert!(g.find_by_label("").is_empty());
    }

    #[test]
    fn neighbors_of_unknown_node_is_empty() {
        let g = KnowledgeGraph::new();
        assert!(g.neighbors(&NodeId::paper("nope")).is_empty());
    }
}
