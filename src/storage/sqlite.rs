//! SQLite storage backend for the knowledge graph

use super::traits::{GraphStore, OpenStore, StorageError, StorageResult};
use crate::graph::{KnowledgeGraph, Node, NodeId, NodeKind, Relation};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed graph store
///
/// A single database file with `nodes` and `edges` tables. The primary
/// keys mirror the in-memory identity rules — node id, and the canonical
/// endpoint pair plus relation — so replaying a save can never introduce
/// duplicates. Thread-safe via an internal mutex on the connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS nodes (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                label TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_nodes_kind ON nodes(kind);

            CREATE TABLE IF NOT EXISTS edges (
                a TEXT NOT NULL,
                b TEXT NOT NULL,
                relation TEXT NOT NULL,
                PRIMARY KEY (a, b, relation),
                FOREIGN KEY (a) REFERENCES nodes(id) ON DELETE CASCADE,
                FOREIGN KEY (b) REFERENCES nodes(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_edges_a ON edges(a);
            CREATE INDEX IF NOT EXISTS idx_edges_b ON edges(b);

            PRAGMA foreign_keys = ON;

            -- WAL mode: concurrent readers while a save is in progress
            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }
}

impl GraphStore for SqliteStore {
    fn save_graph(&self, graph: &KnowledgeGraph) -> StorageResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM edges", [])?;
        tx.execute("DELETE FROM nodes", [])?;

        {
            let mut insert_node =
                tx.prepare("INSERT OR REPLACE INTO nodes (id, kind, label) VALUES (?1, ?2, ?3)")?;
            for node in graph.nodes() {
                insert_node.execute(params![
                    node.id.as_str(),
                    node.kind.as_str(),
                    node.label
                ])?;
            }

            let mut insert_edge = tx.prepare(
                "INSERT OR IGNORE INTO edges (a, b, relation) VALUES (?1, ?2, ?3)",
            )?;
            for edge in graph.edges() {
                insert_edge.execute(params![
                    edge.a.as_str(),
                    edge.b.as_str(),
                    edge.relation.as_str()
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn load_graph(&self) -> StorageResult<KnowledgeGraph> {
        let conn = self.conn.lock().unwrap();
        let mut graph = KnowledgeGraph::new();

        let mut node_stmt = conn.prepare("SELECT id, kind, label FROM nodes")?;
        let mut rows = node_stmt.query([])?;
        while let Some(row) = rows.next()? {
            let id: String = row.get(0)?;
            let kind: String = row.get(1)?;
            let label: String = row.get(2)?;
            let kind = NodeKind::parse(&kind).ok_or(StorageError::UnknownKind(kind))?;
            graph.merge_node(Node {
                id: NodeId::from_string(id),
                label,
                kind,
            });
        }

        let mut edge_stmt = conn.prepare("SELECT a, b, relation FROM edges")?;
        let mut rows = edge_stmt.query([])?;
        while let Some(row) = rows.next()? {
            let a: String = row.get(0)?;
            let b: String = row.get(1)?;
            let relation: String = row.get(2)?;
            let relation =
                Relation::parse(&relation).ok_or(StorageError::UnknownRelation(relation))?;
            graph.add_edge(NodeId::from_string(a), NodeId::from_string(b), relation);
        }

        Ok(graph)
    }

    fn node_count(&self) -> StorageResult<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn edge_count(&self) -> StorageResult<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}
