/// Core workflow type definitions
///
/// `Graph` is the decoded, editable form of a workflow; `WorkflowRecord` is the
/// persisted row whose `data` column holds the encrypted graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A directed graph of typed nodes and the edges between them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Edges whose source or target does not name a node in this graph
    ///
    /// Stored graphs are not required to be referentially intact; callers that
    /// care can check with this.
    pub fn dangling_edges(&self) -> Vec<&Edge> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .filter(|e| !ids.contains(e.source.as_str()) || !ids.contains(e.target.as_str()))
            .collect()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// A single node on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique within the graph
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub position: Position,
    pub label: String,
}

/// What role a node plays in the automation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Entry point that starts the workflow
    Trigger,
    Action,
    /// Terminal node
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Directed connection from `source` to `target`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// A persisted workflow row
///
/// `data` is opaque ciphertext; only the crypto codec can read it.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct WorkflowRecord {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub data: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of decrypting and decoding one record's graph
#[derive(Debug, Clone, PartialEq)]
pub enum GraphPayload {
    Decoded(Graph),
    /// The stored blob could not be read back; carries the reason
    Failed(String),
}

/// A workflow as handed back to callers: metadata plus the decoded graph
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowView {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub graph: GraphPayload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowView {
    pub fn from_record(record: WorkflowRecord, graph: GraphPayload) -> Self {
        Self {
            id: record.id,
            owner_id: record.owner_id,
            name: record.name,
            graph,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    pub fn decoded_graph(&self) -> Option<&Graph> {
        match &self.graph {
            GraphPayload::Decoded(graph) => Some(graph),
            GraphPayload::Failed(_) => None,
        }
    }
}
