/// Workflow persistence layer
///
/// - Type definitions (Graph, Node, Edge, WorkflowRecord)
/// - Graph codec: graph <-> canonical JSON text
/// - SQLite storage of encrypted records with sqlx
/// - Ownership guard and the service that ties them together

pub mod types;

pub mod codec;

pub mod storage;

pub mod guard;

pub mod service;

pub use service::{UpdateWorkflow, WorkflowService};
pub use types::{Edge, Graph, GraphPayload, Node, NodeKind, Position, WorkflowRecord, WorkflowView};
