/// Flowvault: owner-scoped workflow graphs, encrypted at rest
///
/// Stores named workflow graphs (trigger/action/output nodes plus edges) per
/// owner, encrypting each graph before it touches storage.

// Core configuration and setup
pub mod config;

// Symmetric encryption of stored graphs
pub mod crypto;

// Error taxonomy shared by the service and HTTP layers
pub mod error;

// Workflow types, graph codec, storage, ownership guard and service
pub mod workflow;

// Client-side graph editing state
pub mod editor;

// HTTP API layer - REST endpoints for workflow management
pub mod api;

// Server setup and initialization
pub mod server;

pub use config::Config;
pub use crypto::CryptoCodec;
pub use editor::GraphEditor;
pub use error::ServiceError;
pub use server::{build_router, start_server};
pub use workflow::{Edge, Graph, Node, NodeKind, Position, WorkflowService};
