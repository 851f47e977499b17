/// HTTP API Layer
///
/// REST endpoints for owner-scoped workflow management. Every route expects
/// the upstream auth layer to have attached the caller's id.

// Caller identity extractor
pub mod caller;

// Workflow management endpoints (GET/POST/PUT/DELETE)
pub mod workflows;

pub use caller::CallerId;
pub use workflows::{create_workflow_routes, AppState};
