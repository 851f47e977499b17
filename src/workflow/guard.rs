/// Ownership check for single-workflow mutations
///
/// Only call this on a record that was actually found: a missing id must
/// surface as `NotFound` before ownership is ever considered.

use crate::{error::ServiceError, workflow::types::WorkflowRecord};

pub fn assert_owner(workflow: &WorkflowRecord, caller_id: &str) -> Result<(), ServiceError> {
    if workflow.owner_id != caller_id {
        tracing::warn!(
            workflow_id = %workflow.id,
            caller_id,
            "caller does not own workflow"
        );
        return Err(ServiceError::Unauthorized("User not authorized".to_string()));
    }
    Ok(())
}
