/// Workflow service: storage + graph codec + crypto codec + ownership guard
///
/// Writes go graph -> encode -> encrypt -> storage. Reads go the other way,
/// and a record whose blob cannot be read back is reported in place with a
/// failed payload instead of failing the whole call.

use crate::{
    crypto::CryptoCodec,
    error::{ServiceError, ServiceResult},
    workflow::{
        codec, guard,
        storage::{NewWorkflow, WorkflowPatch, WorkflowStorage},
        types::{Graph, GraphPayload, WorkflowRecord, WorkflowView},
    },
};
use std::sync::Arc;

/// Reason attached to records whose graph could not be read back
pub const DECODE_FAILED: &str = "decode failed";

/// Partial update requested by a caller
#[derive(Debug, Clone, Default)]
pub struct UpdateWorkflow {
    pub name: Option<String>,
    pub graph: Option<Graph>,
}

#[derive(Debug, Clone)]
pub struct WorkflowService {
    storage: WorkflowStorage,
    crypto: Arc<CryptoCodec>,
}

impl WorkflowService {
    pub fn new(storage: WorkflowStorage, crypto: Arc<CryptoCodec>) -> Self {
        Self { storage, crypto }
    }

    pub fn storage(&self) -> &WorkflowStorage {
        &self.storage
    }

    /// Every workflow owned by `caller_id`, each decoded independently
    pub async fn list_workflows(&self, caller_id: &str) -> ServiceResult<Vec<WorkflowView>> {
        let records = self.storage.list_by_owner(caller_id).await?;
        tracing::debug!(owner_id = caller_id, count = records.len(), "listing workflows");

        Ok(records
            .into_iter()
            .map(|record| {
                let payload = self.read_graph(&record);
                WorkflowView::from_record(record, payload)
            })
            .collect())
    }

    /// A single workflow; existence is checked before ownership
    pub async fn get_workflow(&self, caller_id: &str, id: &str) -> ServiceResult<WorkflowView> {
        let record = self.find_owned(caller_id, id).await?;
        let payload = self.read_graph(&record);
        Ok(WorkflowView::from_record(record, payload))
    }

    /// Persist a new workflow and hand back the caller's own graph
    pub async fn create_workflow(
        &self,
        caller_id: &str,
        name: &str,
        graph: Graph,
    ) -> ServiceResult<WorkflowView> {
        validate_name(name)?;
        let data = self.seal_graph(&graph)?;

        let record = self
            .storage
            .create(NewWorkflow {
                owner_id: caller_id.to_string(),
                name: name.to_string(),
                data,
            })
            .await?;

        tracing::info!(workflow_id = %record.id, owner_id = caller_id, "created workflow");
        Ok(WorkflowView::from_record(record, GraphPayload::Decoded(graph)))
    }

    /// Apply a partial update; the graph is only re-encrypted when supplied
    pub async fn update_workflow(
        &self,
        caller_id: &str,
        id: &str,
        patch: UpdateWorkflow,
    ) -> ServiceResult<WorkflowView> {
        self.find_owned(caller_id, id).await?;

        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        let data = patch.graph.as_ref().map(|g| self.seal_graph(g)).transpose()?;

        let record = self
            .storage
            .update(
                id,
                WorkflowPatch {
                    name: patch.name,
                    data,
                },
            )
            .await?
            // deleted between the ownership check and the write
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;

        tracing::info!(workflow_id = %record.id, owner_id = caller_id, "updated workflow");

        let payload = match patch.graph {
            Some(graph) => GraphPayload::Decoded(graph),
            None => self.read_graph(&record),
        };
        Ok(WorkflowView::from_record(record, payload))
    }

    /// Remove a workflow for good and return its id
    pub async fn delete_workflow(&self, caller_id: &str, id: &str) -> ServiceResult<String> {
        self.find_owned(caller_id, id).await?;

        if !self.storage.delete(id).await? {
            return Err(ServiceError::NotFound(id.to_string()));
        }

        tracing::info!(workflow_id = id, owner_id = caller_id, "deleted workflow");
        Ok(id.to_string())
    }

    async fn find_owned(&self, caller_id: &str, id: &str) -> ServiceResult<WorkflowRecord> {
        let record = self
            .storage
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
        guard::assert_owner(&record, caller_id)?;
        Ok(record)
    }

    fn seal_graph(&self, graph: &Graph) -> ServiceResult<String> {
        let text = codec::encode(graph)?;
        Ok(self.crypto.encrypt(&text)?)
    }

    fn read_graph(&self, record: &WorkflowRecord) -> GraphPayload {
        let decoded = self
            .crypto
            .decrypt(&record.data)
            .map_err(ServiceError::from)
            .and_then(|text| codec::decode(&text).map_err(ServiceError::from));

        match decoded {
            Ok(graph) => GraphPayload::Decoded(graph),
            Err(e) => {
                tracing::warn!(workflow_id = %record.id, error = %e, "failed to read workflow graph");
                GraphPayload::Failed(DECODE_FAILED.to_string())
            }
        }
    }
}

fn validate_name(name: &str) -> ServiceResult<()> {
    if name.trim().is_empty() {
        return Err(ServiceError::Validation("name must not be empty".to_string()));
    }
    Ok(())
}
