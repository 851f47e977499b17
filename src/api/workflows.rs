/// Workflow management REST API endpoints
///
/// Thin handlers over `WorkflowService`: pull the caller id and body, call the
/// service, shape the JSON. Graphs travel decoded; ciphertext never leaves.

use crate::{
    api::caller::CallerId,
    error::{ServiceError, ServiceResult},
    workflow::{Graph, GraphPayload, UpdateWorkflow, WorkflowService, WorkflowView},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub service: WorkflowService,
}

/// A workflow as returned by list/get/update
///
/// `data` is `null` and `error` is set when the stored graph could not be read.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub data: Option<Graph>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WorkflowView> for WorkflowResponse {
    fn from(view: WorkflowView) -> Self {
        let (data, error) = match view.graph {
            GraphPayload::Decoded(graph) => (Some(graph), None),
            GraphPayload::Failed(reason) => (None, Some(reason)),
        };
        Self {
            id: view.id,
            owner_id: view.owner_id,
            name: view.name,
            data,
            error,
            created_at: view.created_at,
            updated_at: view.updated_at,
        }
    }
}

/// Response for workflow creation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedWorkflow {
    pub id: String,
    pub name: String,
    pub data: Option<Graph>,
    pub owner_id: String,
}

/// Request body for workflow creation
#[derive(Debug, Deserialize)]
pub struct CreateWorkflowRequest {
    pub name: Option<String>,
    pub data: Option<Graph>,
}

/// Request body for workflow update; absent fields are left untouched
#[derive(Debug, Deserialize)]
pub struct UpdateWorkflowRequest {
    pub name: Option<String>,
    pub data: Option<Graph>,
}

/// Create workflow management routes
pub fn create_workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/workflows", get(list_workflows).post(create_workflow))
        .route(
            "/workflows/{id}",
            get(get_workflow).put(update_workflow).delete(delete_workflow),
        )
}

/// Malformed or mistyped JSON bodies are a validation failure, not a 422
fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> ServiceResult<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected request body");
        ServiceError::Validation(rejection.body_text())
    })
}

/// GET /workflows
async fn list_workflows(
    State(state): State<AppState>,
    caller: CallerId,
) -> ServiceResult<Json<Vec<WorkflowResponse>>> {
    let views = state.service.list_workflows(caller.as_str()).await?;
    Ok(Json(views.into_iter().map(WorkflowResponse::from).collect()))
}

/// GET /workflows/{id}
async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: CallerId,
) -> ServiceResult<Json<WorkflowResponse>> {
    let view = state.service.get_workflow(caller.as_str(), &id).await?;
    Ok(Json(view.into()))
}

/// POST /workflows
///
/// Body: { "name": "...", "data": { "nodes": [...], "edges": [...] } }
async fn create_workflow(
    State(state): State<AppState>,
    caller: CallerId,
    payload: Result<Json<CreateWorkflowRequest>, JsonRejection>,
) -> ServiceResult<(StatusCode, Json<CreatedWorkflow>)> {
    let body = parse_body(payload)?;
    let (Some(name), Some(graph)) = (body.name, body.data) else {
        return Err(ServiceError::Validation("Please add all fields".to_string()));
    };

    let view = state
        .service
        .create_workflow(caller.as_str(), &name, graph)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedWorkflow {
            data: view.decoded_graph().cloned(),
            id: view.id,
            name: view.name,
            owner_id: view.owner_id,
        }),
    ))
}

/// PUT /workflows/{id}
///
/// Body: { "name"?: "...", "data"?: { "nodes": [...], "edges": [...] } }
async fn update_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: CallerId,
    payload: Result<Json<UpdateWorkflowRequest>, JsonRejection>,
) -> ServiceResult<Json<WorkflowResponse>> {
    let body = parse_body(payload)?;

    let view = state
        .service
        .update_workflow(
            caller.as_str(),
            &id,
            UpdateWorkflow {
                name: body.name,
                graph: body.data,
            },
        )
        .await?;

    Ok(Json(view.into()))
}

/// DELETE /workflows/{id}
async fn delete_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: CallerId,
) -> ServiceResult<Json<Value>> {
    let id = state.service.delete_workflow(caller.as_str(), &id).await?;
    Ok(Json(json!({ "id": id })))
}
