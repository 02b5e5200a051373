//! Launcher (§4.10, boundary): starts a new execution of a workflow type.

use serde_json::Value;

use crate::error::TransportError;
use crate::spec::TypeId;
use crate::swf::client::SwfClient;
use crate::swf::types::{StartWorkflowExecutionRequest, TaskListSpec};

/// Start a new execution. `workflow_id` defaults to a generated UUID;
/// `task_list` overrides the workflow type's registered default when set.
pub async fn start(
    client: &dyn SwfClient,
    domain: &str,
    workflow_type: TypeId,
    input: Value,
    workflow_id: Option<String>,
    task_list: Option<String>,
) -> Result<String, TransportError> {
    let workflow_id = workflow_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let response = client
        .start_workflow_execution(&StartWorkflowExecutionRequest {
            domain: domain.to_string(),
            workflow_id,
            workflow_type,
            input: Some(input.to_string()),
            task_list: task_list.map(|name| TaskListSpec { name }),
        })
        .await?;
    Ok(response.run_id)
}
