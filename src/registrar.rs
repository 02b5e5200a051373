//! Registrar (§4.9, boundary): registers a loaded [`WorkflowSet`]'s
//! workflow types and activity types with SWF.

use std::collections::HashSet;

use tracing::info;

use crate::error::TransportError;
use crate::spec::{TypeId, WorkflowSet};
use crate::swf::client::SwfClient;
use crate::swf::types::{
    DeprecateWorkflowTypeRequest, RegisterActivityTypeRequest, RegisterWorkflowTypeRequest,
    TaskListSpec,
};

/// Register every workflow type in `workflows`, and every distinct
/// activity type any of their tasks reference, against `client`.
/// `TypeAlreadyExistsFault` is treated as success (§4.9).
pub async fn register_all(
    client: &dyn SwfClient,
    domain: &str,
    workflows: &WorkflowSet,
) -> Result<(), TransportError> {
    let mut seen_activity_types: HashSet<TypeId> = HashSet::new();

    for graph in workflows.iter() {
        info!(workflow = %graph.name, version = %graph.version, "registering workflow type");
        client
            .register_workflow_type(&RegisterWorkflowTypeRequest {
                domain: domain.to_string(),
                name: graph.name.clone(),
                version: graph.version.clone(),
                default_task_list: None,
            })
            .await?;

        for task in &graph.tasks {
            if !seen_activity_types.insert(task.activity_type.clone()) {
                continue;
            }
            info!(activity = %task.activity_type.name, version = %task.activity_type.version, "registering activity type");
            client
                .register_activity_type(&RegisterActivityTypeRequest {
                    domain: domain.to_string(),
                    name: task.activity_type.name.clone(),
                    version: task.activity_type.version.clone(),
                    default_task_list: task
                        .task_list
                        .clone()
                        .map(|name| TaskListSpec { name }),
                    default_task_heartbeat_timeout: task.heartbeat.and_then(|t| t.as_wire_string()),
                    default_task_start_to_close_timeout: task
                        .timeout
                        .and_then(|t| t.as_wire_string()),
                    default_task_priority: task.priority.map(|p| p.to_string()),
                })
                .await?;
        }
    }
    Ok(())
}

/// Deprecate a previously registered workflow type (§4.9).
pub async fn deprecate(
    client: &dyn SwfClient,
    domain: &str,
    workflow_type: TypeId,
) -> Result<(), TransportError> {
    client
        .deprecate_workflow_type(&DeprecateWorkflowTypeRequest {
            domain: domain.to_string(),
            workflow_type,
        })
        .await
}
