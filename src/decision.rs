//! Decisions this decider can emit (§4.5, §6): the subset of SWF's decision
//! vocabulary this implementation produces.

use serde::Serialize;

use crate::spec::model::{TimeoutSpec, TypeId};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "decisionType")]
pub enum Decision {
    #[serde(rename = "ScheduleActivityTask")]
    ScheduleActivityTask {
        #[serde(rename = "scheduleActivityTaskDecisionAttributes")]
        attributes: ScheduleActivityTaskAttrs,
    },
    #[serde(rename = "CompleteWorkflowExecution")]
    CompleteWorkflowExecution {
        #[serde(rename = "completeWorkflowExecutionDecisionAttributes")]
        attributes: CompleteWorkflowExecutionAttrs,
    },
    #[serde(rename = "FailWorkflowExecution")]
    FailWorkflowExecution {
        #[serde(rename = "failWorkflowExecutionDecisionAttributes")]
        attributes: FailWorkflowExecutionAttrs,
    },
    #[serde(rename = "CancelWorkflowExecution")]
    CancelWorkflowExecution {
        #[serde(rename = "cancelWorkflowExecutionDecisionAttributes")]
        attributes: CancelWorkflowExecutionAttrs,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleActivityTaskAttrs {
    #[serde(rename = "activityId")]
    pub activity_id: String,
    #[serde(rename = "activityType")]
    pub activity_type: TypeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(rename = "taskList", skip_serializing_if = "Option::is_none")]
    pub task_list: Option<crate::swf::types::TaskListSpec>,
    #[serde(rename = "taskPriority", skip_serializing_if = "Option::is_none")]
    pub task_priority: Option<String>,
    #[serde(rename = "heartbeatTimeout", skip_serializing_if = "Option::is_none")]
    pub heartbeat_timeout: Option<String>,
    #[serde(
        rename = "scheduleToCloseTimeout",
        skip_serializing_if = "Option::is_none"
    )]
    pub schedule_to_close_timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CompleteWorkflowExecutionAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FailWorkflowExecutionAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CancelWorkflowExecutionAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Decision {
    /// Build a `ScheduleActivityTask` decision for one ready task (§4.5).
    /// `input` is the task's materialized input, already JSON-encoded, or
    /// `None` to omit the attribute entirely.
    pub fn schedule_activity_task(
        task_id: &str,
        activity_type: TypeId,
        input: Option<String>,
        task_list: Option<String>,
        priority: Option<i32>,
        heartbeat: Option<TimeoutSpec>,
        timeout: Option<TimeoutSpec>,
    ) -> Decision {
        Decision::ScheduleActivityTask {
            attributes: ScheduleActivityTaskAttrs {
                activity_id: task_id.to_string(),
                activity_type,
                input,
                task_list: task_list.map(|name| crate::swf::types::TaskListSpec { name }),
                task_priority: priority.map(|p| p.to_string()),
                heartbeat_timeout: heartbeat.and_then(|t| t.as_wire_string()),
                schedule_to_close_timeout: timeout.and_then(|t| t.as_wire_string()),
            },
        }
    }

    pub fn complete_workflow_execution(result: Option<String>) -> Decision {
        Decision::CompleteWorkflowExecution {
            attributes: CompleteWorkflowExecutionAttrs { result },
        }
    }

    pub fn fail_workflow_execution(reason: String, details: Option<String>) -> Decision {
        Decision::FailWorkflowExecution {
            attributes: FailWorkflowExecutionAttrs {
                reason: Some(reason),
                details,
            },
        }
    }

    pub fn cancel_workflow_execution(details: Option<String>) -> Decision {
        Decision::CancelWorkflowExecution {
            attributes: CancelWorkflowExecutionAttrs { details },
        }
    }
}
