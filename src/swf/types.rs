//! SWF wire types (§6): the subset of the service's JSON schema this
//! decider reads (event history) or writes (decisions, registration,
//! execution start).

use serde::{Deserialize, Serialize};

use crate::spec::model::TypeId;

/// `timeoutType` on `ActivityTaskTimedOut` / `DecisionTaskTimedOut` (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeoutType {
    #[serde(rename = "START_TO_CLOSE")]
    StartToClose,
    #[serde(rename = "HEARTBEAT")]
    Heartbeat,
    #[serde(rename = "SCHEDULE_TO_START")]
    ScheduleToStart,
    #[serde(rename = "SCHEDULE_TO_CLOSE")]
    ScheduleToClose,
}

/// `eventType` discriminant (§4.4, §4.6). Event types this decider does
/// not act on collapse to `Other` rather than failing deserialization —
/// SWF's real history event vocabulary is much larger than the subset
/// that drives this state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    WorkflowExecutionStarted,
    WorkflowExecutionCancelRequested,
    ActivityTaskScheduled,
    ActivityTaskStarted,
    ActivityTaskCompleted,
    ActivityTaskFailed,
    ActivityTaskTimedOut,
    DecisionTaskScheduled,
    DecisionTaskStarted,
    DecisionTaskCompleted,
    DecisionTaskTimedOut,
    WorkflowExecutionTimedOut,
    RecordMarkerFailed,
    ScheduleActivityTaskFailed,
    RequestCancelActivityTaskFailed,
    StartTimerFailed,
    CancelTimerFailed,
    StartChildWorkflowExecutionFailed,
    SignalExternalWorkflowExecutionFailed,
    RequestCancelExternalWorkflowExecutionFailed,
    CancelWorkflowExecutionFailed,
    CompleteWorkflowExecutionFailed,
    ContinueAsNewWorkflowExecutionFailed,
    FailWorkflowExecutionFailed,
    #[serde(other)]
    Other,
}

/// Cause code on a rejected decision (the subset this decider reacts to).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionFailureCause {
    #[serde(rename = "OPERATION_NOT_PERMITTED")]
    OperationNotPermitted,
    #[serde(rename = "UNHANDLED_DECISION")]
    UnhandledDecision,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityTaskScheduledAttrs {
    #[serde(rename = "activityId")]
    pub activity_id: String,
    #[serde(rename = "activityType")]
    pub activity_type: TypeId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduledEventRefAttrs {
    #[serde(rename = "scheduledEventId")]
    pub scheduled_event_id: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityTaskCompletedAttrs {
    #[serde(rename = "scheduledEventId")]
    pub scheduled_event_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityTaskFailedAttrs {
    #[serde(rename = "scheduledEventId")]
    pub scheduled_event_id: u64,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityTaskTimedOutAttrs {
    #[serde(rename = "scheduledEventId")]
    pub scheduled_event_id: u64,
    #[serde(rename = "timeoutType")]
    pub timeout_type: TimeoutType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowExecutionStartedAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionTaskStartedAttrs {
    #[serde(default)]
    pub identity: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionTaskCompletedAttrs {
    #[serde(rename = "scheduledEventId")]
    pub scheduled_event_id: u64,
    #[serde(rename = "startedEventId")]
    pub started_event_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionFailedAttrs {
    pub cause: DecisionFailureCause,
    #[serde(rename = "decisionTaskCompletedEventId")]
    pub decision_task_completed_event_id: u64,
}

/// One event in an execution's history (§4.4). Every attribute bundle is
/// optional; exactly one is populated, selected by `event_type`, mirroring
/// the real service's "one struct, many optional attribute fields" shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "eventId")]
    pub id: u64,

    #[serde(rename = "eventType")]
    pub event_type: EventType,

    #[serde(
        rename = "workflowExecutionStartedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub workflow_execution_started: Option<WorkflowExecutionStartedAttrs>,

    #[serde(
        rename = "activityTaskScheduledEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_task_scheduled: Option<ActivityTaskScheduledAttrs>,

    #[serde(
        rename = "activityTaskStartedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_task_started: Option<ScheduledEventRefAttrs>,

    #[serde(
        rename = "activityTaskCompletedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_task_completed: Option<ActivityTaskCompletedAttrs>,

    #[serde(
        rename = "activityTaskFailedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_task_failed: Option<ActivityTaskFailedAttrs>,

    #[serde(
        rename = "activityTaskTimedOutEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_task_timed_out: Option<ActivityTaskTimedOutAttrs>,

    #[serde(
        rename = "decisionTaskStartedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub decision_task_started: Option<DecisionTaskStartedAttrs>,

    #[serde(
        rename = "decisionTaskCompletedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub decision_task_completed: Option<DecisionTaskCompletedAttrs>,

    #[serde(
        rename = "decisionTaskTimedOutEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub decision_task_timed_out: Option<ScheduledEventRefAttrs>,

    #[serde(
        rename = "recordMarkerFailedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub record_marker_failed: Option<DecisionFailedAttrs>,

    #[serde(
        rename = "scheduleActivityTaskFailedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub schedule_activity_task_failed: Option<DecisionFailedAttrs>,

    #[serde(
        rename = "requestCancelActivityTaskFailedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub request_cancel_activity_task_failed: Option<DecisionFailedAttrs>,

    #[serde(
        rename = "startTimerFailedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub start_timer_failed: Option<DecisionFailedAttrs>,

    #[serde(
        rename = "cancelTimerFailedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cancel_timer_failed: Option<DecisionFailedAttrs>,

    #[serde(
        rename = "startChildWorkflowExecutionFailedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub start_child_workflow_execution_failed: Option<DecisionFailedAttrs>,

    #[serde(
        rename = "signalExternalWorkflowExecutionFailedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub signal_external_workflow_execution_failed: Option<DecisionFailedAttrs>,

    #[serde(
        rename = "requestCancelExternalWorkflowExecutionFailedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub request_cancel_external_workflow_execution_failed: Option<DecisionFailedAttrs>,

    #[serde(
        rename = "cancelWorkflowExecutionFailedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cancel_workflow_execution_failed: Option<DecisionFailedAttrs>,

    #[serde(
        rename = "completeWorkflowExecutionFailedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub complete_workflow_execution_failed: Option<DecisionFailedAttrs>,

    #[serde(
        rename = "continueAsNewWorkflowExecutionFailedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub continue_as_new_workflow_execution_failed: Option<DecisionFailedAttrs>,

    #[serde(
        rename = "failWorkflowExecutionFailedEventAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub fail_workflow_execution_failed: Option<DecisionFailedAttrs>,
}

impl Event {
    /// The `scheduledEventId` this event refers back to, for event types
    /// that carry one. `ActivityTaskScheduled` has none (it *is* the
    /// scheduled event).
    pub fn scheduled_event_id(&self) -> Option<u64> {
        match self.event_type {
            EventType::ActivityTaskStarted => {
                self.activity_task_started.as_ref().map(|a| a.scheduled_event_id)
            }
            EventType::ActivityTaskCompleted => {
                self.activity_task_completed.as_ref().map(|a| a.scheduled_event_id)
            }
            EventType::ActivityTaskFailed => {
                self.activity_task_failed.as_ref().map(|a| a.scheduled_event_id)
            }
            EventType::ActivityTaskTimedOut => {
                self.activity_task_timed_out.as_ref().map(|a| a.scheduled_event_id)
            }
            _ => None,
        }
    }

    /// The decision-rejection attributes carried by any of the `…Failed`
    /// decision-event types (§4.6 "decision" class, plus `RecordMarkerFailed`).
    pub fn decision_failed_attrs(&self) -> Option<&DecisionFailedAttrs> {
        self.record_marker_failed
            .as_ref()
            .or(self.schedule_activity_task_failed.as_ref())
            .or(self.request_cancel_activity_task_failed.as_ref())
            .or(self.start_timer_failed.as_ref())
            .or(self.cancel_timer_failed.as_ref())
            .or(self.start_child_workflow_execution_failed.as_ref())
            .or(self.signal_external_workflow_execution_failed.as_ref())
            .or(self.request_cancel_external_workflow_execution_failed.as_ref())
            .or(self.cancel_workflow_execution_failed.as_ref())
            .or(self.complete_workflow_execution_failed.as_ref())
            .or(self.continue_as_new_workflow_execution_failed.as_ref())
            .or(self.fail_workflow_execution_failed.as_ref())
    }
}

/// `PollForDecisionTask` response (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_token: Option<String>,
    pub workflow_type: TypeId,
    pub events: Vec<Event>,
    pub started_event_id: u64,
    #[serde(default)]
    pub previous_started_event_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollForDecisionTaskRequest {
    pub domain: String,
    pub task_list: TaskListSpec,
    pub identity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListSpec {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RespondDecisionTaskCompletedRequest {
    pub task_token: String,
    pub decisions: Vec<crate::decision::Decision>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterWorkflowTypeRequest {
    pub domain: String,
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_task_list: Option<TaskListSpec>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterActivityTypeRequest {
    pub domain: String,
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_task_list: Option<TaskListSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_task_heartbeat_timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_task_start_to_close_timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_task_priority: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeprecateWorkflowTypeRequest {
    pub domain: String,
    pub workflow_type: TypeId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartWorkflowExecutionRequest {
    pub domain: String,
    pub workflow_id: String,
    pub workflow_type: TypeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_list: Option<TaskListSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartWorkflowExecutionResponse {
    pub run_id: String,
}
